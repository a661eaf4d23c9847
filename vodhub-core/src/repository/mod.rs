pub mod global_value;

pub use global_value::{GlobalValueStore, MemoryStore, NullStore, RedisStore, StorageBackend};
