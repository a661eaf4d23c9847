pub mod meta_cache;

pub use meta_cache::MetaInfoCache;
