pub mod catalog;
pub mod meta;

pub use catalog::{CatalogEntry, CatalogEnvelope, CODE_EMPTY, CODE_OK};
pub use meta::{FolderInfo, MediaType, MetaInfo};
