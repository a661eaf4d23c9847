pub mod catalog;
pub mod forwarder;

pub use catalog::{CatalogMode, CatalogQuery, CatalogSynthesizer, OPENLIST_SOURCE};
pub use forwarder::{
    build_target_url, rewrite_envelope, UpstreamError, UpstreamForwarder, UpstreamRequestContext,
    API_PARAM, DEFAULT_UPSTREAM_TIMEOUT,
};
