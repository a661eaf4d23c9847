// vodhub API Library
//
// HTTP surface of the catalog gateway

pub mod http;

// Re-export commonly used types
pub use http::{create_router, AppState};
