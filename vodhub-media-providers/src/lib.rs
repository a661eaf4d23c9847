// vodhub Provider Clients
//
// Pure HTTP client implementations for the storage backends behind the
// synthesized catalog. These clients know nothing about the catalog protocol;
// `vodhub-core/provider` adapts them to its collaborator traits.

// Shared error types
pub mod error;

// HTTP clients
pub mod openlist;

// Re-export client types for convenience
pub use error::ProviderClientError;
pub use openlist::OpenListClient;
pub use openlist::OpenListError;
