// Catalog collaborators
//
// Two-tier layout:
//
// Tier 1: vodhub-media-providers (pure backend HTTP clients)
//   - openlist::OpenListClient
//
// Tier 2: vodhub-core/provider (collaborator adapters)
//   - traits: SettingsSource, DirectoryDetail, ImageResolver
//   - OpenListDirectory calls OpenListClient to implement DirectoryDetail
//   - TmdbImageResolver implements ImageResolver

pub mod error;
pub mod image;
pub mod openlist;
pub mod traits;

pub use error::*;
pub use image::TmdbImageResolver;
pub use openlist::OpenListDirectory;
pub use traits::*;
