//! OpenList Provider Client
//!
//! Pure HTTP client for the OpenList (Alist-compatible) API.
//!
//! # Example
//!
//! ```no_run
//! use vodhub_media_providers::openlist::OpenListClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut client = OpenListClient::new("https://openlist.example.com")?;
//! client.login("username", "password").await?;
//! let listing = client.fs_list("/media/Show", 1, 0, None).await?;
//! # Ok(())
//! # }
//! ```

mod client;
pub mod types;

pub use client::OpenListClient;
pub use types::*;

pub use crate::error::ProviderClientError as OpenListError;
