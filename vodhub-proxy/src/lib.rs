//! Playlist codec and media proxy URL rewriting
//!
//! Catalog payloads carry their playback locations in `vod_play_url`, a small
//! delimiter grammar (`$$$` between sources, `#` between episodes, `$` between
//! fields). This crate parses that grammar into a typed tree, serializes it
//! back byte-for-byte, and rewrites playable stream URLs so they go through
//! the media proxy endpoint. Used by `vodhub-core` on both the pass-through
//! and the synthesized catalog paths.

pub mod playlist;
pub mod rewrite;

pub use playlist::{rewrite, Document, Episode, PlaylistError, RewriteRule, Source};
pub use rewrite::{encode_component, resolve_origin, ProxyRewriter, PLAYABLE_SUFFIX, PROXY_M3U8_PATH};
