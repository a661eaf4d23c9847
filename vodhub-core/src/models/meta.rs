//! Folder metadata index behind the synthesized catalog.
//!
//! Stored as a single JSON blob; `folders` keeps insertion order so listings
//! and search results come back in the order the index was built.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetaInfo {
    #[serde(default)]
    pub folders: IndexMap<String, FolderInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(default, alias = "lastRefresh", skip_serializing_if = "Option::is_none")]
    pub last_refresh: Option<i64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    #[default]
    Tv,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderInfo {
    #[serde(rename = "folderName")]
    pub folder_name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub media_type: MediaType,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tmdb_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_average: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed: Option<bool>,
}

impl FolderInfo {
    /// Year part of `release_date` (`"2021-05-01"` -> `"2021"`).
    #[must_use]
    pub fn year(&self) -> String {
        self.release_date
            .as_deref()
            .and_then(|d| d.split('-').next())
            .unwrap_or_default()
            .to_string()
    }

    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self.media_type {
            MediaType::Movie => "电影",
            _ => "电视剧",
        }
    }

    #[must_use]
    pub fn remarks(&self) -> &'static str {
        match self.media_type {
            MediaType::Movie => "电影",
            _ => "剧集",
        }
    }

    /// Case-insensitive substring match on title or folder name.
    /// `needle` must already be lowercase.
    #[must_use]
    pub fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle) || self.folder_name.to_lowercase().contains(needle)
    }
}
