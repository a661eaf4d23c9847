//! OpenList HTTP API Types

use serde::Deserialize;

/// Generic OpenList API response wrapper
#[derive(Debug, Deserialize)]
pub struct OpenListResp<T> {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
}

/// Login response data
#[derive(Debug, Deserialize)]
pub struct LoginData {
    pub token: String,
}

/// Directory listing from `/api/fs/list`
#[derive(Debug, Deserialize)]
pub struct FsListResp {
    /// `null` for empty directories
    #[serde(default)]
    pub content: Option<Vec<FsListContent>>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub readme: String,
    #[serde(default)]
    pub write: bool,
    #[serde(default)]
    pub provider: String,
}

impl FsListResp {
    #[must_use]
    pub fn into_items(self) -> Vec<FsListContent> {
        self.content.unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FsListContent {
    pub name: String,
    #[serde(default)]
    pub size: u64,
    pub is_dir: bool,
    #[serde(default)]
    pub modified: String,
    #[serde(default)]
    pub sign: String,
    #[serde(default)]
    pub thumb: String,
    #[serde(rename = "type", default)]
    pub r#type: u64,
}
