// Collaborator Traits
//
// Interfaces the catalog synthesizer depends on

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::ProviderError;

/// Validated OpenList connection settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenListSettings {
    pub url: String,
    pub username: String,
    pub password: String,
    pub root_path: String,
}

/// Source of the optional OpenList backend settings.
pub trait SettingsSource: Send + Sync {
    /// `None` while the backend is not (fully) configured.
    fn openlist(&self) -> Option<OpenListSettings>;
}

/// One playable file of a folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeRecord {
    /// 1-based position
    pub episode: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub play_url: String,
}

impl EpisodeRecord {
    /// Title shown to players, `第N集` when the backend has none.
    #[must_use]
    pub fn display_title(&self) -> String {
        match self.title.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => format!("第{}集", self.episode),
        }
    }
}

/// Episodes of one folder, in play order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderDetail {
    pub success: bool,
    pub folder: String,
    #[serde(default)]
    pub episodes: Vec<EpisodeRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FolderDetail {
    pub fn found(folder: impl Into<String>, episodes: Vec<EpisodeRecord>) -> Self {
        Self {
            success: true,
            folder: folder.into(),
            episodes,
            error: None,
        }
    }

    pub fn failed(folder: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            folder: folder.into(),
            episodes: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// Looks up the playable episodes of a folder by its name.
#[async_trait]
pub trait DirectoryDetail: Send + Sync {
    async fn directory_detail(&self, folder_name: &str) -> Result<FolderDetail, ProviderError>;
}

/// Maps a stored poster path to a URL players can display.
pub trait ImageResolver: Send + Sync {
    fn resolve(&self, poster_path: Option<&str>) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_title_defaults() {
        let mut record = EpisodeRecord {
            episode: 3,
            title: None,
            play_url: "http://o/d/3.mp4".to_string(),
        };
        assert_eq!(record.display_title(), "第3集");
        record.title = Some("  ".to_string());
        assert_eq!(record.display_title(), "第3集");
        record.title = Some("大结局".to_string());
        assert_eq!(record.display_title(), "大结局");
    }

    #[test]
    fn test_episode_record_wire_names() {
        let record: EpisodeRecord =
            serde_json::from_str(r#"{"episode": 1, "playUrl": "http://o/d/1.mp4"}"#).unwrap();
        assert_eq!(record.play_url, "http://o/d/1.mp4");
        assert!(record.title.is_none());
    }
}
