//! OpenList DirectoryDetail Adapter
//!
//! Lists a folder under the configured root path through `OpenListClient`
//! and turns its video files into episodes with direct download links.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, warn};
use vodhub_media_providers::{OpenListClient, OpenListError};

use super::{DirectoryDetail, EpisodeRecord, FolderDetail, OpenListSettings, ProviderError, SettingsSource};

const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "mkv", "avi", "m3u8", "flv", "ts", "mov", "wmv", "webm", "rmvb", "rm", "mpg", "mpeg", "3gp",
    "f4v", "m4v", "vob",
];

struct CachedToken {
    identity: String,
    token: String,
}

/// `DirectoryDetail` backed by an OpenList server.
///
/// Settings are read on every call; the login token is reused until the
/// server rejects it or the configured url/username change.
pub struct OpenListDirectory {
    settings: Arc<dyn SettingsSource>,
    token: Mutex<Option<CachedToken>>,
}

impl OpenListDirectory {
    pub fn new(settings: Arc<dyn SettingsSource>) -> Self {
        Self {
            settings,
            token: Mutex::new(None),
        }
    }

    async fn client(&self, settings: &OpenListSettings) -> Result<OpenListClient, OpenListError> {
        let identity = format!("{}|{}", settings.url, settings.username);
        let cached = self
            .token
            .lock()
            .as_ref()
            .filter(|t| t.identity == identity)
            .map(|t| t.token.clone());

        if let Some(token) = cached {
            return OpenListClient::with_token(&settings.url, token);
        }

        let mut client = OpenListClient::new(&settings.url)?;
        let token = client.login(&settings.username, &settings.password).await?;
        debug!(host = %settings.url, "Logged in to OpenList");
        *self.token.lock() = Some(CachedToken { identity, token });
        Ok(client)
    }

    fn clear_token(&self) {
        *self.token.lock() = None;
    }
}

#[async_trait]
impl DirectoryDetail for OpenListDirectory {
    async fn directory_detail(&self, folder_name: &str) -> Result<FolderDetail, ProviderError> {
        let settings = self
            .settings
            .openlist()
            .ok_or_else(|| ProviderError::InvalidConfig("OpenList 未配置".to_string()))?;

        let client = self.client(&settings).await.map_err(|e| {
            if e.is_auth_failure() {
                self.clear_token();
            }
            ProviderError::from(e)
        })?;

        let folder_path = join_path(&settings.root_path, folder_name);
        let listing = match client.fs_list(&folder_path, 1, 0, None).await {
            Ok(listing) => listing,
            Err(e) => {
                if e.is_auth_failure() {
                    warn!(folder = %folder_name, "OpenList rejected cached token");
                    self.clear_token();
                }
                return Err(e.into());
            }
        };

        let mut files: Vec<_> = listing
            .into_items()
            .into_iter()
            .filter(|item| !item.is_dir && is_video_file(&item.name))
            .collect();
        if files.is_empty() {
            return Ok(FolderDetail::failed(folder_name, "未找到视频文件"));
        }
        files.sort_by(|a, b| natural_cmp(&a.name, &b.name));

        let episodes = files
            .iter()
            .zip(1u32..)
            .map(|(file, episode)| EpisodeRecord {
                episode,
                title: None,
                play_url: client.download_url(&format!("{folder_path}/{}", file.name), &file.sign),
            })
            .collect();

        Ok(FolderDetail::found(folder_name, episodes))
    }
}

fn is_video_file(name: &str) -> bool {
    name.rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .is_some_and(|ext| VIDEO_EXTENSIONS.contains(&ext.as_str()))
}

/// Order names so that digit runs compare by value (`E2` before `E10`).
fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (mut a, mut b) = (a, b);
    loop {
        let (Some(ca), Some(cb)) = (a.chars().next(), b.chars().next()) else {
            return a.len().cmp(&b.len());
        };

        if ca.is_ascii_digit() && cb.is_ascii_digit() {
            let (na, rest_a) = split_digits(a);
            let (nb, rest_b) = split_digits(b);
            let (ta, tb) = (na.trim_start_matches('0'), nb.trim_start_matches('0'));
            let ord = ta.len().cmp(&tb.len()).then_with(|| ta.cmp(tb)).then_with(|| na.len().cmp(&nb.len()));
            if ord != Ordering::Equal {
                return ord;
            }
            (a, b) = (rest_a, rest_b);
        } else {
            let ord = ca.cmp(&cb);
            if ord != Ordering::Equal {
                return ord;
            }
            (a, b) = (&a[ca.len_utf8()..], &b[cb.len_utf8()..]);
        }
    }
}

fn split_digits(s: &str) -> (&str, &str) {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s.split_at(end)
}

fn join_path(root: &str, folder: &str) -> String {
    let root = root.trim_end_matches('/');
    let folder = folder.trim_matches('/');
    if root.is_empty() {
        format!("/{folder}")
    } else if root.starts_with('/') {
        format!("{root}/{folder}")
    } else {
        format!("/{root}/{folder}")
    }
}
