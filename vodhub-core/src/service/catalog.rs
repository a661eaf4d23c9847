//! Catalog synthesized from the folder metadata index.
//!
//! Serves the same envelope as a real catalog API so clients cannot tell the
//! two backends apart. Absence is always success-shaped (`code = 0`).

use std::sync::Arc;
use tracing::{debug, warn};
use vodhub_proxy::{Document, Episode, Source};

use crate::cache::MetaInfoCache;
use crate::models::{CatalogEntry, CatalogEnvelope, FolderInfo, MetaInfo};
use crate::provider::{DirectoryDetail, ImageResolver};

/// Play source name of every synthesized detail
pub const OPENLIST_SOURCE: &str = "OpenList";

pub const MSG_NO_DATA: &str = "暂无数据";
pub const MSG_NOT_FOUND: &str = "未找到该视频";
pub const MSG_DETAIL_FAILED: &str = "获取视频详情失败";

/// Mode selectors of a synthesized catalog request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    /// Search keyword
    pub wd: Option<String>,
    /// Detail id
    pub ids: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogMode<'a> {
    Search(&'a str),
    Detail(&'a str),
    Listing,
}

impl CatalogQuery {
    pub fn from_params<'a>(params: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut query = Self::default();
        for (key, value) in params {
            match key {
                "wd" if query.wd.is_none() => query.wd = Some(value.to_string()),
                "ids" if query.ids.is_none() => query.ids = Some(value.to_string()),
                _ => {}
            }
        }
        query
    }

    /// Search wins over detail; blank values count as absent.
    #[must_use]
    pub fn mode(&self) -> CatalogMode<'_> {
        fn present(v: &Option<String>) -> Option<&str> {
            v.as_deref().map(str::trim).filter(|s| !s.is_empty())
        }

        if let Some(keyword) = present(&self.wd) {
            CatalogMode::Search(keyword)
        } else if let Some(id) = present(&self.ids) {
            CatalogMode::Detail(id)
        } else {
            CatalogMode::Listing
        }
    }
}

pub struct CatalogSynthesizer {
    meta: Arc<MetaInfoCache>,
    directory: Arc<dyn DirectoryDetail>,
    images: Arc<dyn ImageResolver>,
}

impl CatalogSynthesizer {
    pub fn new(
        meta: Arc<MetaInfoCache>,
        directory: Arc<dyn DirectoryDetail>,
        images: Arc<dyn ImageResolver>,
    ) -> Self {
        Self {
            meta,
            directory,
            images,
        }
    }

    pub async fn handle(&self, query: &CatalogQuery) -> CatalogEnvelope {
        let Some(meta) = self.meta.get().await else {
            return CatalogEnvelope::empty(MSG_NO_DATA);
        };

        match query.mode() {
            CatalogMode::Search(keyword) => self.search(&meta, keyword),
            CatalogMode::Detail(id) => self.detail(&meta, id).await,
            CatalogMode::Listing => self.listing(&meta),
        }
    }

    #[must_use]
    pub fn search(&self, meta: &MetaInfo, keyword: &str) -> CatalogEnvelope {
        let needle = keyword.to_lowercase();
        let list = meta
            .folders
            .iter()
            .filter(|(_, info)| info.matches(&needle))
            .map(|(key, info)| self.entry(key, info))
            .collect();
        CatalogEnvelope::from_entries(list)
    }

    #[must_use]
    pub fn listing(&self, meta: &MetaInfo) -> CatalogEnvelope {
        let list = meta
            .folders
            .iter()
            .map(|(key, info)| self.entry(key, info))
            .collect();
        CatalogEnvelope::from_entries(list)
    }

    pub async fn detail(&self, meta: &MetaInfo, id: &str) -> CatalogEnvelope {
        let Some(info) = meta.folders.get(id) else {
            debug!(id = %id, "Detail requested for unknown folder key");
            return CatalogEnvelope::empty(MSG_NOT_FOUND);
        };

        let detail = match self.directory.directory_detail(&info.folder_name).await {
            Ok(detail) if detail.success => detail,
            Ok(detail) => {
                warn!(folder = %info.folder_name, error = ?detail.error, "Directory detail reported failure");
                return CatalogEnvelope::empty(MSG_DETAIL_FAILED);
            }
            Err(e) => {
                warn!(folder = %info.folder_name, error = %e, "Directory detail lookup failed");
                return CatalogEnvelope::empty(MSG_DETAIL_FAILED);
            }
        };

        let playlist = Document::single(Source::from_episodes(
            detail
                .episodes
                .iter()
                .map(|ep| Episode::titled(ep.display_title(), ep.play_url.as_str())),
        ));

        let mut entry = self.entry(id, info);
        entry.vod_content = Some(info.overview.clone());
        entry.vod_play_from = Some(OPENLIST_SOURCE.to_string());
        entry.vod_play_url = Some(playlist.to_string());
        CatalogEnvelope::from_entries(vec![entry])
    }

    fn entry(&self, key: &str, info: &FolderInfo) -> CatalogEntry {
        CatalogEntry {
            vod_id: key.to_string(),
            vod_name: info.title.clone(),
            vod_pic: self.images.resolve(info.poster_path.as_deref()),
            vod_remarks: info.remarks().to_string(),
            vod_year: info.year(),
            type_name: info.type_name().to_string(),
            ..CatalogEntry::default()
        }
    }
}
