//! Catalog protocol envelope
//!
//! The `{code, msg, page, pagecount, limit, total, list}` shape served to
//! player clients by the synthesized catalog. Forwarded upstream payloads are
//! never decoded into these types; they travel as raw JSON.

use serde::Serialize;

/// Success with at least one entry
pub const CODE_OK: i64 = 1;
/// Success with nothing to show
pub const CODE_EMPTY: i64 = 0;

pub const MSG_DATA_LIST: &str = "数据列表";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CatalogEnvelope {
    pub code: i64,
    pub msg: String,
    pub page: i64,
    pub pagecount: i64,
    pub limit: i64,
    pub total: i64,
    pub list: Vec<CatalogEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CatalogEntry {
    pub vod_id: String,
    pub vod_name: String,
    pub vod_pic: String,
    pub vod_remarks: String,
    pub vod_year: String,
    pub type_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vod_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vod_play_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vod_play_url: Option<String>,
}

impl CatalogEnvelope {
    /// Single-page envelope over `list`; `code` reflects whether it is empty.
    #[must_use]
    pub fn from_entries(list: Vec<CatalogEntry>) -> Self {
        if list.is_empty() {
            return Self::empty(MSG_DATA_LIST);
        }
        let count = i64::try_from(list.len()).unwrap_or(i64::MAX);
        Self {
            code: CODE_OK,
            msg: MSG_DATA_LIST.to_string(),
            page: 1,
            pagecount: 1,
            limit: count,
            total: count,
            list,
        }
    }

    /// Success-shaped envelope carrying no entries.
    pub fn empty(msg: impl Into<String>) -> Self {
        Self {
            code: CODE_EMPTY,
            msg: msg.into(),
            page: 1,
            pagecount: 1,
            limit: 0,
            total: 0,
            list: Vec::new(),
        }
    }
}
