//! Upstream catalog forwarding
//!
//! Fetches a third-party catalog API under a per-request deadline and rewrites
//! the playlists of the returned entries through the proxy rule. The payload
//! stays raw JSON: only `list[*].vod_play_url` strings are replaced.

use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;
use vodhub_media_providers::error::read_json;
use vodhub_media_providers::ProviderClientError;
use vodhub_proxy::{Document, RewriteRule};

use crate::{Error, Result};

/// Query parameter naming the upstream catalog API
pub const API_PARAM: &str = "api";

pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("Invalid upstream url: {0}")]
    InvalidTarget(String),

    #[error("Upstream timed out after {0:?}")]
    Timeout(Duration),

    #[error("Upstream request cancelled")]
    Cancelled,

    #[error("Upstream returned {0}")]
    Status(StatusCode),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid upstream response: {0}")]
    Parse(String),

    #[error("Upstream response too large ({size} bytes)")]
    ResponseTooLarge { size: u64 },
}

impl From<ProviderClientError> for UpstreamError {
    fn from(err: ProviderClientError) -> Self {
        match err {
            ProviderClientError::ResponseTooLarge { size } => Self::ResponseTooLarge { size },
            ProviderClientError::Parse(msg) => Self::Parse(msg),
            other => Self::Network(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Parse(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// Upstream URL: `api` with every other parameter appended in order.
pub fn build_target_url<'a>(
    api: &str,
    params: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> std::result::Result<Url, UpstreamError> {
    let mut target = Url::parse(api.trim()).map_err(|e| UpstreamError::InvalidTarget(e.to_string()))?;
    if !matches!(target.scheme(), "http" | "https") {
        return Err(UpstreamError::InvalidTarget(format!(
            "unsupported scheme: {}",
            target.scheme()
        )));
    }

    let mut extra = params.into_iter().filter(|(key, _)| *key != API_PARAM).peekable();
    if extra.peek().is_some() {
        target.query_pairs_mut().extend_pairs(extra);
    }
    Ok(target)
}

/// State of one forwarded request. Never shared between requests.
#[derive(Debug, Clone)]
pub struct UpstreamRequestContext {
    pub target: Url,
    pub deadline: Instant,
    pub cancel: CancellationToken,
}

impl UpstreamRequestContext {
    #[must_use]
    pub fn new(target: Url, timeout: Duration) -> Self {
        Self {
            target,
            deadline: Instant::now() + timeout,
            cancel: CancellationToken::new(),
        }
    }
}

pub struct UpstreamForwarder {
    client: reqwest::Client,
    timeout: Duration,
}

impl UpstreamForwarder {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("vodhub/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Internal(format!("Failed to build upstream client: {e}")))?;
        Ok(Self { client, timeout })
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Fresh context for `target` using the configured timeout.
    #[must_use]
    pub fn context(&self, target: Url) -> UpstreamRequestContext {
        UpstreamRequestContext::new(target, self.timeout)
    }

    /// GET the target and decode its JSON body as is.
    ///
    /// Bounded by `ctx.deadline`; the context's token is cancelled when the
    /// deadline passes and a cancelled token aborts the request.
    pub async fn fetch(&self, ctx: &UpstreamRequestContext) -> std::result::Result<Value, UpstreamError> {
        let started = Instant::now();
        let request = async {
            let response = self.client.get(ctx.target.clone()).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(UpstreamError::Status(status));
            }
            Ok::<_, UpstreamError>(read_json::<Value>(response).await?)
        };

        let result = tokio::select! {
            biased;
            () = ctx.cancel.cancelled() => Err(UpstreamError::Cancelled),
            outcome = tokio::time::timeout_at(ctx.deadline, request) => match outcome {
                Ok(result) => result,
                Err(_) => {
                    ctx.cancel.cancel();
                    Err(UpstreamError::Timeout(self.timeout))
                }
            },
        };

        let elapsed_ms = started.elapsed().as_millis();
        match &result {
            Ok(body) => debug!(
                url = %ctx.target,
                entries = entries(body).map_or(0, Vec::len),
                elapsed_ms,
                "Upstream fetch completed"
            ),
            Err(UpstreamError::Status(status)) => warn!(
                url = %ctx.target,
                status = status.as_u16(),
                elapsed_ms,
                "Upstream returned error status"
            ),
            Err(e) => warn!(url = %ctx.target, error = %e, elapsed_ms, "Upstream fetch failed"),
        }
        result
    }

    /// Fetch, then rewrite every entry's playlist with `rule`.
    pub async fn forward<R>(
        &self,
        ctx: &UpstreamRequestContext,
        rule: &R,
        source_label: Option<&str>,
    ) -> std::result::Result<Value, UpstreamError>
    where
        R: RewriteRule + ?Sized,
    {
        let mut body = self.fetch(ctx).await?;
        let rejected = rewrite_envelope(&mut body, rule, source_label);
        if rejected > 0 {
            warn!(url = %ctx.target, rejected, "Some playlist URLs were left unrewritten");
        }
        Ok(body)
    }
}

fn entries(body: &Value) -> Option<&Vec<Value>> {
    body.get("list").and_then(Value::as_array)
}

/// Rewrite the `vod_play_url` string of each `list` entry in place. Entries
/// without one, non-object entries and non-envelope bodies are left alone.
/// Returns how many URLs the rule rejected and were kept as they were.
pub fn rewrite_envelope<R>(body: &mut Value, rule: &R, source_label: Option<&str>) -> usize
where
    R: RewriteRule + ?Sized,
{
    let Some(list) = body.get_mut("list").and_then(Value::as_array_mut) else {
        return 0;
    };

    let mut rejected = 0;
    for entry in list {
        let Some(Value::String(play_url)) = entry.get_mut("vod_play_url") else {
            continue;
        };
        if play_url.is_empty() {
            continue;
        }
        let mut document = Document::parse(play_url);
        rejected += document.rewrite_urls(source_label, rule);
        *play_url = document.to_string();
    }
    rejected
}
