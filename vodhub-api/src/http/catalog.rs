//! Catalog proxy endpoint
//!
//! `GET /api/cms-proxy?api=<url>&...` forwards to a third-party catalog API and
//! routes playlists through the stream proxy. `api=openlist` serves the
//! catalog synthesized from the OpenList metadata index instead.

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::Value;
use vodhub_core::models::CatalogEnvelope;
use vodhub_core::service::{build_target_url, CatalogQuery, API_PARAM};
use vodhub_proxy::{resolve_origin, ProxyRewriter};

use crate::http::error::AppResult;
use crate::http::{AppError, AppState};

/// `api` value selecting the synthesized catalog
pub const OPENLIST_SENTINEL: &str = "openlist";

/// Optional label attached to proxied stream references
const SOURCE_PARAM: &str = "source";

const NO_STORE: &str = "no-store, no-cache, must-revalidate";

pub const MSG_MISSING_API: &str = "缺少必要参数: api";
pub const MSG_OPENLIST_UNCONFIGURED: &str = "OpenList 未配置";

pub fn create_catalog_router() -> Router<AppState> {
    Router::new().route("/api/cms-proxy", get(cms_proxy))
}

/// GET /api/cms-proxy
pub async fn cms_proxy(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<Vec<(String, String)>>,
) -> AppResult<Response> {
    let api = first_param(&params, API_PARAM).ok_or_else(|| AppError::bad_request(MSG_MISSING_API))?;

    if api.eq_ignore_ascii_case(OPENLIST_SENTINEL) {
        return Ok(Json(synthesized(&state, &params).await).into_response());
    }

    // responses depend on the upstream query, never cache them
    let envelope = forwarded(&state, &headers, api, &params).await?;
    Ok(([(header::CACHE_CONTROL, NO_STORE)], Json(envelope)).into_response())
}

async fn synthesized(state: &AppState, params: &[(String, String)]) -> CatalogEnvelope {
    if state.settings.openlist().is_none() {
        tracing::debug!("Synthesized catalog requested without OpenList settings");
        return CatalogEnvelope::empty(MSG_OPENLIST_UNCONFIGURED);
    }

    let query = CatalogQuery::from_params(params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    state.synthesizer.handle(&query).await
}

async fn forwarded(
    state: &AppState,
    headers: &HeaderMap,
    api: &str,
    params: &[(String, String)],
) -> AppResult<Value> {
    let target = build_target_url(api, params.iter().map(|(k, v)| (k.as_str(), v.as_str())))?;

    let origin = resolve_origin(state.proxy.site_base.as_deref(), headers);
    let rewriter = ProxyRewriter::new(origin, state.proxy.token.clone());
    let source_label = first_param(params, SOURCE_PARAM);

    let ctx = state.forwarder.context(target);
    Ok(state.forwarder.forward(&ctx, &rewriter, source_label).await?)
}

/// First non-blank value of `key`
fn first_param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .filter(|(k, _)| k == key)
        .map(|(_, v)| v.trim())
        .find(|v| !v.is_empty())
}
