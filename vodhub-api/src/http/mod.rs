// Module: http
// HTTP/JSON surface of the catalog gateway

pub mod catalog;
pub mod error;
pub mod health;

use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use vodhub_core::cache::MetaInfoCache;
use vodhub_core::config::ProxyConfig;
use vodhub_core::provider::{OpenListDirectory, SettingsSource, TmdbImageResolver};
use vodhub_core::repository::StorageBackend;
use vodhub_core::service::{CatalogSynthesizer, UpstreamForwarder};
use vodhub_core::Config;

pub use error::{AppError, AppResult};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<dyn SettingsSource>,
    pub synthesizer: Arc<CatalogSynthesizer>,
    pub forwarder: Arc<UpstreamForwarder>,
    pub proxy: Arc<ProxyConfig>,
}

impl AppState {
    /// Wire the production collaborators from configuration.
    pub fn from_config(config: Arc<Config>, storage: Arc<dyn StorageBackend>) -> vodhub_core::Result<Self> {
        let settings: Arc<dyn SettingsSource> = config.clone();
        let meta = Arc::new(MetaInfoCache::new(storage, config.storage.metainfo_key.clone()));
        let directory = Arc::new(OpenListDirectory::new(Arc::clone(&settings)));
        let images = Arc::new(TmdbImageResolver::new(
            config.openlist.image_base_url.clone(),
            config.openlist.image_size.clone(),
        ));
        let forwarder = UpstreamForwarder::new(Duration::from_secs(config.proxy.upstream_timeout_seconds))?;

        Ok(Self {
            settings,
            synthesizer: Arc::new(CatalogSynthesizer::new(meta, directory, images)),
            forwarder: Arc::new(forwarder),
            proxy: Arc::new(config.proxy.clone()),
        })
    }
}

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    let router = Router::new()
        .merge(health::create_health_router())
        .merge(catalog::create_catalog_router());

    // Apply layers before state
    let router = router
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    // Apply state to all routes (must be last)
    router.with_state(state)
}
