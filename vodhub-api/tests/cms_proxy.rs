//! Router-level tests for the catalog proxy endpoint

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use vodhub_api::{create_router, AppState};
use vodhub_core::cache::MetaInfoCache;
use vodhub_core::config::ProxyConfig;
use vodhub_core::provider::{
    DirectoryDetail, EpisodeRecord, FolderDetail, OpenListSettings, ProviderError, SettingsSource,
    TmdbImageResolver,
};
use vodhub_core::repository::MemoryStore;
use vodhub_core::service::{CatalogSynthesizer, UpstreamForwarder};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const INDEX: &str = r#"{"folders": {
    "romance": {"folderName": "A.Romance.Story", "title": "A Romance Story", "poster_path": "/r.jpg",
                "overview": "爱情", "media_type": "movie", "release_date": "2021-02-14"},
    "drama": {"folderName": "Drama", "title": "剧", "poster_path": null, "overview": "", "media_type": "tv"}
}}"#;

struct Settings(Option<OpenListSettings>);

impl SettingsSource for Settings {
    fn openlist(&self) -> Option<OpenListSettings> {
        self.0.clone()
    }
}

struct TwoEpisodes;

#[async_trait]
impl DirectoryDetail for TwoEpisodes {
    async fn directory_detail(&self, folder_name: &str) -> Result<FolderDetail, ProviderError> {
        let episodes = (1..=2)
            .map(|n| EpisodeRecord {
                episode: n,
                title: None,
                play_url: format!("https://ol.example.com/d/media/{folder_name}/E0{n}.mp4"),
            })
            .collect();
        Ok(FolderDetail::found(folder_name, episodes))
    }
}

struct Harness {
    configured: bool,
    timeout: Duration,
    site_base: Option<String>,
}

impl Default for Harness {
    fn default() -> Self {
        Self {
            configured: true,
            timeout: Duration::from_secs(15),
            site_base: None,
        }
    }
}

impl Harness {
    fn router(self) -> Router {
        let settings = self.configured.then(|| OpenListSettings {
            url: "https://ol.example.com".to_string(),
            username: "admin".to_string(),
            password: "pw".to_string(),
            root_path: "/media".to_string(),
        });
        let store = Arc::new(MemoryStore::new());
        store.set_global_value("video.metainfo", INDEX);

        let state = AppState {
            settings: Arc::new(Settings(settings)),
            synthesizer: Arc::new(CatalogSynthesizer::new(
                Arc::new(MetaInfoCache::new(store, "video.metainfo")),
                Arc::new(TwoEpisodes),
                Arc::new(TmdbImageResolver::default()),
            )),
            forwarder: Arc::new(UpstreamForwarder::new(self.timeout).unwrap()),
            proxy: Arc::new(ProxyConfig {
                site_base: self.site_base,
                token: None,
                upstream_timeout_seconds: self.timeout.as_secs(),
            }),
        };
        create_router(state)
    }
}

fn catalog_request(params: &[(&str, &str)]) -> Request<Body> {
    let query = serde_urlencoded::to_string(params).unwrap();
    Request::builder()
        .uri(format!("/api/cms-proxy?{query}"))
        .header(header::HOST, "gateway.example.com")
        .body(Body::empty())
        .unwrap()
}

async fn call(router: Router, request: Request<Body>) -> (StatusCode, Option<String>, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let cache_control = response
        .headers()
        .get(header::CACHE_CONTROL)
        .map(|v| v.to_str().unwrap().to_string());
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, cache_control, serde_json::from_slice(&body).unwrap())
}

fn upstream_body() -> Value {
    json!({
        "code": 1, "msg": "数据列表", "page": 1, "pagecount": 1, "limit": 20, "total": 1,
        "list": [{
            "vod_id": 7, "vod_name": "Show", "vod_play_from": "m3u8",
            "vod_play_url": "第01集$http://a/x.m3u8#第02集$http://a/y.m3u8"
        }]
    })
}

#[tokio::test]
async fn test_missing_api_is_bad_request() {
    let (status, _, body) = call(Harness::default().router(), catalog_request(&[("wd", "x")])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "缺少必要参数: api"}));
}

#[tokio::test]
async fn test_invalid_api_is_bad_request() {
    let (status, _, body) = call(Harness::default().router(), catalog_request(&[("api", "not-a-url")])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_synthesized_without_settings() {
    let router = Harness {
        configured: false,
        ..Harness::default()
    }
    .router();
    let (status, _, body) = call(router, catalog_request(&[("api", "openlist")])).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], 0);
    assert_eq!(body["msg"], "OpenList 未配置");
    assert_eq!(body["list"], json!([]));
}

#[tokio::test]
async fn test_synthesized_search() {
    let (status, cache_control, body) = call(
        Harness::default().router(),
        catalog_request(&[("api", "openlist"), ("wd", "romance")]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(cache_control.is_none());
    assert_eq!(body["code"], 1);
    assert_eq!(body["list"][0]["vod_id"], "romance");
    assert_eq!(body["list"][0]["vod_name"], "A Romance Story");
    assert_eq!(body["total"], 1);
}

#[tokio::test]
async fn test_synthesized_unknown_id() {
    let (status, _, body) = call(
        Harness::default().router(),
        catalog_request(&[("api", "openlist"), ("ids", "missing")]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], 0);
    assert_eq!(body["list"], json!([]));
}

#[tokio::test]
async fn test_synthesized_detail() {
    let (_, _, body) = call(
        Harness::default().router(),
        catalog_request(&[("api", "openlist"), ("ids", "drama")]),
    )
    .await;
    let entry = &body["list"][0];
    assert_eq!(entry["vod_play_from"], "OpenList");
    assert_eq!(
        entry["vod_play_url"],
        "第1集$https://ol.example.com/d/media/Drama/E01.mp4#第2集$https://ol.example.com/d/media/Drama/E02.mp4"
    );
    assert_eq!(entry["type_name"], "电视剧");
}

#[tokio::test]
async fn test_forwarded_playlist_is_rewritten() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api.php/provide/vod"))
        .and(query_param("ac", "detail"))
        .and(query_param("source", "CMS1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(upstream_body()))
        .expect(1)
        .mount(&server)
        .await;

    let router = Harness {
        site_base: Some("https://p/".to_string()),
        ..Harness::default()
    }
    .router();
    let api = format!("{}/api.php/provide/vod", server.uri());
    let (status, cache_control, body) = call(
        router,
        catalog_request(&[("api", api.as_str()), ("ac", "detail"), ("source", "CMS1")]),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(cache_control.as_deref(), Some("no-store, no-cache, must-revalidate"));
    assert_eq!(
        body["list"][0]["vod_play_url"],
        "第01集$https://p/api/proxy-m3u8?url=http%3A%2F%2Fa%2Fx.m3u8&source=CMS1\
         #第02集$https://p/api/proxy-m3u8?url=http%3A%2F%2Fa%2Fy.m3u8&source=CMS1"
    );
    assert_eq!(body["list"][0]["vod_id"], 7);
    assert_eq!(body["limit"], 20);
}

#[tokio::test]
async fn test_forwarded_payload_keeps_upstream_shape() {
    let upstream = json!({
        "code": 1, "limit": "20", "class": [{"type_id": 1}],
        "list": [
            {"vod_id": 2, "vod_content": false, "vod_play_from": []},
            {"vod_id": 3, "vod_name": "A", "vod_play_url": "EP1$http://a/x.m3u8"}
        ]
    });
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(upstream.clone()))
        .mount(&server)
        .await;

    let router = Harness {
        site_base: Some("https://p".to_string()),
        ..Harness::default()
    }
    .router();
    let api = format!("{}/vod", server.uri());
    let (status, _, body) = call(router, catalog_request(&[("api", api.as_str())])).await;

    let mut expected = upstream;
    expected["list"][1]["vod_play_url"] = json!("EP1$https://p/api/proxy-m3u8?url=http%3A%2F%2Fa%2Fx.m3u8");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, expected);
}

#[tokio::test]
async fn test_forwarded_origin_from_host_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(upstream_body()))
        .mount(&server)
        .await;

    let api = format!("{}/vod", server.uri());
    let (_, _, body) = call(Harness::default().router(), catalog_request(&[("api", api.as_str())])).await;
    let play_url = body["list"][0]["vod_play_url"].as_str().unwrap();
    assert!(play_url.starts_with("第01集$https://gateway.example.com/api/proxy-m3u8?url="));
}

#[tokio::test]
async fn test_upstream_status_is_passed_through() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let api = format!("{}/vod", server.uri());
    let (status, _, body) = call(Harness::default().router(), catalog_request(&[("api", api.as_str())])).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "上游服务器返回错误: 404"}));
}

#[tokio::test]
async fn test_malformed_upstream_body_is_internal_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[1, 2"))
        .mount(&server)
        .await;

    let api = format!("{}/vod", server.uri());
    let (status, _, body) = call(Harness::default().router(), catalog_request(&[("api", api.as_str())])).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "代理请求失败");
    assert!(body["details"].is_string());
}

#[tokio::test]
async fn test_slow_upstream_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(upstream_body())
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let router = Harness {
        timeout: Duration::from_millis(200),
        ..Harness::default()
    }
    .router();
    let api = format!("{}/vod", server.uri());
    let (status, _, body) = call(router, catalog_request(&[("api", api.as_str())])).await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body, json!({"error": "请求超时"}));
}

#[tokio::test]
async fn test_health() {
    let response = Harness::default()
        .router()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"OK");
}
