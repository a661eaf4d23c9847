//! OpenList HTTP Client

use std::sync::LazyLock;
use std::time::Duration;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, ORIGIN, REFERER, USER_AGENT},
    Client,
};
use serde_json::json;

use super::types::{FsListResp, LoginData};
use crate::error::{read_envelope, ProviderClientError as OpenListError};

/// Path segment characters OpenList's web UI leaves unescaped.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Shared HTTP client for all OpenList requests (connection pooling).
/// Redirects are disabled so a backend cannot bounce us to another host.
static SHARED_CLIENT: LazyLock<Client> = LazyLock::new(|| {
    Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(30))
        .pool_max_idle_per_host(10)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!("Failed to build OpenList HTTP client, using defaults: {e}");
            Client::new()
        })
});

/// OpenList HTTP Client
///
/// - Authentication (`/api/auth/login`)
/// - Directory listing (`/api/fs/list`)
/// - Direct download links (`/d/...`)
pub struct OpenListClient {
    host: String,
    token: Option<String>,
    client: Client,
}

impl OpenListClient {
    /// Create a new client (reuses shared connection pool)
    pub fn new(host: impl Into<String>) -> Result<Self, OpenListError> {
        let host = host.into().trim_end_matches('/').to_string();
        url::Url::parse(&host).map_err(|e| OpenListError::InvalidConfig(format!("invalid host {host}: {e}")))?;
        Ok(Self {
            host,
            token: None,
            client: SHARED_CLIENT.clone(),
        })
    }

    /// Create a new client with an existing token
    pub fn with_token(host: impl Into<String>, token: impl Into<String>) -> Result<Self, OpenListError> {
        let mut client = Self::new(host)?;
        client.set_token(token);
        Ok(client)
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    #[must_use]
    pub const fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn build_headers(&self) -> Result<HeaderMap, OpenListError> {
        let value = |v: &str| {
            HeaderValue::from_str(v).map_err(|e| OpenListError::InvalidConfig(format!("bad header value: {e}")))
        };

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static("Mozilla/5.0"));
        headers.insert(ORIGIN, value(&self.host)?);
        headers.insert(REFERER, value(&format!("{}/", self.host))?);
        if let Some(ref token) = self.token {
            headers.insert(AUTHORIZATION, value(token)?);
        }
        Ok(headers)
    }

    async fn post<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        body: serde_json::Value,
    ) -> Result<T, OpenListError> {
        let url = format!("{}{endpoint}", self.host);

        let response = self
            .client
            .post(&url)
            .headers(self.build_headers()?)
            .json(&body)
            .send()
            .await?;

        read_envelope(response, endpoint).await
    }

    /// Login and keep the returned token on this client
    pub async fn login(&mut self, username: &str, password: &str) -> Result<String, OpenListError> {
        let data: LoginData = self
            .post(
                "/api/auth/login",
                json!({
                    "username": username,
                    "password": password,
                }),
            )
            .await
            .map_err(|e| match e {
                OpenListError::Api { message, .. } => OpenListError::Auth(message),
                other => other,
            })?;

        self.set_token(data.token.clone());
        Ok(data.token)
    }

    /// List directory contents
    ///
    /// `per_page == 0` asks the server for every entry.
    pub async fn fs_list(
        &self,
        path: &str,
        page: u64,
        per_page: u64,
        password: Option<&str>,
    ) -> Result<FsListResp, OpenListError> {
        self.post(
            "/api/fs/list",
            json!({
                "path": path,
                "password": password.unwrap_or(""),
                "page": page,
                "per_page": per_page,
                "refresh": false,
            }),
        )
        .await
    }

    /// Direct download link for `path`, signed when the server handed out a sign.
    #[must_use]
    pub fn download_url(&self, path: &str, sign: &str) -> String {
        let encoded: Vec<String> = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| utf8_percent_encode(s, SEGMENT).to_string())
            .collect();
        let mut url = format!("{}/d/{}", self.host, encoded.join("/"));
        if !sign.is_empty() {
            url.push_str("?sign=");
            url.push_str(&utf8_percent_encode(sign, SEGMENT).to_string());
        }
        url
    }
}
