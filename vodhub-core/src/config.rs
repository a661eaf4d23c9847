use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::provider::{OpenListSettings, SettingsSource};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub proxy: ProxyConfig,
    pub openlist: OpenListConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub http_port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            http_port: 8080,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String, // "json" or "pretty"
    pub file_path: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file_path: None,
        }
    }
}

/// Media proxy rewriting and upstream forwarding
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Public scheme+host of this deployment. When unset, the origin is
    /// derived from each request's forwarding headers.
    pub site_base: Option<String>,
    /// Access token appended to proxied stream references
    pub token: Option<String>,
    pub upstream_timeout_seconds: u64,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            site_base: None,
            token: None,
            upstream_timeout_seconds: 15,
        }
    }
}

/// OpenList backend behind the synthesized catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenListConfig {
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub root_path: Option<String>,
    pub image_base_url: String,
    pub image_size: String,
}

impl Default for OpenListConfig {
    fn default() -> Self {
        Self {
            url: None,
            username: None,
            password: None,
            root_path: None,
            image_base_url: "https://image.tmdb.org/t/p".to_string(),
            image_size: "w500".to_string(),
        }
    }
}

impl OpenListConfig {
    /// Settings usable by the catalog, or `None` while any part is missing.
    #[must_use]
    pub fn settings(&self) -> Option<OpenListSettings> {
        fn present(value: Option<&String>) -> Option<String> {
            value.map(|v| v.trim()).filter(|v| !v.is_empty()).map(ToString::to_string)
        }

        Some(OpenListSettings {
            url: present(self.url.as_ref())?,
            username: present(self.username.as_ref())?,
            password: present(self.password.as_ref())?,
            root_path: present(self.root_path.as_ref())?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Redis holding the global values. Without it no metadata is available.
    pub redis_url: Option<String>,
    pub metainfo_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            redis_url: None,
            metainfo_key: "video.metainfo".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from multiple sources with priority:
    /// 1. Environment variables (highest priority)
    /// 2. Config file (if provided)
    /// 3. Defaults (lowest priority)
    pub fn load(config_file: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        if let Some(path) = config_file {
            if Path::new(path).exists() {
                builder = builder.add_source(File::with_name(path));
            }
        }

        // VODHUB_PROXY__SITE_BASE, VODHUB_OPENLIST__ROOT_PATH, ...
        builder = builder.add_source(
            Environment::with_prefix("VODHUB")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Load from environment variables only (for Docker/K8s)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(None)
    }

    /// Check values that deserialize fine but cannot work at runtime.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if let Some(base) = self.proxy.site_base.as_deref().filter(|b| !b.trim().is_empty()) {
            match url::Url::parse(base) {
                Ok(u) if matches!(u.scheme(), "http" | "https") => {}
                _ => errors.push(format!("proxy.site_base is not an http(s) URL: {base}")),
            }
        }
        if self.proxy.upstream_timeout_seconds == 0 {
            errors.push("proxy.upstream_timeout_seconds must be greater than 0".to_string());
        }
        if let Some(url) = self.openlist.url.as_deref().filter(|u| !u.trim().is_empty()) {
            if url::Url::parse(url).is_err() {
                errors.push(format!("openlist.url is not a valid URL: {url}"));
            }
        }
        if !matches!(self.logging.format.as_str(), "json" | "pretty") {
            errors.push(format!("logging.format must be \"json\" or \"pretty\": {}", self.logging.format));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Get HTTP address
    #[must_use]
    pub fn http_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.http_port)
    }
}

impl SettingsSource for Config {
    fn openlist(&self) -> Option<OpenListSettings> {
        self.openlist.settings()
    }
}
