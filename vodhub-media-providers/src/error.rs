//! OpenList client errors
//!
//! Every OpenList call answers `{code, message, data}`. `read_envelope` turns
//! both transport failures and non-200 envelope codes into
//! `ProviderClientError`. `read_json` is the size-capped body reader underneath
//! it, also used by the catalog forwarder.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::openlist::types::OpenListResp;

/// Largest response body read from any backend (16 MB).
pub const MAX_RESPONSE_SIZE: usize = 16 * 1024 * 1024;

/// Envelope code OpenList uses for success
const CODE_SUCCESS: i64 = 200;

#[derive(Debug, Error)]
pub enum ProviderClientError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("OpenList answered HTTP {0}")]
    Http(StatusCode),

    #[error("OpenList error {code}: {message}")]
    Api { code: i64, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Response body of {size} bytes exceeds {MAX_RESPONSE_SIZE}")]
    ResponseTooLarge { size: u64 },
}

impl ProviderClientError {
    /// OpenList rejected the credentials or the token, either in the
    /// envelope code or in the HTTP status.
    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        match self {
            Self::Auth(_) => true,
            Self::Api { code, .. } => matches!(code, 401 | 403),
            Self::Http(status) => matches!(*status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN),
            _ => false,
        }
    }
}

impl From<reqwest::Error> for ProviderClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

impl From<serde_json::Error> for ProviderClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

/// Decode a JSON body, refusing anything above `MAX_RESPONSE_SIZE`.
pub async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ProviderClientError> {
    if let Some(size) = response.content_length().filter(|&n| n > MAX_RESPONSE_SIZE as u64) {
        return Err(ProviderClientError::ResponseTooLarge { size });
    }
    let body = response.bytes().await?;
    if body.len() > MAX_RESPONSE_SIZE {
        return Err(ProviderClientError::ResponseTooLarge {
            size: body.len() as u64,
        });
    }
    Ok(serde_json::from_slice(&body)?)
}

/// Unwrap the `data` of an OpenList envelope from `endpoint`.
pub(crate) async fn read_envelope<T: DeserializeOwned>(
    response: reqwest::Response,
    endpoint: &str,
) -> Result<T, ProviderClientError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ProviderClientError::Http(status));
    }

    let envelope: OpenListResp<T> = read_json(response).await?;
    if envelope.code != CODE_SUCCESS {
        return Err(ProviderClientError::Api {
            code: envelope.code,
            message: envelope.message,
        });
    }
    envelope
        .data
        .ok_or_else(|| ProviderClientError::Parse(format!("{endpoint} returned no data")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(code: i64, message: &str) -> ProviderClientError {
        ProviderClientError::Api {
            code,
            message: message.to_string(),
        }
    }

    #[test]
    fn test_auth_failure_detection() {
        assert!(ProviderClientError::Auth("password is incorrect".to_string()).is_auth_failure());
        assert!(api(401, "token is invalidated").is_auth_failure());
        assert!(api(403, "permission denied").is_auth_failure());
        assert!(ProviderClientError::Http(StatusCode::UNAUTHORIZED).is_auth_failure());
        assert!(!api(500, "object not found").is_auth_failure());
        assert!(!ProviderClientError::Http(StatusCode::BAD_GATEWAY).is_auth_failure());
        assert!(!ProviderClientError::Network("reset".to_string()).is_auth_failure());
    }

    #[test]
    fn test_display() {
        assert_eq!(api(500, "object not found").to_string(), "OpenList error 500: object not found");
        let too_large = ProviderClientError::ResponseTooLarge { size: 20_000_000 }.to_string();
        assert!(too_large.contains("20000000"));
    }
}
