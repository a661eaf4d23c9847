// Provider Error Types

use vodhub_media_providers::ProviderClientError;

/// Errors raised by catalog collaborators
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Authentication required")]
    AuthRequired,

    #[error("Resource not found")]
    NotFound,

    #[error("Provider API error: {0}")]
    ApiError(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

impl From<ProviderClientError> for ProviderError {
    fn from(err: ProviderClientError) -> Self {
        if err.is_auth_failure() {
            return Self::AuthRequired;
        }
        match err {
            ProviderClientError::Network(msg) => Self::NetworkError(msg),
            ProviderClientError::Http(reqwest::StatusCode::NOT_FOUND) => Self::NotFound,
            ProviderClientError::Http(status) => Self::NetworkError(format!("HTTP {status}")),
            ProviderClientError::Api { code, message } => Self::ApiError(format!("{code}: {message}")),
            ProviderClientError::Parse(msg) => Self::ParseError(msg),
            ProviderClientError::InvalidConfig(msg) => Self::InvalidConfig(msg),
            other => Self::ApiError(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, ProviderError>;
