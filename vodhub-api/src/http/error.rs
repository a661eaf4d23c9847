// HTTP error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;
use vodhub_core::service::UpstreamError;

/// Result type for HTTP handlers
pub type AppResult<T> = Result<T, AppError>;

pub const MSG_PROXY_FAILED: &str = "代理请求失败";

/// Application error with HTTP status code
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
    pub details: Option<String>,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: None,
        }
    }

    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn gateway_timeout(message: impl Into<String>) -> Self {
        Self::new(StatusCode::GATEWAY_TIMEOUT, message)
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.status, self.message)
    }
}

impl std::error::Error for AppError {}

/// Error response JSON structure
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.message,
            details: self.details,
        });

        (self.status, body).into_response()
    }
}

/// Convert forwarding outcomes to HTTP errors
impl From<UpstreamError> for AppError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::InvalidTarget(msg) => {
                AppError::bad_request("无效的 API 地址").with_details(msg)
            }
            UpstreamError::Timeout(_) => AppError::gateway_timeout("请求超时"),
            UpstreamError::Cancelled => AppError::gateway_timeout("请求已取消"),
            UpstreamError::Status(status) => {
                AppError::new(status, format!("上游服务器返回错误: {}", status.as_u16()))
            }
            err @ (UpstreamError::Network(_)
            | UpstreamError::Parse(_)
            | UpstreamError::ResponseTooLarge { .. }) => {
                AppError::internal_server_error(MSG_PROXY_FAILED).with_details(err.to_string())
            }
        }
    }
}
