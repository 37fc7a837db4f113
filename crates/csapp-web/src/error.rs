//! Error types for the gateway.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use csapp_client::ErrorDetail;
use serde::Serialize;
use thiserror::Error;

/// Server error type.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Error returned by, or while reaching, the backend API.
    #[error(transparent)]
    Backend(#[from] csapp_client::Error),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] csapp_config::ConfigError),
}

/// Result type for server operations.
pub type Result<T> = std::result::Result<T, ServerError>;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Backend detail, including per-field validation errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<ErrorDetail>,
}

impl ServerError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ServerError::Backend(e) if e.is_session_expired() => {
                (StatusCode::UNAUTHORIZED, "session_expired")
            }
            ServerError::Backend(e) if e.is_validation() => {
                (StatusCode::UNPROCESSABLE_ENTITY, "validation_error")
            }
            ServerError::Backend(csapp_client::Error::Api { status, .. }) => (
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
                "api_error",
            ),
            ServerError::Backend(e) if e.is_offline() => {
                (StatusCode::SERVICE_UNAVAILABLE, "backend_unavailable")
            }
            ServerError::Backend(_) => (StatusCode::BAD_GATEWAY, "bad_gateway"),
            ServerError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
            ServerError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error"),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(status = %status, code, error = %message, "Server error");
        } else {
            tracing::warn!(status = %status, code, error = %message, "Client error");
        }

        let detail = match self {
            ServerError::Backend(e) => e.detail().cloned(),
            _ => None,
        };

        let body = ErrorResponse {
            code: code.to_string(),
            message,
            detail,
        };

        (status, Json(body)).into_response()
    }
}
