//! Client error types.

use std::fmt;

use csapp_types::FieldError;
use reqwest::StatusCode;
use serde::Serialize;
use thiserror::Error;

/// Detail payload of a failed API call.
///
/// The backend reports either a plain message or a list of per-field
/// validation errors; callers must handle both shapes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    /// Human-readable failure description.
    Message(String),
    /// Structured validation errors, one per offending field.
    FieldErrors(Vec<FieldError>),
}

impl ErrorDetail {
    pub fn as_message(&self) -> Option<&str> {
        match self {
            ErrorDetail::Message(msg) => Some(msg),
            ErrorDetail::FieldErrors(_) => None,
        }
    }

    pub fn field_errors(&self) -> Option<&[FieldError]> {
        match self {
            ErrorDetail::Message(_) => None,
            ErrorDetail::FieldErrors(errors) => Some(errors),
        }
    }
}

impl fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorDetail::Message(msg) => f.write_str(msg),
            ErrorDetail::FieldErrors(errors) => {
                let joined = errors
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; ");
                write!(f, "validation failed: {}", joined)
            }
        }
    }
}

/// Client error type.
#[derive(Debug, Error)]
pub enum Error {
    /// The request never produced a response (offline, DNS, TLS, timeout).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// URL parsing failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Server returned an error response.
    #[error("API error ({status}): {detail}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error detail from the response body.
        detail: ErrorDetail,
    },

    /// The access token was rejected and could not be refreshed.
    #[error("Session expired, please sign in again")]
    SessionExpired,

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Reading a local file for upload failed.
    #[error("Failed to read '{path}': {source}")]
    File {
        path: String,
        source: std::io::Error,
    },
}

impl Error {
    /// HTTP status associated with this error, if any.
    ///
    /// A session expiry reports 401 so callers can treat it like any other
    /// unauthorized response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::SessionExpired => Some(401),
            Error::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Error detail from the server, if the server answered.
    pub fn detail(&self) -> Option<&ErrorDetail> {
        match self {
            Error::Api { detail, .. } => Some(detail),
            _ => None,
        }
    }

    /// Field-level validation errors, if that is what the server returned.
    pub fn field_errors(&self) -> Option<&[FieldError]> {
        self.detail().and_then(ErrorDetail::field_errors)
    }

    /// Check if this is a structured validation error.
    pub fn is_validation(&self) -> bool {
        self.field_errors().is_some()
    }

    /// Check if the session is gone and the user must sign in again.
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Error::SessionExpired)
    }

    /// Check if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        self.status() == Some(401)
    }

    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Api { status: 404, .. })
    }

    /// Check if this is a server error.
    pub fn is_server_error(&self) -> bool {
        matches!(self, Error::Api { status, .. } if *status >= 500)
    }

    /// Check if the backend could not be reached at all.
    pub fn is_offline(&self) -> bool {
        matches!(self, Error::Network(e) if e.is_connect() || e.is_timeout())
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Build the error detail for a failed response body.
///
/// A JSON body with a `detail` string or field-error list is preserved as-is;
/// anything else falls back to a message naming the HTTP status.
pub(crate) fn parse_error_detail(status: StatusCode, body: &[u8]) -> ErrorDetail {
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(body) else {
        return ErrorDetail::Message(format!(
            "HTTP {} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown Status")
        ));
    };

    match value.get("detail") {
        Some(serde_json::Value::String(msg)) if !msg.is_empty() => {
            ErrorDetail::Message(msg.clone())
        }
        Some(list @ serde_json::Value::Array(_)) => {
            match serde_json::from_value::<Vec<FieldError>>(list.clone()) {
                Ok(errors) => ErrorDetail::FieldErrors(errors),
                Err(_) => ErrorDetail::Message(list.to_string()),
            }
        }
        Some(serde_json::Value::Null | serde_json::Value::String(_)) | None => {
            ErrorDetail::Message(format!("HTTP {}", status.as_u16()))
        }
        Some(other) => ErrorDetail::Message(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_string_detail() {
        let detail = parse_error_detail(
            StatusCode::BAD_REQUEST,
            br#"{"detail": "Lot already sold"}"#,
        );
        assert_eq!(detail, ErrorDetail::Message("Lot already sold".into()));
    }

    #[test]
    fn test_parse_field_errors() {
        let body = br#"{"detail": [
            {"loc": ["body", "email"], "msg": "invalid email", "type": "value_error"},
            {"loc": ["body", "phone"], "msg": "field required", "type": "missing"}
        ]}"#;
        let detail = parse_error_detail(StatusCode::UNPROCESSABLE_ENTITY, body);

        let errors = detail.field_errors().unwrap();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].field(), "email");
        assert_eq!(errors[1].msg, "field required");
    }

    #[test]
    fn test_parse_non_json_body() {
        let detail = parse_error_detail(StatusCode::INTERNAL_SERVER_ERROR, b"<html>oops</html>");
        let msg = detail.as_message().unwrap();
        assert!(msg.contains("500"));
        assert!(msg.contains("Internal Server Error"));
    }

    #[test]
    fn test_parse_json_without_detail() {
        let detail = parse_error_detail(StatusCode::BAD_GATEWAY, br#"{"error": "upstream"}"#);
        assert_eq!(detail, ErrorDetail::Message("HTTP 502".into()));
    }

    #[test]
    fn test_parse_empty_body() {
        let detail = parse_error_detail(StatusCode::SERVICE_UNAVAILABLE, b"");
        assert!(detail.as_message().unwrap().contains("503"));
    }

    #[test]
    fn test_session_expired_reports_401() {
        let err = Error::SessionExpired;
        assert_eq!(err.status(), Some(401));
        assert!(err.is_auth_error());
        assert!(err.is_session_expired());
        assert!(!err.is_validation());
    }

    #[test]
    fn test_api_error_predicates() {
        let err = Error::Api {
            status: 404,
            detail: ErrorDetail::Message("Client not found".into()),
        };
        assert!(err.is_not_found());
        assert!(!err.is_server_error());
        assert_eq!(err.to_string(), "API error (404): Client not found");
    }
}
