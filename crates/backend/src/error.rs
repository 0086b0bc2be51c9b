//! Backend error type.

use serde::Deserialize;
use thiserror::Error;

/// Errors returned by [`crate::BackendClient`] and the repositories.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Transport failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status not covered by a more specific variant.
    #[error("backend returned {status}: {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// Missing, expired or rejected credentials (HTTP 401/403).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Wrong email or password on sign-in.
    #[error("invalid login credentials")]
    InvalidCredentials,

    /// Sign-up for an email that already has an account.
    #[error("user already registered")]
    UserAlreadyExists,

    /// Unique constraint or other conflict.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Response body did not match the expected shape.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Client misconfiguration, e.g. a service call without a service key.
    #[error("configuration error: {0}")]
    Config(String),
}

impl BackendError {
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_) | Self::InvalidCredentials)
    }

    /// Build an error from a non-success status and its body.
    pub(crate) fn from_response(status: reqwest::StatusCode, body: &str) -> Self {
        let parsed = serde_json::from_str::<ErrorBody>(body).unwrap_or_default();
        let message = parsed
            .message()
            .map_or_else(|| body.chars().take(200).collect(), str::to_string);
        let code = parsed.code();

        match status.as_u16() {
            401 | 403 => Self::Unauthorized(message),
            404 => Self::NotFound(message),
            409 => Self::Conflict(message),
            _ if code.as_deref() == Some("23505") => Self::Conflict(message),
            status => Self::Api {
                status,
                code,
                message,
            },
        }
    }
}

/// Union of the error bodies the backend's services return.
///
/// The REST API uses `{code, message, details, hint}`, auth uses
/// `{error, error_description}` or `{code, msg, error_code}` and storage uses
/// `{statusCode, error, message}`.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<serde_json::Value>,
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

impl ErrorBody {
    fn message(&self) -> Option<&str> {
        self.message
            .as_deref()
            .or(self.msg.as_deref())
            .or(self.error_description.as_deref())
            .or(self.error.as_deref())
    }

    fn code(&self) -> Option<String> {
        if let Some(code) = &self.error_code {
            return Some(code.clone());
        }
        match &self.code {
            Some(serde_json::Value::String(code)) => Some(code.clone()),
            Some(serde_json::Value::Number(code)) => Some(code.to_string()),
            _ => self.error.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use super::*;

    #[test]
    fn test_rest_error_body() {
        let body = r#"{"code":"42501","details":null,"hint":null,"message":"permission denied for table orders"}"#;
        match BackendError::from_response(StatusCode::BAD_REQUEST, body) {
            BackendError::Api {
                status,
                code,
                message,
            } => {
                assert_eq!(status, 400);
                assert_eq!(code.as_deref(), Some("42501"));
                assert_eq!(message, "permission denied for table orders");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unique_violation_is_conflict() {
        let body = r#"{"code":"23505","message":"duplicate key value violates unique constraint \"posts_slug_key\""}"#;
        let error = BackendError::from_response(StatusCode::CONFLICT, body);
        assert!(matches!(error, BackendError::Conflict(_)));

        let error = BackendError::from_response(StatusCode::BAD_REQUEST, body);
        assert!(matches!(error, BackendError::Conflict(_)));
    }

    #[test]
    fn test_auth_error_body() {
        let body = r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#;
        match BackendError::from_response(StatusCode::BAD_REQUEST, body) {
            BackendError::Api { code, message, .. } => {
                assert_eq!(code.as_deref(), Some("invalid_grant"));
                assert_eq!(message, "Invalid login credentials");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_status_mapping() {
        assert!(BackendError::from_response(StatusCode::UNAUTHORIZED, "{}").is_unauthorized());
        assert!(BackendError::from_response(StatusCode::FORBIDDEN, "").is_unauthorized());
        assert!(BackendError::from_response(StatusCode::NOT_FOUND, "").is_not_found());
    }

    #[test]
    fn test_non_json_body_is_truncated() {
        let body = "x".repeat(1000);
        match BackendError::from_response(StatusCode::BAD_GATEWAY, &body) {
            BackendError::Api { message, code, .. } => {
                assert_eq!(message.len(), 200);
                assert!(code.is_none());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
