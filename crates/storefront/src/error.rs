//! Unified error handling with Sentry integration.
//!
//! Route handlers return `Result<T, AppError>`. Server-side failures are
//! captured to Sentry before a generic error page is rendered; internal
//! details never reach the visitor.

use askama::Template;
use askama_web::WebTemplate;
use aurelia_backend::BackendError;
use aurelia_core::Locale;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Hosted backend call failed.
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Session store failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Backend(err) => match err {
                BackendError::Unauthorized(_) | BackendError::InvalidCredentials => {
                    StatusCode::UNAUTHORIZED
                }
                BackendError::NotFound(_) => StatusCode::NOT_FOUND,
                BackendError::Conflict(_) | BackendError::UserAlreadyExists => StatusCode::CONFLICT,
                BackendError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::BAD_GATEWAY,
            },
            Self::Session(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Message key shown to the visitor.
    #[must_use]
    pub const fn message_key(&self) -> &'static str {
        match self.status().as_u16() {
            404 => "error.not_found",
            401 => "error.login_required",
            403 => "error.forbidden",
            _ => "error.generic",
        }
    }
}

/// Error page.
#[derive(Template, WebTemplate)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub status: u16,
    pub message_es: &'static str,
    pub message_en: &'static str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, status = %status, "Request rejected");
        }

        let key = self.message_key();
        let page = ErrorTemplate {
            status: status.as_u16(),
            message_es: Locale::Es.t(key),
            message_en: Locale::En.t(key),
        };

        (status, page).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context after sign-in.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context on sign-out.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for a customer action.
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    for (key, value) in data.unwrap_or_default() {
        breadcrumb.data.insert(
            (*key).to_string(),
            serde_json::Value::String((*value).to_string()),
        );
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(status(AppError::NotFound("p".to_string())), StatusCode::NOT_FOUND);
        assert_eq!(status(AppError::Unauthorized("u".to_string())), StatusCode::UNAUTHORIZED);
        assert_eq!(status(AppError::Forbidden("f".to_string())), StatusCode::FORBIDDEN);
        assert_eq!(status(AppError::BadRequest("b".to_string())), StatusCode::BAD_REQUEST);
        assert_eq!(status(AppError::Internal("i".to_string())), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_backend_status_mapping() {
        assert_eq!(
            status(AppError::Backend(BackendError::NotFound("x".to_string()))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status(AppError::Backend(BackendError::Unauthorized("jwt expired".to_string()))),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status(AppError::Backend(BackendError::Api {
                status: 500,
                code: None,
                message: "boom".to_string(),
            })),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_message_keys() {
        assert_eq!(AppError::NotFound(String::new()).message_key(), "error.not_found");
        assert_eq!(AppError::Internal(String::new()).message_key(), "error.generic");
    }

    #[test]
    fn test_display() {
        let err = AppError::NotFound("product-123".to_string());
        assert_eq!(err.to_string(), "Not found: product-123");
    }
}
