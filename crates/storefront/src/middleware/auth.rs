//! Authentication extractors.
//!
//! The signed-in customer lives in the session as a [`CurrentUser`]. Access
//! tokens close to expiry are refreshed transparently; a refresh failure
//! signs the customer out.

use axum::{
    extract::{FromRequestParts, OriginalUri},
    http::{StatusCode, Uri, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use tower_sessions::Session;
use tracing::{info, warn};

use crate::models::{CurrentUser, session_keys};
use crate::state::AppState;

/// Extractor that requires a signed-in customer.
///
/// Page requests are redirected to the login page with a `next` parameter;
/// `/api/` requests get a bare 401.
///
/// # Example
///
/// ```rust,ignore
/// async fn account(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Hola, {}", user.display_name())
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Rejection for [`RequireAuth`].
pub enum AuthRejection {
    /// Redirect to login page, returning to `next` afterwards.
    RedirectToLogin { next: String },
    /// Unauthorized response (for API requests).
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin { next } => Redirect::to(&login_url(&next)).into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

/// Login URL that returns to `next`.
#[must_use]
pub fn login_url(next: &str) -> String {
    format!(
        "/auth/login?error=login_required&next={}",
        urlencoding::encode(next)
    )
}

/// URI as the client sent it. Nested routers see the prefix stripped from
/// `parts.uri`, so prefer the original.
#[must_use]
pub fn request_uri(parts: &Parts) -> &Uri {
    parts
        .extensions
        .get::<OriginalUri>()
        .map_or(&parts.uri, |OriginalUri(uri)| uri)
}

/// Only same-site absolute paths are accepted as post-login targets.
#[must_use]
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path
        }
        _ => "/account",
    }
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let rejection = || {
            let uri = request_uri(parts);
            if uri.path().starts_with("/api/") {
                AuthRejection::Unauthorized
            } else {
                let next = uri
                    .path_and_query()
                    .map_or("/", |pq| pq.as_str())
                    .to_string();
                AuthRejection::RedirectToLogin { next }
            }
        };

        let Some(session) = parts.extensions.get::<Session>().cloned() else {
            return Err(AuthRejection::Unauthorized);
        };

        let Some(mut user) = session
            .get::<CurrentUser>(session_keys::CURRENT_USER)
            .await
            .ok()
            .flatten()
        else {
            return Err(rejection());
        };

        if user.needs_refresh(Utc::now()) {
            match state.backend().refresh(&user.refresh_token).await {
                Ok(tokens) => {
                    user.refreshed(tokens);
                    if let Err(e) = set_current_user(&session, &user).await {
                        warn!(error = %e, "failed to store refreshed session");
                    }
                }
                Err(e) => {
                    info!(user_id = %user.id, error = %e, "session refresh failed, signing out");
                    let _ = clear_current_user(&session).await;
                    return Err(rejection());
                }
            }
        }

        Ok(Self(user))
    }
}

/// Extractor that optionally gets the current customer.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentUser>(session_keys::CURRENT_USER)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(user))
    }
}

/// Store the signed-in customer, rotating the session ID.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Remove the signed-in customer from the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentUser>(session_keys::CURRENT_USER)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_url_encodes_next() {
        assert_eq!(
            login_url("/account/orders?page=2"),
            "/auth/login?error=login_required&next=%2Faccount%2Forders%3Fpage%3D2"
        );
    }

    #[test]
    fn test_safe_next_rejects_offsite_targets() {
        assert_eq!(safe_next(Some("/favorites")), "/favorites");
        assert_eq!(safe_next(Some("//evil.example")), "/account");
        assert_eq!(safe_next(Some("https://evil.example")), "/account");
        assert_eq!(safe_next(Some("/\\evil.example")), "/account");
        assert_eq!(safe_next(None), "/account");
    }
}
