//! Password authentication against the backend's auth service.

use aurelia_core::UserId;
use chrono::{DateTime, TimeDelta, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{instrument, warn};

use crate::client::{Auth, BackendClient};
use crate::error::BackendError;

/// A bearer token issued by the auth service.
///
/// Serializable so it can live in the server-side session; `Debug` never
/// prints the value.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken([REDACTED])")
    }
}

/// The auth service's view of a user.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: serde_json::Value,
}

impl AuthUser {
    /// `full_name` given at sign-up, if any.
    #[must_use]
    pub fn full_name(&self) -> Option<&str> {
        self.user_metadata
            .get("full_name")
            .and_then(serde_json::Value::as_str)
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

/// A signed-in session.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub access_token: AccessToken,
    pub refresh_token: AccessToken,
    pub expires_at: DateTime<Utc>,
    pub user: AuthUser,
}

/// Result of a sign-up.
#[derive(Debug, Clone)]
pub enum SignUpOutcome {
    /// Email confirmation is disabled; the user is signed in.
    SignedIn(AuthSession),
    /// A confirmation email was sent.
    ConfirmationRequired,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: AuthUser,
}

impl TokenResponse {
    fn into_session(self, now: DateTime<Utc>) -> AuthSession {
        let expires_at = self
            .expires_at
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
            .or_else(|| {
                self.expires_in
                    .and_then(TimeDelta::try_seconds)
                    .map(|ttl| now + ttl)
            })
            .unwrap_or_else(|| now + TimeDelta::hours(1));

        AuthSession {
            access_token: AccessToken(self.access_token),
            refresh_token: AccessToken(self.refresh_token),
            expires_at,
            user: self.user,
        }
    }
}

/// Sign-up answers with a session when auto-confirm is on, or a bare user
/// otherwise.
#[derive(Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(TokenResponse),
    User(serde_json::Value),
}

impl BackendClient {
    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::InvalidCredentials`] for a wrong email or
    /// password, or another error on transport failure.
    #[instrument(skip(self, password))]
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, BackendError> {
        let url = self.endpoint("auth/v1/token?grant_type=password");
        let request = self
            .request(Method::POST, &url, Auth::Anon)?
            .json(&json!({ "email": email, "password": password }));

        match self.send_json::<TokenResponse>(request).await {
            Ok(tokens) => Ok(tokens.into_session(Utc::now())),
            Err(BackendError::Api { status: 400, .. }) => Err(BackendError::InvalidCredentials),
            Err(e) => Err(e),
        }
    }

    /// Exchange a refresh token for a new session.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Unauthorized`] when the refresh token is no
    /// longer valid.
    #[instrument(skip_all)]
    pub async fn refresh(&self, refresh_token: &AccessToken) -> Result<AuthSession, BackendError> {
        let url = self.endpoint("auth/v1/token?grant_type=refresh_token");
        let request = self
            .request(Method::POST, &url, Auth::Anon)?
            .json(&json!({ "refresh_token": refresh_token.expose() }));

        match self.send_json::<TokenResponse>(request).await {
            Ok(tokens) => Ok(tokens.into_session(Utc::now())),
            Err(BackendError::Api { status: 400, message, .. }) => {
                Err(BackendError::Unauthorized(message))
            }
            Err(e) => Err(e),
        }
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::UserAlreadyExists`] when the email is taken.
    #[instrument(skip(self, password))]
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<SignUpOutcome, BackendError> {
        let url = self.endpoint("auth/v1/signup");
        let request = self.request(Method::POST, &url, Auth::Anon)?.json(&json!({
            "email": email,
            "password": password,
            "data": { "full_name": full_name },
        }));

        match self.send_json::<SignUpResponse>(request).await {
            Ok(SignUpResponse::Session(tokens)) => {
                Ok(SignUpOutcome::SignedIn(tokens.into_session(Utc::now())))
            }
            Ok(SignUpResponse::User(_)) => Ok(SignUpOutcome::ConfirmationRequired),
            Err(e) if is_duplicate_signup(&e) => Err(BackendError::UserAlreadyExists),
            Err(e) => Err(e),
        }
    }

    /// Look up the user a token belongs to.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Unauthorized`] for an expired or invalid token.
    #[instrument(skip_all)]
    pub async fn get_user(&self, token: &AccessToken) -> Result<AuthUser, BackendError> {
        let url = self.endpoint("auth/v1/user");
        let request = self.request(Method::GET, &url, Auth::User(token))?;
        self.send_json(request).await
    }

    /// Revoke the session behind `token`. Failures are logged, not returned.
    #[instrument(skip_all)]
    pub async fn sign_out(&self, token: &AccessToken) {
        let url = self.endpoint("auth/v1/logout");
        let result = match self.request(Method::POST, &url, Auth::User(token)) {
            Ok(request) => self.send(request).await.map(|_| ()),
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            warn!(error = %e, "backend sign-out failed");
        }
    }

    /// Send a password reset email.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a rejected request.
    #[instrument(skip(self))]
    pub async fn recover(&self, email: &str, redirect_to: Option<&str>) -> Result<(), BackendError> {
        let mut url = self.endpoint("auth/v1/recover");
        if let Some(redirect) = redirect_to {
            url = format!("{url}?redirect_to={}", urlencoding::encode(redirect));
        }
        let request = self
            .request(Method::POST, &url, Auth::Anon)?
            .json(&json!({ "email": email }));
        self.send(request).await?;
        Ok(())
    }
}

fn is_duplicate_signup(error: &BackendError) -> bool {
    match error {
        BackendError::Api { code, message, .. } => {
            code.as_deref() == Some("user_already_exists")
                || message.to_lowercase().contains("already registered")
        }
        BackendError::Conflict(message) => message.to_lowercase().contains("already registered"),
        _ => false,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const TOKEN_BODY: &str = r#"{
        "access_token": "jwt",
        "token_type": "bearer",
        "expires_in": 3600,
        "refresh_token": "refresh",
        "user": {
            "id": "6f1c2f0e-8a39-4c3e-9f55-1f0f8f5d2a11",
            "email": "ana@example.mx",
            "user_metadata": {"full_name": " Ana López "}
        }
    }"#;

    #[test]
    fn test_token_response_into_session() {
        let now = Utc::now();
        let tokens: TokenResponse = serde_json::from_str(TOKEN_BODY).unwrap();
        let session = tokens.into_session(now);

        assert_eq!(session.access_token.expose(), "jwt");
        assert_eq!(session.expires_at, now + TimeDelta::seconds(3600));
        assert_eq!(session.user.email.as_deref(), Some("ana@example.mx"));
        assert_eq!(session.user.full_name(), Some("Ana López"));
    }

    #[test]
    fn test_signup_without_session_needs_confirmation() {
        let body = r#"{"id":"6f1c2f0e-8a39-4c3e-9f55-1f0f8f5d2a11","email":"ana@example.mx","confirmation_sent_at":"2026-01-01T00:00:00Z"}"#;
        let parsed: SignUpResponse = serde_json::from_str(body).unwrap();
        assert!(matches!(parsed, SignUpResponse::User(_)));

        let parsed: SignUpResponse = serde_json::from_str(TOKEN_BODY).unwrap();
        assert!(matches!(parsed, SignUpResponse::Session(_)));
    }

    #[test]
    fn test_duplicate_signup_detection() {
        let by_code = BackendError::Api {
            status: 422,
            code: Some("user_already_exists".to_string()),
            message: "exists".to_string(),
        };
        let by_message = BackendError::Api {
            status: 400,
            code: None,
            message: "User already registered".to_string(),
        };
        let other = BackendError::Api {
            status: 422,
            code: Some("weak_password".to_string()),
            message: "Password should be at least 6 characters".to_string(),
        };
        assert!(is_duplicate_signup(&by_code));
        assert!(is_duplicate_signup(&by_message));
        assert!(!is_duplicate_signup(&other));
    }

    #[test]
    fn test_access_token_debug_is_redacted() {
        let token = AccessToken::new("secret-jwt");
        assert!(!format!("{token:?}").contains("secret-jwt"));
        assert_eq!(serde_json::to_string(&token).unwrap(), "\"secret-jwt\"");
    }

    #[test]
    fn test_full_name_missing_or_blank() {
        let user: AuthUser = serde_json::from_str(
            r#"{"id":"6f1c2f0e-8a39-4c3e-9f55-1f0f8f5d2a11","user_metadata":{"full_name":"  "}}"#,
        )
        .unwrap();
        assert_eq!(user.full_name(), None);
        assert_eq!(user.email, None);
    }
}
