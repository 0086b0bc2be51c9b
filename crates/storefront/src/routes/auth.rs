//! Authentication route handlers.
//!
//! Sign-in, registration and password recovery go through the hosted
//! backend's auth service. After sign-in the customer's profile is resolved
//! and cached in the session together with the tokens.

use askama::Template;
use askama_web::WebTemplate;
use aurelia_backend::{AuthSession, BackendError, SignUpOutcome, resolve_profile};
use aurelia_core::validation::{RegistrationForm, ValidationErrors};
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{error, info, instrument, warn};

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::auth::safe_next;
use crate::middleware::{OptionalAuth, clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::page::PageContext;
use crate::state::AppState;

// =============================================================================
// Forms and Queries
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordForm {
    pub email: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub page: PageContext,
    pub next: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub page: PageContext,
    pub full_name: String,
    pub email: String,
    pub errors: ValidationErrors,
}

/// Shown when the backend asks the new customer to confirm their email.
#[derive(Template, WebTemplate)]
#[template(path = "auth/confirm.html")]
pub struct ConfirmEmailTemplate {
    pub page: PageContext,
    pub email: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "auth/forgot_password.html")]
pub struct ForgotPasswordTemplate {
    pub page: PageContext,
}

// =============================================================================
// Helpers
// =============================================================================

/// Resolve the profile behind a fresh backend session and store the
/// customer in the visitor's session.
async fn start_session(
    state: &AppState,
    session: &Session,
    auth: AuthSession,
) -> std::result::Result<CurrentUser, tower_sessions::session::Error> {
    let resolved = resolve_profile(state.backend(), &auth.access_token, &auth.user).await;
    info!(user_id = %auth.user.id, source = ?resolved.from, "profile resolved");

    let user = CurrentUser::new(auth, &resolved.profile);

    // New identity, new session ID
    session.cycle_id().await?;
    set_current_user(session, &user).await?;
    set_sentry_user(&user.id, Some(&user.email));

    Ok(user)
}

fn login_redirect(code: &str, next: Option<&str>) -> Redirect {
    let mut to = format!("/auth/login?error={code}");
    if let Some(next) = next.filter(|n| !n.is_empty()) {
        to.push_str("&next=");
        to.push_str(&urlencoding::encode(next));
    }
    Redirect::to(&to)
}

// =============================================================================
// Login
// =============================================================================

pub async fn login_page(
    page: PageContext,
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<NextQuery>,
) -> Response {
    if user.is_some() {
        return Redirect::to(safe_next(query.next.as_deref())).into_response();
    }

    LoginTemplate {
        page,
        next: query.next.unwrap_or_default(),
    }
    .into_response()
}

/// Handle login form submission.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let email = form.email.trim().to_lowercase();
    let next = form.next.as_deref();

    let auth = match state
        .backend()
        .sign_in_with_password(&email, &form.password)
        .await
    {
        Ok(auth) => auth,
        Err(BackendError::InvalidCredentials) => {
            info!("login rejected");
            return login_redirect("credentials", next).into_response();
        }
        Err(e) => {
            warn!(error = %e, "login failed");
            return login_redirect("generic", next).into_response();
        }
    };

    match start_session(&state, &session, auth).await {
        Ok(user) => {
            info!(user_id = %user.id, "customer signed in");
            Redirect::to(safe_next(next)).into_response()
        }
        Err(e) => {
            error!(error = %e, "failed to store session after login");
            login_redirect("session", next).into_response()
        }
    }
}

// =============================================================================
// Registration
// =============================================================================

pub async fn register_page(page: PageContext) -> impl IntoResponse {
    RegisterTemplate {
        page,
        full_name: String::new(),
        email: String::new(),
        errors: ValidationErrors::new(),
    }
}

/// Handle registration form submission.
#[instrument(skip(state, session, page, form), fields(email = %form.email))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    page: PageContext,
    Form(form): Form<RegistrationForm>,
) -> Result<Response> {
    let rerender = |page: PageContext, errors: ValidationErrors| {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            RegisterTemplate {
                page,
                full_name: form.full_name.clone(),
                email: form.email.clone(),
                errors,
            },
        )
            .into_response()
    };

    if let Err(errors) = form.validate() {
        let code = errors
            .first()
            .and_then(|(_, key)| key.strip_prefix("error."))
            .unwrap_or("generic");
        return Ok(rerender(page.clone().with_error(code), errors));
    }

    let email = form.email.trim().to_lowercase();
    let outcome = state
        .backend()
        .sign_up(&email, &form.password, form.full_name.trim())
        .await;

    match outcome {
        Ok(SignUpOutcome::SignedIn(auth)) => {
            start_session(&state, &session, auth).await?;
            info!("customer registered and signed in");
            Ok(Redirect::to("/account").into_response())
        }
        Ok(SignUpOutcome::ConfirmationRequired) => {
            info!("customer registered, confirmation pending");
            Ok(ConfirmEmailTemplate { page, email }.into_response())
        }
        Err(BackendError::UserAlreadyExists) => {
            Ok(rerender(page.with_error("email_taken"), ValidationErrors::new()))
        }
        Err(e) => {
            warn!(error = %e, "registration failed");
            Ok(rerender(page.with_error("generic"), ValidationErrors::new()))
        }
    }
}

// =============================================================================
// Password Recovery
// =============================================================================

pub async fn forgot_password_page(page: PageContext) -> impl IntoResponse {
    ForgotPasswordTemplate { page }
}

/// Request a reset email. Always reports success so addresses cannot be
/// probed.
#[instrument(skip(state, form))]
pub async fn forgot_password(
    State(state): State<AppState>,
    Form(form): Form<ForgotPasswordForm>,
) -> Redirect {
    let email = form.email.trim().to_lowercase();
    if !email.is_empty() {
        let redirect_to = format!("{}/auth/login", state.config().base_url);
        if let Err(e) = state.backend().recover(&email, Some(&redirect_to)).await {
            warn!(error = %e, "password recovery request failed");
        }
    }

    Redirect::to("/auth/forgot-password?notice=recovery_sent")
}

// =============================================================================
// Logout
// =============================================================================

/// Sign out locally and at the backend. The cart and language survive.
#[instrument(skip(state, session, user))]
pub async fn logout(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Result<Redirect> {
    if let Some(user) = user {
        state.backend().sign_out(&user.access_token).await;
        info!(user_id = %user.id, "customer signed out");
    }

    clear_current_user(&session).await?;
    session.cycle_id().await?;
    clear_sentry_user();

    Ok(Redirect::to("/?notice=logged_out"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_redirect_keeps_next() {
        let redirect = login_redirect("credentials", Some("/checkout"));
        let response = redirect.into_response();
        assert_eq!(
            response.headers()["location"],
            "/auth/login?error=credentials&next=%2Fcheckout"
        );
    }

    #[test]
    fn test_login_redirect_without_next() {
        let response = login_redirect("generic", Some("")).into_response();
        assert_eq!(response.headers()["location"], "/auth/login?error=generic");
    }
}
