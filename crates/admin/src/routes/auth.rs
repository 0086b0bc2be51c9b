//! Admin authentication route handlers.
//!
//! Administrators sign in with the same backend accounts as customers; only
//! profiles carrying the `admin` role are let through.

use askama::Template;
use askama_web::WebTemplate;
use aurelia_backend::{BackendError, resolve_profile};
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{error, info, instrument, warn};

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{OptionalAdmin, clear_current_admin, set_current_admin};
use crate::models::CurrentAdmin;
use crate::page::{error_message, notice_message};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct BannerQuery {
    pub error: Option<String>,
    pub notice: Option<String>,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub error: Option<&'static str>,
    pub notice: Option<&'static str>,
}

/// Display the login page.
pub async fn login_page(
    OptionalAdmin(admin): OptionalAdmin,
    Query(query): Query<BannerQuery>,
) -> Response {
    if admin.is_some() {
        return Redirect::to("/").into_response();
    }

    LoginTemplate {
        error: query.error.as_deref().map(error_message),
        notice: query.notice.as_deref().and_then(notice_message),
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
    let backend = state.backend();

    let auth = match backend.sign_in_with_password(&email, &form.password).await {
        Ok(auth) => auth,
        Err(BackendError::InvalidCredentials) => {
            info!("admin login rejected");
            return Redirect::to("/auth/login?error=credentials").into_response();
        }
        Err(e) => {
            warn!(error = %e, "admin login failed");
            return Redirect::to("/auth/login?error=generic").into_response();
        }
    };

    let resolved = resolve_profile(backend, &auth.access_token, &auth.user).await;
    if !resolved.profile.role.is_admin() {
        warn!(user_id = %auth.user.id, "non-admin attempted admin login");
        backend.sign_out(&auth.access_token).await;
        return Redirect::to("/auth/login?error=forbidden").into_response();
    }

    let admin = CurrentAdmin::new(auth, &resolved.profile);

    // New identity, new session ID
    let stored = match session.cycle_id().await {
        Ok(()) => set_current_admin(&session, &admin).await,
        Err(e) => Err(e),
    };
    if let Err(e) = stored {
        error!(error = %e, "failed to store admin session");
        return Redirect::to("/auth/login?error=session").into_response();
    }

    set_sentry_user(&admin.id, Some(&admin.email));
    info!(admin_id = %admin.id, "admin signed in");
    Redirect::to("/").into_response()
}

/// Handle logout.
pub async fn logout(
    State(state): State<AppState>,
    session: Session,
    OptionalAdmin(admin): OptionalAdmin,
) -> Redirect {
    if let Some(admin) = admin {
        state.backend().sign_out(&admin.access_token).await;
        info!(admin_id = %admin.id, "admin signed out");
    }

    if let Err(e) = clear_current_admin(&session).await {
        warn!(error = %e, "failed to clear admin session");
    }
    if let Err(e) = session.flush().await {
        warn!(error = %e, "failed to flush admin session");
    }
    clear_sentry_user();

    Redirect::to("/auth/login?notice=logged_out")
}
