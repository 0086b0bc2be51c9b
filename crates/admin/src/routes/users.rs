//! Customer and administrator accounts.

use askama::Template;
use askama_web::WebTemplate;
use aurelia_backend::Auth;
use aurelia_backend::repos::ProfileRepository;
use aurelia_core::models::Profile;
use aurelia_core::{UserId, UserRole};
use axum::{
    Form,
    extract::{Path, Query, State},
    response::Redirect,
};
use serde::Deserialize;
use tracing::{instrument, warn};

use crate::error::Result;
use crate::filters;
use crate::page::AdminPage;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct UserListQuery {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RoleForm {
    pub role: String,
}

/// User list template.
#[derive(Template, WebTemplate)]
#[template(path = "users/index.html")]
pub struct UsersIndexTemplate {
    pub page: AdminPage,
    pub users: Vec<Profile>,
    pub search: String,
}

impl UsersIndexTemplate {
    /// The signed-in admin's own row gets no role controls.
    #[must_use]
    pub fn is_self(&self, user: &Profile) -> bool {
        user.id == self.page.admin.id
    }
}

/// Whether `actor` may give `target` the role `role`.
///
/// # Errors
///
/// Returns the error code to show: an admin cannot demote themselves, so
/// the store always keeps at least the acting administrator.
pub fn check_role_change(
    actor: UserId,
    target: UserId,
    role: UserRole,
) -> std::result::Result<(), &'static str> {
    if actor == target && !role.is_admin() {
        return Err("self_demote");
    }
    Ok(())
}

pub async fn index(
    State(state): State<AppState>,
    page: AdminPage,
    Query(query): Query<UserListQuery>,
) -> Result<UsersIndexTemplate> {
    let search = query.q.unwrap_or_default();
    let users = ProfileRepository::new(state.backend())
        .list(Auth::Service, Some(search.as_str()))
        .await?;

    Ok(UsersIndexTemplate {
        page,
        users,
        search,
    })
}

#[instrument(skip(state, page, form))]
pub async fn set_role(
    State(state): State<AppState>,
    page: AdminPage,
    Path(id): Path<UserId>,
    Form(form): Form<RoleForm>,
) -> Result<Redirect> {
    let Ok(role) = form.role.parse::<UserRole>() else {
        return Ok(Redirect::to("/users?error=invalid_role"));
    };

    if let Err(code) = check_role_change(page.admin.id, id, role) {
        warn!(admin_id = %page.admin.id, "admin tried to demote themselves");
        return Ok(Redirect::to(&format!("/users?error={code}")));
    }

    ProfileRepository::new(state.backend())
        .set_role(Auth::Service, id, role)
        .await?;

    Ok(Redirect::to("/users?notice=role_updated"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_cannot_demote_self() {
        let me = UserId::random();
        assert_eq!(
            check_role_change(me, me, UserRole::Customer),
            Err("self_demote")
        );
        assert_eq!(check_role_change(me, me, UserRole::Admin), Ok(()));
    }

    #[test]
    fn test_admin_can_change_others() {
        let me = UserId::random();
        let other = UserId::random();
        assert_eq!(check_role_change(me, other, UserRole::Customer), Ok(()));
        assert_eq!(check_role_change(me, other, UserRole::Admin), Ok(()));
    }
}
