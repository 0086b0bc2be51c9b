//! Account route handlers.
//!
//! Every route here requires a signed-in customer. Reads and writes use the
//! customer's own token so the backend's row-level security applies.

use askama::Template;
use askama_web::WebTemplate;
use aurelia_backend::Auth;
use aurelia_backend::repos::{OrderRepository, ProfileRepository};
use aurelia_core::validation::{is_valid_phone, normalize_phone};
use aurelia_core::{Order, OrderId, Profile, ProfileUpdate};
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{info, instrument};

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{RequireAuth, set_current_user};
use crate::page::PageContext;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub phone: String,
}

impl ProfileForm {
    /// Validate and turn into an update. Blank fields clear the value.
    ///
    /// # Errors
    ///
    /// Returns the error code for an invalid phone number.
    pub fn into_update(self) -> std::result::Result<ProfileUpdate, &'static str> {
        let full_name = self.full_name.trim();
        let phone = self.phone.trim();

        if full_name.chars().count() > 100 {
            return Err("name_length");
        }
        if !phone.is_empty() && !is_valid_phone(phone) {
            return Err("invalid_phone");
        }

        Ok(ProfileUpdate {
            full_name: (!full_name.is_empty()).then(|| full_name.to_string()),
            phone: (!phone.is_empty()).then(|| normalize_phone(phone)),
        })
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "account/index.html")]
pub struct AccountTemplate {
    pub page: PageContext,
    pub profile: Profile,
    /// Latest three orders.
    pub orders: Vec<Order>,
}

#[derive(Template, WebTemplate)]
#[template(path = "account/orders.html")]
pub struct OrdersTemplate {
    pub page: PageContext,
    pub orders: Vec<Order>,
}

#[derive(Template, WebTemplate)]
#[template(path = "account/order.html")]
pub struct OrderTemplate {
    pub page: PageContext,
    pub order: Order,
}

/// Profile page with the latest orders.
#[instrument(skip(state, page, user), fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    page: PageContext,
) -> Result<impl IntoResponse> {
    let auth = Auth::User(&user.access_token);

    let profile = ProfileRepository::new(state.backend())
        .get(auth, user.id)
        .await?
        .unwrap_or_else(|| Profile {
            id: user.id,
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            phone: None,
            role: user.role,
            created_at: None,
        });

    let mut orders = OrderRepository::new(state.backend())
        .list_for_user(auth, user.id)
        .await?;
    orders.truncate(3);

    Ok(AccountTemplate {
        page,
        profile,
        orders,
    })
}

/// Update name and phone.
#[instrument(skip(state, session, user, form), fields(user_id = %user.id))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(mut user): RequireAuth,
    Form(form): Form<ProfileForm>,
) -> Result<Redirect> {
    let update = match form.into_update() {
        Ok(update) => update,
        Err(code) => return Ok(Redirect::to(&format!("/account?error={code}"))),
    };

    let profile = ProfileRepository::new(state.backend())
        .update(Auth::User(&user.access_token), user.id, &update)
        .await?;

    user.full_name = profile.full_name;
    set_current_user(&session, &user).await?;
    info!("profile updated");

    Ok(Redirect::to("/account?notice=profile_saved"))
}

/// Order history.
#[instrument(skip(state, page, user), fields(user_id = %user.id))]
pub async fn orders(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    page: PageContext,
) -> Result<impl IntoResponse> {
    let orders = OrderRepository::new(state.backend())
        .list_for_user(Auth::User(&user.access_token), user.id)
        .await?;

    Ok(OrdersTemplate { page, orders })
}

/// One order with its lines. Other customers' orders are not found.
#[instrument(skip(state, page, user), fields(user_id = %user.id))]
pub async fn order(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    page: PageContext,
    Path(id): Path<OrderId>,
) -> Result<impl IntoResponse> {
    let order = OrderRepository::new(state.backend())
        .get_for_user(Auth::User(&user.access_token), user.id, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    Ok(OrderTemplate { page, order })
}
