//! Cart route handlers.
//!
//! The cart is kept in the session. Lines carry a display price captured
//! when the product was added; checkout re-prices everything.

use askama::Template;
use askama_web::WebTemplate;
use aurelia_backend::Auth;
use aurelia_backend::repos::ProductRepository;
use aurelia_core::{Cart, CartLine, CartTotals, ProductId};
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{instrument, warn};

use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::Lang;
use crate::models::session_keys;
use crate::page::PageContext;
use crate::state::AppState;

// =============================================================================
// Session Helpers
// =============================================================================

/// Read the visitor's cart. An unreadable cart is treated as empty.
pub async fn load_cart(session: &Session) -> Cart {
    match session.get::<Cart>(session_keys::CART).await {
        Ok(cart) => cart.unwrap_or_default(),
        Err(e) => {
            warn!(error = %e, "failed to read cart from session");
            Cart::default()
        }
    }
}

/// Store the visitor's cart.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn save_cart(
    session: &Session,
    cart: &Cart,
) -> std::result::Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CART, cart).await
}

// =============================================================================
// Forms
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
    #[serde(default = "one")]
    pub quantity: u32,
}

const fn one() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: ProductId,
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: ProductId,
}

// =============================================================================
// Templates
// =============================================================================

#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub page: PageContext,
    pub cart: Cart,
    pub totals: CartTotals,
}

/// Cart count badge fragment.
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the cart with totals from the store's shipping policy.
#[instrument(skip(state, session, page))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    page: PageContext,
) -> impl IntoResponse {
    let cart = load_cart(&session).await;
    let totals = state.settings().await.shipping_policy().totals(&cart);

    CartShowTemplate { page, cart, totals }
}

/// Add a product, clamped to its stock.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Lang(locale): Lang,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let product = ProductRepository::new(state.backend())
        .get(Auth::Anon, form.product_id)
        .await?
        .filter(|p| p.is_listed());

    let Some(product) = product else {
        return Ok(Redirect::to("/products?error=not_found").into_response());
    };

    if !product.in_stock() {
        let to = format!("/products/{}?error=out_of_stock", product.id);
        return Ok(Redirect::to(&to).into_response());
    }

    let mut cart = load_cart(&session).await;
    let quantity = cart.add(
        CartLine {
            product_id: product.id,
            name: product.name(locale).to_string(),
            unit_price: product.price(),
            quantity: form.quantity,
            image_url: product.image_url.clone(),
        },
        Some(product.available()),
    );
    save_cart(&session, &cart).await?;

    let product_id = product.id.to_string();
    let quantity = quantity.to_string();
    add_breadcrumb(
        "cart",
        "Added to cart",
        Some(&[("product_id", product_id.as_str()), ("quantity", quantity.as_str())]),
    );

    Ok(Redirect::to("/cart?notice=added_to_cart").into_response())
}

/// Change a line's quantity. Zero removes it.
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<UpdateCartForm>,
) -> Result<Redirect> {
    let available = if form.quantity == 0 {
        None
    } else {
        Some(
            ProductRepository::new(state.backend())
                .get(Auth::Anon, form.product_id)
                .await?
                .filter(|p| p.is_listed())
                .map_or(0, |p| p.available()),
        )
    };

    let mut cart = load_cart(&session).await;
    cart.set_quantity(form.product_id, form.quantity, available);
    save_cart(&session, &cart).await?;

    if available == Some(0) {
        return Ok(Redirect::to("/cart?error=out_of_stock"));
    }
    Ok(Redirect::to("/cart"))
}

#[instrument(skip(session))]
pub async fn remove(session: Session, Form(form): Form<RemoveFromCartForm>) -> Result<Redirect> {
    let mut cart = load_cart(&session).await;
    if cart.remove(form.product_id) {
        save_cart(&session, &cart).await?;
    }
    Ok(Redirect::to("/cart"))
}

#[instrument(skip(session))]
pub async fn clear(session: Session) -> Result<Redirect> {
    save_cart(&session, &Cart::new()).await?;
    Ok(Redirect::to("/cart"))
}

/// Cart count badge fragment.
pub async fn count(session: Session) -> impl IntoResponse {
    CartCountTemplate {
        count: load_cart(&session).await.item_count(),
    }
}
