//! Checkout route handlers.
//!
//! Checkout requires a signed-in customer. Every cart line is re-read from
//! the backend before the order is written; the session's prices are only
//! ever used for display.

use std::collections::HashMap;

use askama::Template;
use askama_web::WebTemplate;
use aurelia_backend::Auth;
use aurelia_backend::repos::{OrderRepository, ProductRepository, ProfileRepository};
use aurelia_core::validation::{CheckoutForm, ValidationErrors, normalize_phone};
use aurelia_core::{
    Cart, CartLine, CartTotals, Locale, NewOrder, NewOrderItem, Order, OrderId, OrderStatus,
    Product,
};
use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::{info, instrument, warn};

use super::cart::{load_cart, save_cart};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::CurrentUser;
use crate::page::PageContext;
use crate::state::AppState;

#[derive(Template, WebTemplate)]
#[template(path = "checkout/form.html")]
pub struct CheckoutTemplate {
    pub page: PageContext,
    pub form: CheckoutForm,
    pub errors: ValidationErrors,
    pub cart: Cart,
    pub totals: CartTotals,
}

#[derive(Template, WebTemplate)]
#[template(path = "checkout/confirmation.html")]
pub struct ConfirmationTemplate {
    pub page: PageContext,
    pub order: Order,
}

/// A cart after checking it against current catalog data.
#[derive(Debug, PartialEq, Eq)]
pub struct Repriced {
    pub cart: Cart,
    /// Lines were dropped, clamped or re-priced.
    pub changed: bool,
}

/// Re-price a cart from fresh product rows.
///
/// Lines for missing, unlisted or sold-out products are dropped, quantities
/// above stock are lowered and prices are taken from the product.
#[must_use]
pub fn reprice(cart: &Cart, products: &[Product], locale: Locale) -> Repriced {
    let by_id: HashMap<_, _> = products.iter().map(|p| (p.id, p)).collect();
    let mut fresh = Cart::new();
    let mut changed = false;

    for line in &cart.lines {
        let Some(product) = by_id.get(&line.product_id).filter(|p| p.is_listed()) else {
            changed = true;
            continue;
        };

        let available = product.available();
        if available == 0 {
            changed = true;
            continue;
        }

        let quantity = line.quantity.min(available);
        let unit_price = product.price();
        changed |= quantity != line.quantity || unit_price != line.unit_price;

        fresh.lines.push(CartLine {
            product_id: product.id,
            name: product.name(locale).to_string(),
            unit_price,
            quantity,
            image_url: product.image_url.clone(),
        });
    }

    Repriced {
        cart: fresh,
        changed,
    }
}

/// Order insert payloads for a re-priced cart.
fn order_payload(
    form: &CheckoutForm,
    user: &CurrentUser,
    cart: &Cart,
    totals: &CartTotals,
) -> (NewOrder, Vec<NewOrderItem>) {
    let order = NewOrder {
        user_id: Some(user.id),
        status: OrderStatus::Pendiente,
        subtotal: totals.subtotal.amount,
        shipping: totals.shipping.amount,
        total: totals.total.amount,
        shipping_name: form.name.trim().to_string(),
        shipping_email: form.email.trim().to_lowercase(),
        shipping_phone: normalize_phone(&form.phone),
        shipping_address: form.address.trim().to_string(),
        shipping_city: form.city.trim().to_string(),
        shipping_state: form.state.trim().to_string(),
        shipping_postal_code: form.postal_code.trim().to_string(),
        notes: form.trimmed_notes(),
    };

    let items = cart
        .lines
        .iter()
        .map(|line| NewOrderItem {
            product_id: line.product_id,
            product_name: line.name.clone(),
            unit_price: line.unit_price.amount,
            quantity: i32::try_from(line.quantity).unwrap_or(i32::MAX),
        })
        .collect();

    (order, items)
}

/// Display the checkout form, prefilled from the customer's profile.
#[instrument(skip(state, session, page, user))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    page: PageContext,
) -> Result<Response> {
    let cart = load_cart(&session).await;
    if cart.is_empty() {
        return Ok(Redirect::to("/cart?error=cart_empty").into_response());
    }

    let profile = ProfileRepository::new(state.backend())
        .get(Auth::User(&user.access_token), user.id)
        .await
        .unwrap_or_else(|e| {
            warn!(error = %e, "could not load profile for checkout prefill");
            None
        });

    let form = CheckoutForm {
        name: profile
            .as_ref()
            .and_then(|p| p.full_name.clone())
            .or_else(|| user.full_name.clone())
            .unwrap_or_default(),
        email: user.email.clone(),
        phone: profile.and_then(|p| p.phone).unwrap_or_default(),
        ..CheckoutForm::default()
    };

    let totals = state.settings().await.shipping_policy().totals(&cart);
    Ok(CheckoutTemplate {
        page,
        form,
        errors: ValidationErrors::new(),
        cart,
        totals,
    }
    .into_response())
}

/// Validate, re-price and place the order.
#[instrument(skip(state, session, page, user, form), fields(user_id = %user.id))]
pub async fn place_order(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    page: PageContext,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    let cart = load_cart(&session).await;
    if cart.is_empty() {
        return Ok(Redirect::to("/cart?error=cart_empty").into_response());
    }

    let policy = state.settings().await.shipping_policy();

    if let Err(errors) = form.validate() {
        let code = errors
            .first()
            .and_then(|(_, key)| key.strip_prefix("error."))
            .unwrap_or("generic");
        let totals = policy.totals(&cart);
        let page = page.with_error(code);
        return Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            CheckoutTemplate {
                page,
                form,
                errors,
                cart,
                totals,
            },
        )
            .into_response());
    }

    let ids: Vec<_> = cart.lines.iter().map(|line| line.product_id).collect();
    let products = ProductRepository::new(state.backend())
        .get_many(Auth::Anon, &ids)
        .await?;

    let Repriced {
        cart: priced,
        changed,
    } = reprice(&cart, &products, page.locale);

    if changed {
        save_cart(&session, &priced).await?;
        info!(
            before = cart.lines.len(),
            after = priced.lines.len(),
            "cart changed at checkout"
        );
        let to = if priced.is_empty() {
            "/cart?error=out_of_stock"
        } else {
            "/cart?error=cart_changed"
        };
        return Ok(Redirect::to(to).into_response());
    }

    let totals = policy.totals(&priced);
    let (order, items) = order_payload(&form, &user, &priced, &totals);

    let created = OrderRepository::new(state.backend())
        .create_with_items(Auth::User(&user.access_token), &order, &items)
        .await?;

    save_cart(&session, &Cart::new()).await?;

    let order_id = created.id.to_string();
    add_breadcrumb("checkout", "Order placed", Some(&[("order_id", order_id.as_str())]));

    Ok(Redirect::to(&format!("/checkout/confirmation/{}", created.id)).into_response())
}

/// Thank-you page for a just-placed order.
#[instrument(skip(state, page, user))]
pub async fn confirmation(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    page: PageContext,
    Path(id): Path<OrderId>,
) -> Result<impl IntoResponse> {
    let order = OrderRepository::new(state.backend())
        .get_for_user(Auth::User(&user.access_token), user.id, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    Ok(ConfirmationTemplate { page, order })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use aurelia_core::{Category, Money, ProductId};
    use chrono::Utc;
    use rust_decimal::Decimal;

    use super::*;

    fn product(price: i64, stock: i32) -> Product {
        Product {
            id: ProductId::random(),
            name_es: "Anillo Luna".to_string(),
            name_en: "Moon Ring".to_string(),
            description_es: String::new(),
            description_en: String::new(),
            price: Decimal::from(price),
            category: Category::Anillos,
            material: Some("Plata .925".to_string()),
            stock,
            image_url: None,
            featured: false,
            active: true,
            created_at: Utc::now(),
        }
    }

    fn line_for(product: &Product, price: i64, quantity: u32) -> CartLine {
        CartLine {
            product_id: product.id,
            name: product.name_es.clone(),
            unit_price: Money::mxn(Decimal::from(price)),
            quantity,
            image_url: None,
        }
    }

    #[test]
    fn test_reprice_unchanged_cart() {
        let p = product(1200, 5);
        let cart = Cart {
            lines: vec![line_for(&p, 1200, 2)],
        };
        let result = reprice(&cart, &[p], Locale::Es);
        assert!(!result.changed);
        assert_eq!(result.cart, cart);
    }

    #[test]
    fn test_reprice_uses_backend_price() {
        let p = product(1500, 5);
        let cart = Cart {
            lines: vec![line_for(&p, 1, 1)],
        };
        let result = reprice(&cart, &[p], Locale::Es);
        assert!(result.changed);
        assert_eq!(result.cart.subtotal(), Money::mxn(Decimal::from(1500)));
    }

    #[test]
    fn test_reprice_drops_missing_and_inactive_products() {
        let mut inactive = product(500, 3);
        inactive.active = false;
        let missing = product(700, 3);
        let kept = product(900, 3);
        let cart = Cart {
            lines: vec![
                line_for(&inactive, 500, 1),
                line_for(&missing, 700, 1),
                line_for(&kept, 900, 1),
            ],
        };

        let result = reprice(&cart, &[inactive, kept.clone()], Locale::Es);
        assert!(result.changed);
        assert_eq!(result.cart.lines.len(), 1);
        assert_eq!(result.cart.lines[0].product_id, kept.id);
    }

    #[test]
    fn test_reprice_clamps_to_stock_and_drops_sold_out() {
        let low = product(300, 2);
        let sold_out = product(300, 0);
        let cart = Cart {
            lines: vec![line_for(&low, 300, 5), line_for(&sold_out, 300, 1)],
        };

        let result = reprice(&cart, &[low, sold_out], Locale::Es);
        assert!(result.changed);
        assert_eq!(result.cart.item_count(), 2);
    }

    #[test]
    fn test_reprice_localizes_names() {
        let p = product(100, 1);
        let cart = Cart {
            lines: vec![line_for(&p, 100, 1)],
        };
        let result = reprice(&cart, &[p], Locale::En);
        assert_eq!(result.cart.lines[0].name, "Moon Ring");
    }
}
