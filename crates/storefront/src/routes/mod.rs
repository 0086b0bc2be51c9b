//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                              - Home page
//! GET  /lang/{locale}                 - Switch language, go back
//!
//! # Catalog
//! GET  /products                      - Listing (?category=&q=&sort=&page=)
//! GET  /products/{id}                 - Product detail
//!
//! # Cart (session)
//! GET  /cart                          - Cart page
//! POST /cart/add                      - Add product
//! POST /cart/update                   - Set quantity (0 removes)
//! POST /cart/remove                   - Remove product
//! POST /cart/clear                    - Empty the cart
//! GET  /cart/count                    - Cart count badge (fragment)
//!
//! # Checkout (requires auth)
//! GET  /checkout                      - Shipping form
//! POST /checkout                      - Place order
//! GET  /checkout/confirmation/{id}    - Thank-you page
//!
//! # Auth
//! GET  /auth/login                    - Login page
//! POST /auth/login                    - Login action (rate limited)
//! GET  /auth/register                 - Register page
//! POST /auth/register                 - Register action (rate limited)
//! GET  /auth/forgot-password          - Recovery page
//! POST /auth/forgot-password          - Send recovery email (rate limited)
//! POST /auth/logout                   - Logout action
//!
//! # Account (requires auth)
//! GET  /account                       - Profile and recent orders
//! POST /account                       - Update profile
//! GET  /account/orders                - Order history
//! GET  /account/orders/{id}           - Order detail
//! GET  /favorites                     - Saved products
//! POST /favorites/{product_id}        - Toggle saved product
//!
//! # Content
//! GET  /blog                          - Published posts
//! GET  /blog/{slug}                   - Post
//! GET  /contact                       - Contact form
//! POST /contact                       - Send message
//!
//! # API
//! GET  /api/market-prices             - Gold and USD quotes (rate limited)
//! ```

pub mod account;
pub mod api;
pub mod auth;
pub mod blog;
pub mod cart;
pub mod checkout;
pub mod contact;
pub mod favorites;
pub mod home;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::{api_rate_limiter, auth_rate_limiter};
use crate::state::AppState;

/// Auth routes. Form submissions are rate limited per client IP.
pub fn auth_routes() -> Router<AppState> {
    let limited = Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .route("/forgot-password", post(auth::forgot_password))
        .layer(auth_rate_limiter());

    Router::new()
        .route("/login", get(auth::login_page))
        .route("/register", get(auth::register_page))
        .route("/forgot-password", get(auth::forgot_password_page))
        .route("/logout", post(auth::logout))
        .merge(limited)
}

pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
}

pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show).post(checkout::place_order))
        .route("/confirmation/{id}", get(checkout::confirmation))
}

pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::index).post(account::update))
        .route("/orders", get(account::orders))
        .route("/orders/{id}", get(account::order))
}

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/market-prices", get(api::market_prices))
        .layer(api_rate_limiter())
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/lang/{locale}", get(home::set_language))
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .nest("/checkout", checkout_routes())
        .nest("/auth", auth_routes())
        .nest("/account", account_routes())
        .route("/favorites", get(favorites::index))
        .route("/favorites/{product_id}", post(favorites::toggle))
        .route("/blog", get(blog::index))
        .route("/blog/{slug}", get(blog::show))
        .route("/contact", get(contact::show).post(contact::submit))
        .nest("/api", api_routes())
}
