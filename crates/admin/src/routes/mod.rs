//! HTTP route handlers for the admin panel.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Dashboard
//!
//! # Auth
//! GET  /auth/login                - Login page
//! POST /auth/login                - Login action (admins only)
//! POST /auth/logout               - Logout action
//!
//! # Products
//! GET  /products                  - Product table (?q=&category=&page=)
//! POST /products                  - Create product
//! GET  /products/new              - Empty editor
//! GET  /products/{id}             - Editor
//! POST /products/{id}             - Save product
//! POST /products/{id}/image       - Replace image (multipart)
//! POST /products/{id}/delete      - Delete product and its image
//!
//! # Orders
//! GET  /orders                    - Order table (?status=&page=)
//! GET  /orders/{id}               - Order detail
//! POST /orders/{id}/status        - Change status
//!
//! # Blog
//! GET  /blog                      - Posts, drafts included
//! POST /blog                      - Create post
//! GET  /blog/new                  - Empty editor
//! GET  /blog/{id}                 - Editor
//! POST /blog/{id}                 - Save post
//! POST /blog/{id}/publish         - Toggle publication
//! POST /blog/{id}/delete          - Delete post
//!
//! # Users
//! GET  /users                     - Accounts (?q=)
//! POST /users/{id}/role           - Change role
//!
//! # Messages
//! GET  /messages                  - Contact inbox (?unread=1)
//! POST /messages/{id}/read        - Mark read
//! POST /messages/{id}/delete      - Delete
//!
//! # Settings
//! GET  /settings                  - Store settings
//! POST /settings                  - Save settings
//! ```

pub mod auth;
pub mod blog;
pub mod dashboard;
pub mod messages;
pub mod orders;
pub mod products;
pub mod settings;
pub mod users;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use crate::middleware::login_rate_limiter;
use crate::state::AppState;

/// Request body limit for image uploads: the image plus multipart overhead.
const UPLOAD_BODY_LIMIT: usize = products::MAX_IMAGE_BYTES + 1024 * 1024;

/// Auth routes. Login submissions are rate limited per client IP.
pub fn auth_routes() -> Router<AppState> {
    let limited = Router::new()
        .route("/login", post(auth::login))
        .layer(login_rate_limiter());

    Router::new()
        .route("/login", get(auth::login_page))
        .route("/logout", post(auth::logout))
        .merge(limited)
}

pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route("/new", get(products::new_page))
        .route("/{id}", get(products::edit).post(products::update))
        .route(
            "/{id}/image",
            post(products::upload_image).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/{id}/delete", post(products::delete))
}

pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/{id}", get(orders::show))
        .route("/{id}/status", post(orders::update_status))
}

pub fn blog_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(blog::index).post(blog::create))
        .route("/new", get(blog::new_page))
        .route("/{id}", get(blog::edit).post(blog::update))
        .route("/{id}/publish", post(blog::toggle_published))
        .route("/{id}/delete", post(blog::delete))
}

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(users::index))
        .route("/{id}/role", post(users::set_role))
}

pub fn message_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(messages::index))
        .route("/{id}/read", post(messages::mark_read))
        .route("/{id}/delete", post(messages::delete))
}

/// Create all routes for the admin panel.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::dashboard))
        .nest("/auth", auth_routes())
        .nest("/products", product_routes())
        .nest("/orders", order_routes())
        .nest("/blog", blog_routes())
        .nest("/users", user_routes())
        .nest("/messages", message_routes())
        .route("/settings", get(settings::show).post(settings::update))
}
