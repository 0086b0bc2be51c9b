//! Aurelia Joyería storefront library.
//!
//! The public bilingual store as a library, so routes and middleware can be
//! unit tested and the binary stays small.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod markdown;
pub mod middleware;
pub mod models;
pub mod page;
pub mod routes;
pub mod services;
pub mod state;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    middleware::{from_fn, from_fn_with_state},
    routing::get,
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use state::AppState;

/// Liveness health check. Does not touch dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness check: the session database must answer. The backend is
/// probed but only logged, since catalog pages degrade on their own.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    if let Err(e) = state.backend().ping().await {
        tracing::warn!(error = %e, "backend health check failed");
    }

    if db::is_ready(state.pool()).await {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// Build the full application router.
pub fn app(state: AppState, static_dir: &str) -> Router {
    let session_layer = middleware::create_session_layer(state.pool(), state.config());

    Router::new()
        .merge(routes::routes())
        .layer(session_layer)
        .layer(from_fn_with_state(
            state.clone(),
            middleware::security_headers_middleware,
        ))
        .layer(from_fn(middleware::csp_nonce_middleware))
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use aurelia_backend::BackendClient;
    use axum::body::Body;
    use axum::http::{Request, header};
    use sqlx::postgres::PgPoolOptions;
    use tower::util::ServiceExt;

    use super::*;
    use crate::config::StorefrontConfig;
    use crate::services::MarketService;
    use crate::services::market::{FALLBACK_GOLD_MXN_PER_OZ, FALLBACK_USD_MXN, QuoteChain};

    /// Router over an unconnected pool and providerless market chains.
    fn offline_app() -> Router {
        let config = StorefrontConfig::for_tests();
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/aurelia_test")
            .unwrap();
        let backend = BackendClient::new(&config.backend).unwrap();
        let market = MarketService::new(
            QuoteChain::new("gold", Vec::new(), FALLBACK_GOLD_MXN_PER_OZ),
            QuoteChain::new("usd", Vec::new(), FALLBACK_USD_MXN),
            Duration::from_secs(60),
        );
        app(AppState::from_parts(config, pool, backend, market), "static")
    }

    #[tokio::test]
    async fn test_health() {
        let response = offline_app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_market_prices_falls_back() {
        let response = offline_app()
            .oneshot(
                Request::get("/api/market-prices")
                    .header("x-forwarded-for", "203.0.113.5")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-frame-options"], "DENY");
        assert!(
            response.headers()["content-security-policy"]
                .to_str()
                .unwrap()
                .contains("https://project.backend.test")
        );

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["gold"]["value"], FALLBACK_GOLD_MXN_PER_OZ);
        assert_eq!(json["data"]["usd"]["value"], FALLBACK_USD_MXN);
        assert_eq!(json["data"]["usd"]["change"], 0.0);
    }

    async fn guest_location(uri: &str) -> String {
        let response = offline_app()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
        response.headers()[header::LOCATION]
            .to_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn test_guest_is_sent_to_login_with_return_path() {
        assert_eq!(
            guest_location("/account").await,
            "/auth/login?error=login_required&next=%2Faccount"
        );
        assert_eq!(
            guest_location("/checkout").await,
            "/auth/login?error=login_required&next=%2Fcheckout"
        );
        assert_eq!(
            guest_location("/favorites").await,
            "/auth/login?error=login_required&next=%2Ffavorites"
        );
    }

    #[tokio::test]
    async fn test_nested_guard_keeps_full_path_and_query() {
        assert_eq!(
            guest_location("/account/orders?page=2").await,
            "/auth/login?error=login_required&next=%2Faccount%2Forders%3Fpage%3D2"
        );
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let response = offline_app()
            .oneshot(Request::get("/no-such-page").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
