//! Aurelia Joyería admin library.
//!
//! The back office as a library, so handlers and middleware can be unit
//! tested and the binary stays small.
//!
//! # Security
//!
//! This crate holds the backend service-role key, which bypasses row-level
//! security. Every page except login requires a profile with the `admin`
//! role; data calls are made as the service role only after that check.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod page;
pub mod routes;
pub mod state;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    middleware::{from_fn, from_fn_with_state},
    routing::get,
};
use tower_http::{
    services::ServeDir,
    trace::{DefaultOnResponse, OnResponse, TraceLayer},
};
use tracing::Span;

use state::AppState;

/// Liveness health check. Does not touch dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness check: the session database and the backend must answer.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    if !db::is_ready(state.pool()).await {
        return StatusCode::SERVICE_UNAVAILABLE;
    }

    match state.backend().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "backend health check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// Build the full application router.
pub fn app(state: AppState, static_dir: &str) -> Router {
    let session_layer = middleware::create_session_layer(state.pool(), state.config());

    Router::new()
        .merge(routes::routes())
        .layer(session_layer)
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::security_headers_middleware,
        ))
        .layer(from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, header};
    use sqlx::postgres::PgPoolOptions;
    use tower::util::ServiceExt;

    use super::*;
    use crate::config::AdminConfig;

    /// Router over an unconnected pool. Requests that never load a session
    /// do not touch the database.
    fn offline_app() -> Router {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/aurelia_test")
            .unwrap();
        app(AppState::new(AdminConfig::for_tests(), pool).unwrap(), "static")
    }

    #[tokio::test]
    async fn test_health() {
        let response = offline_app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        assert_eq!(response.headers()["x-robots-tag"], "noindex, nofollow");
    }

    #[tokio::test]
    async fn test_dashboard_without_cookie_redirects_to_login() {
        let response = offline_app()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/auth/login");
    }

    #[tokio::test]
    async fn test_login_page_renders() {
        let response = offline_app()
            .oneshot(
                Request::get("/auth/login?error=forbidden")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains("No tienes permiso para esta acción."));
    }

    #[tokio::test]
    async fn test_static_assets_get_security_headers() {
        let response = offline_app()
            .oneshot(Request::get("/static/js/admin.js").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-content-type-options"], "nosniff");
        assert_eq!(response.headers()["x-robots-tag"], "noindex, nofollow");
    }

    #[tokio::test]
    async fn test_state_requires_service_key() {
        let mut config = AdminConfig::for_tests();
        config.backend.service_role_key = None;
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/aurelia_test")
            .unwrap();
        assert!(AppState::new(config, pool).is_err());
    }
}
