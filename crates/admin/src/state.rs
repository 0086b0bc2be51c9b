//! Application state shared across handlers.

use std::sync::Arc;

use aurelia_backend::{BackendClient, BackendError};
use sqlx::PgPool;

use crate::config::AdminConfig;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: PgPool,
    backend: BackendClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend client cannot be built or has no
    /// service-role key.
    pub fn new(config: AdminConfig, pool: PgPool) -> Result<Self, BackendError> {
        let backend = BackendClient::new(&config.backend)?;
        if !backend.has_service_key() {
            return Err(BackendError::Config(
                "admin requires BACKEND_SERVICE_ROLE_KEY".to_string(),
            ));
        }

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                backend,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Session store pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Backend client. Data calls from the admin use `Auth::Service`.
    #[must_use]
    pub fn backend(&self) -> &BackendClient {
        &self.inner.backend
    }
}
