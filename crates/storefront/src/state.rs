//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use aurelia_backend::repos::SettingsRepository;
use aurelia_backend::{Auth, BackendClient, BackendError};
use aurelia_core::models::StoreSettings;
use moka::future::Cache;
use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::services::MarketService;
use crate::services::market::MarketError;

/// Error building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("backend client: {0}")]
    Backend(#[from] BackendError),
    #[error("market service: {0}")]
    Market(#[from] MarketError),
}

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    backend: BackendClient,
    market: MarketService,
    settings: Cache<(), StoreSettings>,
}

/// How long store settings are reused before re-reading the backend.
const SETTINGS_TTL: Duration = Duration::from_secs(60);

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend or market clients cannot be built.
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Result<Self, StateError> {
        let backend = BackendClient::new(&config.backend)?;
        let market = MarketService::from_config(&config.market)?;
        Ok(Self::from_parts(config, pool, backend, market))
    }

    #[must_use]
    pub fn from_parts(
        config: StorefrontConfig,
        pool: PgPool,
        backend: BackendClient,
        market: MarketService,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                backend,
                market,
                settings: Cache::builder()
                    .max_capacity(1)
                    .time_to_live(SETTINGS_TTL)
                    .build(),
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Session store pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    #[must_use]
    pub fn backend(&self) -> &BackendClient {
        &self.inner.backend
    }

    #[must_use]
    pub fn market(&self) -> &MarketService {
        &self.inner.market
    }

    /// Store settings, cached briefly. Falls back to defaults when the
    /// backend cannot be read; failures are not cached.
    pub async fn settings(&self) -> StoreSettings {
        let backend = self.inner.backend.clone();
        self.inner
            .settings
            .try_get_with((), async move {
                SettingsRepository::new(&backend).get(Auth::Anon).await
            })
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "failed to load store settings, using defaults");
                StoreSettings::default()
            })
    }
}
