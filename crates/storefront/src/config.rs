//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` for sessions (falls back to `DATABASE_URL`)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//! - `STOREFRONT_SESSION_SECRET` - Session signing secret (min 32 chars, high entropy)
//! - `BACKEND_URL` - Hosted backend base URL
//! - `BACKEND_ANON_KEY` - Hosted backend public key
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `BACKEND_SERVICE_ROLE_KEY` - Not needed by the storefront
//! - `GOLD_API_KEY` - Metals provider key; without it gold uses the fallback price
//! - `GOLD_API_URL` - Metals provider base (default: `https://www.goldapi.io/api`)
//! - `FX_API_URL` - Exchange-rate provider base (default: `https://open.er-api.com/v6`)
//! - `MARKET_CACHE_SECONDS` - Market price cache TTL (default: 300)
//! - `LOG_FORMAT` - `json` for structured logs
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use aurelia_backend::BackendConfig;
use aurelia_backend::config::{ConfigError, env};
use secrecy::SecretString;

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` connection URL for the session store
    pub database_url: SecretString,
    pub host: IpAddr,
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    pub session_secret: SecretString,
    pub backend: BackendConfig,
    pub market: MarketConfig,
    pub log_json: bool,
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
}

/// Market price provider configuration.
#[derive(Clone)]
pub struct MarketConfig {
    pub gold_api_key: Option<SecretString>,
    pub gold_api_url: String,
    pub fx_api_url: String,
    pub cache_ttl: Duration,
}

impl std::fmt::Debug for MarketConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketConfig")
            .field("gold_api_key", &self.gold_api_key.as_ref().map(|_| "[REDACTED]"))
            .field("gold_api_url", &self.gold_api_url)
            .field("fx_api_url", &self.fx_api_url)
            .field("cache_ttl", &self.cache_ttl)
            .finish()
    }
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            gold_api_key: None,
            gold_api_url: "https://www.goldapi.io/api".to_string(),
            fx_api_url: "https://open.er-api.com/v6".to_string(),
            cache_ttl: Duration::from_secs(300),
        }
    }
}

impl MarketConfig {
    /// # Errors
    ///
    /// Returns `ConfigError` if `MARKET_CACHE_SECONDS` is not a number.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            gold_api_key: env::optional("GOLD_API_KEY").map(SecretString::from),
            gold_api_url: env::or_default("GOLD_API_URL", &defaults.gold_api_url),
            fx_api_url: env::or_default("FX_API_URL", &defaults.fx_api_url),
            cache_ttl: Duration::from_secs(env::parsed("MARKET_CACHE_SECONDS", 300_u64)?),
        })
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the session secret fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            database_url: env::database_url("STOREFRONT_DATABASE_URL")?,
            host: env::parsed("STOREFRONT_HOST", IpAddr::from([127, 0, 0, 1]))?,
            port: env::parsed("STOREFRONT_PORT", 3000)?,
            base_url: env::required("STOREFRONT_BASE_URL")?,
            session_secret: env::session_secret("STOREFRONT_SESSION_SECRET")?,
            backend: BackendConfig::from_env()?,
            market: MarketConfig::from_env()?,
            log_json: env::optional("LOG_FORMAT").is_some_and(|f| f.eq_ignore_ascii_case("json")),
            sentry_dsn: env::optional("SENTRY_DSN"),
            sentry_environment: env::optional("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should be marked `Secure`.
    #[must_use]
    pub fn is_https(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

#[cfg(test)]
impl StorefrontConfig {
    /// Offline configuration for router and handler tests.
    pub(crate) fn for_tests() -> Self {
        Self {
            database_url: SecretString::from("postgres://localhost/aurelia_test"),
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            base_url: "https://aurelia.test".to_string(),
            session_secret: SecretString::from("x".repeat(32)),
            backend: BackendConfig {
                url: "https://project.backend.test".to_string(),
                anon_key: SecretString::from("anon"),
                service_role_key: None,
            },
            market: MarketConfig::default(),
            log_json: false,
            sentry_dsn: None,
            sentry_environment: None,
        }
    }
}
