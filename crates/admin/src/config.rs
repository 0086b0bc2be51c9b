//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` for sessions (falls back to `DATABASE_URL`)
//! - `ADMIN_BASE_URL` - Public URL for the admin panel
//! - `ADMIN_SESSION_SECRET` - Session signing secret (min 32 chars, high entropy)
//! - `BACKEND_URL` - Hosted backend base URL
//! - `BACKEND_ANON_KEY` - Hosted backend public key
//! - `BACKEND_SERVICE_ROLE_KEY` - Service-role key (HIGH PRIVILEGE, bypasses row-level security)
//!
//! ## Optional
//! - `ADMIN_HOST` - Bind address (default: 127.0.0.1)
//! - `ADMIN_PORT` - Listen port (default: 3001)
//! - `STORAGE_BUCKET` - Public bucket for product images (default: product-images)
//! - `LOG_FORMAT` - `json` for structured logs
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};

use aurelia_backend::BackendConfig;
use aurelia_backend::config::{ConfigError, env};
use secrecy::SecretString;

const DEFAULT_STORAGE_BUCKET: &str = "product-images";

/// Admin application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// `PostgreSQL` connection URL for the session store
    pub database_url: SecretString,
    pub host: IpAddr,
    pub port: u16,
    /// Public base URL for the admin panel
    pub base_url: String,
    pub session_secret: SecretString,
    /// Backend settings; always carries the service-role key.
    pub backend: BackendConfig,
    pub storage_bucket: String,
    pub log_json: bool,
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid,
    /// if the session secret fails validation, or if no service-role key is
    /// configured.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            database_url: env::database_url("ADMIN_DATABASE_URL")?,
            host: env::parsed("ADMIN_HOST", IpAddr::from([127, 0, 0, 1]))?,
            port: env::parsed("ADMIN_PORT", 3001)?,
            base_url: env::required("ADMIN_BASE_URL")?,
            session_secret: env::session_secret("ADMIN_SESSION_SECRET")?,
            backend: BackendConfig::from_env_with_service_role()?,
            storage_bucket: env::or_default("STORAGE_BUCKET", DEFAULT_STORAGE_BUCKET),
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
impl AdminConfig {
    /// Offline configuration for router and handler tests.
    pub(crate) fn for_tests() -> Self {
        Self {
            database_url: SecretString::from("postgres://localhost/aurelia_admin_test"),
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3001,
            base_url: "http://localhost:3001".to_string(),
            session_secret: SecretString::from("y".repeat(32)),
            backend: BackendConfig {
                url: "https://project.backend.test".to_string(),
                anon_key: SecretString::from("anon"),
                service_role_key: Some(SecretString::from("service-role-key-value")),
            },
            storage_bucket: DEFAULT_STORAGE_BUCKET.to_string(),
            log_json: false,
            sentry_dsn: None,
            sentry_environment: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_addr_uses_admin_port() {
        assert_eq!(AdminConfig::for_tests().socket_addr().port(), 3001);
    }

    #[test]
    fn test_plain_http_is_not_secure() {
        assert!(!AdminConfig::for_tests().is_https());
    }

    #[test]
    fn test_debug_redacts_service_key() {
        let debug = format!("{:?}", AdminConfig::for_tests());
        assert!(debug.contains("product-images"));
        assert!(!debug.contains("service-role-key-value"));
    }
}
