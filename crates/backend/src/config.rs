//! Backend connection settings and the environment helpers shared by the
//! binaries.
//!
//! # Environment Variables
//!
//! - `BACKEND_URL` - Project base URL (required)
//! - `BACKEND_ANON_KEY` - Public API key (required)
//! - `BACKEND_SERVICE_ROLE_KEY` - Privileged key (admin and CLI only)

use std::collections::HashMap;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_SESSION_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Where the backend lives and which keys to present.
#[derive(Clone)]
pub struct BackendConfig {
    /// Project base URL, e.g. `https://abc.backend.example`.
    pub url: String,
    /// Public key, safe to expose; subject to row-level security.
    pub anon_key: SecretString,
    /// Privileged key that bypasses row-level security. Admin and CLI only.
    pub service_role_key: Option<SecretString>,
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("url", &self.url)
            .field("anon_key", &"[REDACTED]")
            .field(
                "service_role_key",
                &self.service_role_key.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl BackendConfig {
    /// Load from the environment. The service key is optional.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the URL or anon key is missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let url = env::required("BACKEND_URL")?;
        url::Url::parse(&url)
            .map_err(|e| ConfigError::InvalidEnvVar("BACKEND_URL".to_string(), e.to_string()))?;

        Ok(Self {
            url,
            anon_key: SecretString::from(env::required("BACKEND_ANON_KEY")?),
            service_role_key: env::optional("BACKEND_SERVICE_ROLE_KEY").map(SecretString::from),
        })
    }

    /// Load from the environment, requiring the service key.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if any variable is missing or the service key
    /// looks like a placeholder.
    pub fn from_env_with_service_role() -> Result<Self, ConfigError> {
        let mut config = Self::from_env()?;
        config.service_role_key = Some(env::validated_secret("BACKEND_SERVICE_ROLE_KEY")?);
        Ok(config)
    }
}

/// Environment variable helpers.
pub mod env {
    use super::{
        ConfigError, ExposeSecret, HashMap, MIN_ENTROPY_BITS_PER_CHAR, MIN_SESSION_SECRET_LENGTH,
        PLACEHOLDER_PATTERNS, SecretString,
    };

    /// Get a required environment variable.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` when unset.
    pub fn required(key: &str) -> Result<String, ConfigError> {
        std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get an optional environment variable. Empty values count as unset.
    #[must_use]
    pub fn optional(key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.trim().is_empty())
    }

    /// Get an environment variable with a default value.
    #[must_use]
    pub fn or_default(key: &str, default: &str) -> String {
        optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Parse an environment variable, falling back to `default` when unset.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` when set but unparsable.
    pub fn parsed<T>(key: &str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        optional(key).map_or(Ok(default), |value| {
            value
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
    }

    /// Database URL with fallback to the generic `DATABASE_URL`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` naming `primary_key` when neither
    /// is set.
    pub fn database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
        optional(primary_key)
            .or_else(|| optional("DATABASE_URL"))
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar(primary_key.to_string()))
    }

    /// Load a secret and reject placeholders and low-entropy values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when missing or weak.
    pub fn validated_secret(key: &str) -> Result<SecretString, ConfigError> {
        let value = required(key)?;
        validate_secret_strength(&value, key)?;
        Ok(SecretString::from(value))
    }

    /// Load a session signing secret: a validated secret of minimum length.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when missing, short or weak.
    pub fn session_secret(key: &str) -> Result<SecretString, ConfigError> {
        let secret = validated_secret(key)?;
        validate_session_secret(&secret, key)?;
        Ok(secret)
    }

    pub(super) fn validate_session_secret(
        secret: &SecretString,
        var_name: &str,
    ) -> Result<(), ConfigError> {
        let length = secret.expose_secret().chars().count();
        if length < MIN_SESSION_SECRET_LENGTH {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("must be at least {MIN_SESSION_SECRET_LENGTH} characters (got {length})"),
            ));
        }
        Ok(())
    }

    /// Shannon entropy in bits per character.
    pub(super) fn shannon_entropy(s: &str) -> f64 {
        let mut freq: HashMap<char, usize> = HashMap::new();
        for c in s.chars() {
            *freq.entry(c).or_insert(0) += 1;
        }
        let total: usize = freq.values().sum();
        if total == 0 {
            return 0.0;
        }

        #[allow(clippy::cast_precision_loss)]
        let len = total as f64;
        freq.values()
            .map(|&count| {
                #[allow(clippy::cast_precision_loss)]
                let p = count as f64 / len;
                -p * p.log2()
            })
            .sum()
    }

    pub(super) fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
        let lower = secret.to_lowercase();
        if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }

        let entropy = shannon_entropy(secret);
        if entropy < MIN_ENTROPY_BITS_PER_CHAR {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!(
                    "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
                ),
            ));
        }
        Ok(())
    }
}
