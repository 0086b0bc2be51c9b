//! CLI command implementations.

pub mod admin;
pub mod migrate;
pub mod prices;
pub mod seed;

use aurelia_backend::{BackendClient, BackendConfig, BackendError, ConfigError};

/// Errors building a service-role backend client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("backend: {0}")]
    Backend(#[from] BackendError),
}

/// Backend client with the service-role key, read from the environment.
///
/// # Errors
///
/// Returns an error if any backend variable is missing or invalid.
pub fn service_client() -> Result<BackendClient, ClientError> {
    let config = BackendConfig::from_env_with_service_role()?;
    Ok(BackendClient::new(&config)?)
}
