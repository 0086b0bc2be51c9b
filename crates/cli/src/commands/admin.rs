//! Administrator role management.
//!
//! Accounts are created by signing up on the storefront; these commands only
//! flip the role on an existing profile.

use aurelia_backend::repos::ProfileRepository;
use aurelia_backend::{Auth, BackendError};
use aurelia_core::{Email, UserRole};
use thiserror::Error;

use super::{ClientError, service_client};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error("No account with email {0}; sign up on the storefront first")]
    NotFound(String),
}

/// Give the account with `email` the admin role.
///
/// # Errors
///
/// Returns an error if the email is invalid, unknown, or the update fails.
pub async fn promote(email: &str) -> Result<(), AdminError> {
    set_role(email, UserRole::Admin).await
}

/// Return the account with `email` to the customer role.
///
/// # Errors
///
/// Returns an error if the email is invalid, unknown, or the update fails.
pub async fn demote(email: &str) -> Result<(), AdminError> {
    set_role(email, UserRole::Customer).await
}

async fn set_role(email: &str, role: UserRole) -> Result<(), AdminError> {
    let email = Email::parse(email).map_err(|_| AdminError::InvalidEmail(email.to_owned()))?;
    let client = service_client()?;
    let profiles = ProfileRepository::new(&client);

    let profile = profiles
        .get_by_email(Auth::Service, email.as_str())
        .await?
        .ok_or_else(|| AdminError::NotFound(email.to_string()))?;

    if profile.role == role {
        tracing::info!(email = %email, role = %role, "Role unchanged");
        return Ok(());
    }

    profiles.set_role(Auth::Service, profile.id, role).await?;
    tracing::info!(email = %email, user_id = %profile.id, role = %role, "Role updated");
    Ok(())
}
