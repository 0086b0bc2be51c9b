//! Session-related types for admin authentication.

use aurelia_backend::{AccessToken, AuthSession};
use aurelia_core::{Profile, UserId, UserRole};
use serde::{Deserialize, Serialize};

/// Session-stored admin identity.
///
/// The role is cached at sign-in. Data calls use the service role, so the
/// user's own token is kept only to sign out at the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentAdmin {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub access_token: AccessToken,
}

impl CurrentAdmin {
    #[must_use]
    pub fn new(session: AuthSession, profile: &Profile) -> Self {
        let email = if profile.email.is_empty() {
            session.user.email.clone().unwrap_or_default()
        } else {
            profile.email.clone()
        };
        Self {
            id: session.user.id,
            name: profile.display_name().to_string(),
            email,
            role: profile.role,
            access_token: session.access_token,
        }
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Session keys for admin authentication data.
pub mod keys {
    /// Key for storing the current signed-in admin.
    pub const CURRENT_ADMIN: &str = "current_admin";
}
