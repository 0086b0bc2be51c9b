//! Session-related types.
//!
//! Everything the storefront keeps per visitor lives in the server-side
//! session: the signed-in user, the cart and the chosen language.

use aurelia_backend::{AccessToken, AuthSession};
use aurelia_core::{Profile, UserId, UserRole};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Session-stored identity of a signed-in customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub email: String,
    pub full_name: Option<String>,
    /// Role resolved at sign-in.
    pub role: UserRole,
    pub access_token: AccessToken,
    pub refresh_token: AccessToken,
    pub expires_at: DateTime<Utc>,
}

impl CurrentUser {
    #[must_use]
    pub fn new(session: AuthSession, profile: &Profile) -> Self {
        let email = if profile.email.is_empty() {
            session.user.email.clone().unwrap_or_default()
        } else {
            profile.email.clone()
        };
        Self {
            id: session.user.id,
            email,
            full_name: profile.full_name.clone(),
            role: profile.role,
            access_token: session.access_token,
            refresh_token: session.refresh_token,
            expires_at: session.expires_at,
        }
    }

    /// Name shown in the header.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.email)
    }

    /// Whether the access token is expired or about to expire.
    #[must_use]
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - now < chrono::TimeDelta::seconds(60)
    }

    /// Swap in refreshed tokens.
    pub fn refreshed(&mut self, session: AuthSession) {
        self.access_token = session.access_token;
        self.refresh_token = session.refresh_token;
        self.expires_at = session.expires_at;
    }
}

/// Session keys.
pub mod keys {
    /// The signed-in customer.
    pub const CURRENT_USER: &str = "current_user";

    /// The visitor's cart.
    pub const CART: &str = "cart";

    /// The visitor's chosen language.
    pub const LOCALE: &str = "locale";
}
