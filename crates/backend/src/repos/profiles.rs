//! Customer and staff profiles.

use aurelia_core::{Profile, ProfileUpdate, UserId, UserRole};
use tracing::{info, instrument};

use crate::client::{Auth, BackendClient};
use crate::error::BackendError;
use crate::query::Query;

const TABLE: &str = "profiles";

/// Repository for profiles.
pub struct ProfileRepository<'a> {
    client: &'a BackendClient,
}

impl<'a> ProfileRepository<'a> {
    #[must_use]
    pub const fn new(client: &'a BackendClient) -> Self {
        Self { client }
    }

    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    pub async fn get(&self, auth: Auth<'_>, id: UserId) -> Result<Option<Profile>, BackendError> {
        self.client
            .select_one(auth, &Query::table(TABLE).eq("id", id))
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    pub async fn get_by_email(
        &self,
        auth: Auth<'_>,
        email: &str,
    ) -> Result<Option<Profile>, BackendError> {
        self.client
            .select_one(auth, &Query::table(TABLE).eq("email", email.trim().to_lowercase()))
            .await
    }

    /// All profiles, newest first, optionally filtered by email or name.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    pub async fn list(
        &self,
        auth: Auth<'_>,
        search: Option<&str>,
    ) -> Result<Vec<Profile>, BackendError> {
        let mut query = Query::table(TABLE);
        if let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) {
            query = query.ilike_any(&["email", "full_name"], term);
        }
        self.client
            .select(auth, &query.order("created_at", false).limit(500))
            .await
    }

    /// Update the editable fields of a profile.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::NotFound`] when no row was updated.
    #[instrument(skip(self, update))]
    pub async fn update(
        &self,
        auth: Auth<'_>,
        id: UserId,
        update: &ProfileUpdate,
    ) -> Result<Profile, BackendError> {
        self.client
            .update::<_, Profile>(auth, &Query::table(TABLE).eq("id", id), update)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| BackendError::NotFound(format!("profile {id}")))
    }

    /// # Errors
    ///
    /// Returns [`BackendError::NotFound`] when no row was updated.
    #[instrument(skip(self))]
    pub async fn set_role(
        &self,
        auth: Auth<'_>,
        id: UserId,
        role: UserRole,
    ) -> Result<Profile, BackendError> {
        let profile = self
            .client
            .update::<_, Profile>(
                auth,
                &Query::table(TABLE).eq("id", id),
                &serde_json::json!({ "role": role }),
            )
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| BackendError::NotFound(format!("profile {id}")))?;
        info!(user_id = %id, role = %role, "role changed");
        Ok(profile)
    }

    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    pub async fn count(&self, auth: Auth<'_>) -> Result<u64, BackendError> {
        self.client.count(auth, &Query::table(TABLE)).await
    }
}
