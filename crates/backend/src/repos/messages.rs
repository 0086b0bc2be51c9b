//! Contact form messages.

use aurelia_core::{ContactMessage, MessageId, NewContactMessage};
use tracing::{info, instrument};

use crate::client::{Auth, BackendClient};
use crate::error::BackendError;
use crate::query::Query;

const TABLE: &str = "contact_messages";

/// Repository for contact messages.
pub struct MessageRepository<'a> {
    client: &'a BackendClient,
}

impl<'a> MessageRepository<'a> {
    #[must_use]
    pub const fn new(client: &'a BackendClient) -> Self {
        Self { client }
    }

    /// Store a message from the contact form.
    ///
    /// Visitors may insert but not read messages, so nothing is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the insert.
    #[instrument(skip(self, message))]
    pub async fn create(
        &self,
        auth: Auth<'_>,
        message: &NewContactMessage,
    ) -> Result<(), BackendError> {
        let url = self.client.endpoint(&format!("rest/v1/{TABLE}"));
        let request = self
            .client
            .request(reqwest::Method::POST, &url, auth)?
            .header("Prefer", "return=minimal")
            .json(message);
        self.client.send(request).await?;
        info!("contact message stored");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    pub async fn list(
        &self,
        auth: Auth<'_>,
        unread_only: bool,
    ) -> Result<Vec<ContactMessage>, BackendError> {
        let mut query = Query::table(TABLE);
        if unread_only {
            query = query.eq("read", false);
        }
        self.client
            .select(auth, &query.order("created_at", false).limit(200))
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    pub async fn mark_read(&self, auth: Auth<'_>, id: MessageId) -> Result<(), BackendError> {
        self.client
            .update::<_, serde_json::Value>(
                auth,
                &Query::table(TABLE).eq("id", id),
                &serde_json::json!({ "read": true }),
            )
            .await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the backend rejects the delete.
    #[instrument(skip(self))]
    pub async fn delete(&self, auth: Auth<'_>, id: MessageId) -> Result<(), BackendError> {
        self.client
            .delete(auth, &Query::table(TABLE).eq("id", id))
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    pub async fn count_unread(&self, auth: Auth<'_>) -> Result<u64, BackendError> {
        self.client
            .count(auth, &Query::table(TABLE).eq("read", false))
            .await
    }
}
