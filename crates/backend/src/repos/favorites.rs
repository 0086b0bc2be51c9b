//! A customer's saved products.

use aurelia_core::{ProductId, UserId};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::client::{Auth, BackendClient};
use crate::error::BackendError;
use crate::query::Query;

const TABLE: &str = "favorites";

#[derive(Serialize)]
struct NewFavorite {
    user_id: UserId,
    product_id: ProductId,
}

#[derive(Deserialize)]
struct FavoriteRow {
    product_id: ProductId,
}

/// Repository for favorites.
pub struct FavoriteRepository<'a> {
    client: &'a BackendClient,
}

impl<'a> FavoriteRepository<'a> {
    #[must_use]
    pub const fn new(client: &'a BackendClient) -> Self {
        Self { client }
    }

    /// Saved product IDs, most recent first.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    pub async fn list_product_ids(
        &self,
        auth: Auth<'_>,
        user_id: UserId,
    ) -> Result<Vec<ProductId>, BackendError> {
        let query = Query::table(TABLE)
            .select("product_id")
            .eq("user_id", user_id)
            .order("created_at", false);
        let rows: Vec<FavoriteRow> = self.client.select(auth, &query).await?;
        Ok(rows.into_iter().map(|row| row.product_id).collect())
    }

    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    pub async fn contains(
        &self,
        auth: Auth<'_>,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<bool, BackendError> {
        let query = Query::table(TABLE)
            .select("product_id")
            .eq("user_id", user_id)
            .eq("product_id", product_id);
        let row: Option<FavoriteRow> = self.client.select_one(auth, &query).await?;
        Ok(row.is_some())
    }

    /// Save a product. Saving twice is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    #[instrument(skip(self))]
    pub async fn add(
        &self,
        auth: Auth<'_>,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), BackendError> {
        let row = NewFavorite {
            user_id,
            product_id,
        };
        match self
            .client
            .insert::<_, serde_json::Value>(auth, TABLE, &row)
            .await
        {
            Ok(_) | Err(BackendError::Conflict(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    #[instrument(skip(self))]
    pub async fn remove(
        &self,
        auth: Auth<'_>,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), BackendError> {
        let query = Query::table(TABLE)
            .eq("user_id", user_id)
            .eq("product_id", product_id);
        self.client.delete(auth, &query).await
    }
}
