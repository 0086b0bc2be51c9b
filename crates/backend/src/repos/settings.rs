//! Store-wide settings, kept in a single row.

use aurelia_core::StoreSettings;
use serde::Serialize;
use tracing::{info, instrument};

use crate::client::{Auth, BackendClient};
use crate::error::BackendError;
use crate::query::Query;

const TABLE: &str = "store_settings";
const ROW_ID: i32 = 1;

#[derive(Serialize)]
struct SettingsRow<'a> {
    id: i32,
    #[serde(flatten)]
    settings: &'a StoreSettings,
}

/// Repository for store settings.
pub struct SettingsRepository<'a> {
    client: &'a BackendClient,
}

impl<'a> SettingsRepository<'a> {
    #[must_use]
    pub const fn new(client: &'a BackendClient) -> Self {
        Self { client }
    }

    /// Current settings, or the defaults when the row does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    pub async fn get(&self, auth: Auth<'_>) -> Result<StoreSettings, BackendError> {
        let row: Option<StoreSettings> = self
            .client
            .select_one(auth, &Query::table(TABLE).eq("id", ROW_ID))
            .await?;
        Ok(row.unwrap_or_default())
    }

    /// # Errors
    ///
    /// Returns an error if the backend rejects the write.
    #[instrument(skip(self, settings))]
    pub async fn upsert(
        &self,
        auth: Auth<'_>,
        settings: &StoreSettings,
    ) -> Result<StoreSettings, BackendError> {
        let row = SettingsRow {
            id: ROW_ID,
            settings,
        };
        let stored = self
            .client
            .upsert::<_, StoreSettings>(auth, TABLE, "id", &row)
            .await?
            .into_iter()
            .next()
            .unwrap_or_else(|| settings.clone());
        info!("store settings saved");
        Ok(stored)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_row_carries_fixed_id() {
        let settings = StoreSettings::default();
        let json = serde_json::to_value(SettingsRow {
            id: ROW_ID,
            settings: &settings,
        })
        .unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["store_name"], settings.store_name);
    }
}
