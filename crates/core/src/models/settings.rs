//! Store-wide settings edited from the admin panel.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::ShippingPolicy;
use crate::types::{Locale, Money};

/// Default flat shipping rate in pesos.
pub const DEFAULT_SHIPPING_FLAT_RATE: Decimal = Decimal::from_parts(150, 0, 0, false, 0);

/// Default order subtotal above which shipping is free.
pub const DEFAULT_FREE_SHIPPING_THRESHOLD: Decimal = Decimal::from_parts(2000, 0, 0, false, 0);

/// The single row of the `store_settings` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    pub store_name: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub shipping_flat_rate: Decimal,
    pub free_shipping_threshold: Decimal,
    pub announcement_es: String,
    pub announcement_en: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            store_name: "Aurelia Joyería".to_string(),
            contact_email: String::new(),
            contact_phone: String::new(),
            shipping_flat_rate: DEFAULT_SHIPPING_FLAT_RATE,
            free_shipping_threshold: DEFAULT_FREE_SHIPPING_THRESHOLD,
            announcement_es: String::new(),
            announcement_en: String::new(),
        }
    }
}

impl StoreSettings {
    #[must_use]
    pub const fn shipping_policy(&self) -> ShippingPolicy {
        ShippingPolicy {
            flat_rate: Money::mxn(self.shipping_flat_rate),
            free_threshold: Money::mxn(self.free_shipping_threshold),
        }
    }

    /// Announcement banner text, `None` when empty for the locale.
    #[must_use]
    pub fn announcement(&self, locale: Locale) -> Option<&str> {
        let text = match locale {
            Locale::Es => self.announcement_es.trim(),
            Locale::En if self.announcement_en.trim().is_empty() => self.announcement_es.trim(),
            Locale::En => self.announcement_en.trim(),
        };
        (!text.is_empty()).then_some(text)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns_take_defaults() {
        let settings: StoreSettings =
            serde_json::from_value(serde_json::json!({ "store_name": "Aurelia" })).unwrap();
        assert_eq!(settings.store_name, "Aurelia");
        assert_eq!(settings.shipping_flat_rate, DEFAULT_SHIPPING_FLAT_RATE);
        assert_eq!(settings.free_shipping_threshold.to_string(), "2000");
    }

    #[test]
    fn test_announcement_falls_back_to_spanish() {
        let settings = StoreSettings {
            announcement_es: "Envío gratis en diciembre".to_string(),
            ..StoreSettings::default()
        };
        assert_eq!(settings.announcement(Locale::En), Some("Envío gratis en diciembre"));
        assert_eq!(StoreSettings::default().announcement(Locale::Es), None);
    }
}
