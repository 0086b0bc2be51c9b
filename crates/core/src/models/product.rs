//! Product records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Category, Locale, Money, ProductId};

const fn default_true() -> bool {
    true
}

/// A catalog product as stored in the `products` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name_es: String,
    #[serde(default)]
    pub name_en: String,
    #[serde(default)]
    pub description_es: String,
    #[serde(default)]
    pub description_en: String,
    pub price: Decimal,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default)]
    pub stock: i32,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default = "default_true")]
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Localized name, falling back to Spanish when no translation exists.
    #[must_use]
    pub fn name(&self, locale: Locale) -> &str {
        match locale {
            Locale::En if !self.name_en.trim().is_empty() => &self.name_en,
            _ => &self.name_es,
        }
    }

    /// Localized description, falling back to Spanish.
    #[must_use]
    pub fn description(&self, locale: Locale) -> &str {
        match locale {
            Locale::En if !self.description_en.trim().is_empty() => &self.description_en,
            _ => &self.description_es,
        }
    }

    #[must_use]
    pub fn price(&self) -> Money {
        Money::mxn(self.price)
    }

    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Units that may be sold, never negative.
    #[must_use]
    pub fn available(&self) -> u32 {
        u32::try_from(self.stock).unwrap_or(0)
    }

    /// Whether customers may see and buy the product.
    #[must_use]
    pub const fn is_listed(&self) -> bool {
        self.active
    }
}

/// Insert/update payload for a product.
///
/// Also the shape of product entries in seed files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductInput {
    pub name_es: String,
    #[serde(default)]
    pub name_en: String,
    #[serde(default)]
    pub description_es: String,
    #[serde(default)]
    pub description_en: String,
    pub price: Decimal,
    pub category: Category,
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default)]
    pub stock: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl From<&Product> for ProductInput {
    fn from(product: &Product) -> Self {
        Self {
            name_es: product.name_es.clone(),
            name_en: product.name_en.clone(),
            description_es: product.description_es.clone(),
            description_en: product.description_en.clone(),
            price: product.price,
            category: product.category,
            material: product.material.clone(),
            stock: product.stock,
            image_url: product.image_url.clone(),
            featured: product.featured,
            active: product.active,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample() -> Product {
        serde_json::from_value(serde_json::json!({
            "id": "5f0c6f0e-9d1b-4a55-9d3c-3f1c2a7b8e11",
            "name_es": "Anillo Sol",
            "name_en": "",
            "description_es": "Oro de 14k",
            "price": 4500.5,
            "category": "anillos",
            "stock": -2,
            "created_at": "2026-01-05T10:00:00Z"
        }))
        .unwrap()
    }

    #[test]
    fn test_deserializes_backend_row_with_defaults() {
        let product = sample();
        assert_eq!(product.category, Category::Anillos);
        assert!(product.active);
        assert!(!product.featured);
        assert_eq!(product.image_url, None);
        assert_eq!(product.price.to_string(), "4500.5");
    }

    #[test]
    fn test_name_falls_back_to_spanish() {
        let mut product = sample();
        assert_eq!(product.name(Locale::En), "Anillo Sol");
        product.name_en = "Sun Ring".to_string();
        assert_eq!(product.name(Locale::En), "Sun Ring");
        assert_eq!(product.name(Locale::Es), "Anillo Sol");
    }

    #[test]
    fn test_negative_stock_is_unavailable() {
        let product = sample();
        assert!(!product.in_stock());
        assert_eq!(product.available(), 0);
    }
}
