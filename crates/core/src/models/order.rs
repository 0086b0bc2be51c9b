//! Order records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Money, OrderId, OrderStatus, ProductId, UserId};

/// An order row, optionally with its embedded `order_items`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub status: OrderStatus,
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
    pub shipping_name: String,
    pub shipping_email: String,
    #[serde(default)]
    pub shipping_phone: String,
    #[serde(default)]
    pub shipping_address: String,
    #[serde(default)]
    pub shipping_city: String,
    #[serde(default)]
    pub shipping_state: String,
    #[serde(default)]
    pub shipping_postal_code: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, rename = "order_items", skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<OrderItem>,
}

impl Order {
    #[must_use]
    pub fn total(&self) -> Money {
        Money::mxn(self.total)
    }

    /// Short human reference shown to customers (first UUID group).
    #[must_use]
    pub fn reference(&self) -> String {
        let id = self.id.to_string();
        id.split('-').next().unwrap_or(&id).to_uppercase()
    }
}

/// A line of an order. Name and price are copied at purchase time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub order_id: OrderId,
    #[serde(default)]
    pub product_id: Option<ProductId>,
    pub product_name: String,
    pub unit_price: Decimal,
    pub quantity: i32,
}

impl OrderItem {
    #[must_use]
    pub fn line_total(&self) -> Money {
        Money::mxn(self.unit_price).times(u32::try_from(self.quantity).unwrap_or(0))
    }
}

/// Insert payload for an order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewOrder {
    pub user_id: Option<UserId>,
    pub status: OrderStatus,
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
    pub shipping_name: String,
    pub shipping_email: String,
    pub shipping_phone: String,
    pub shipping_address: String,
    pub shipping_city: String,
    pub shipping_state: String,
    pub shipping_postal_code: String,
    pub notes: Option<String>,
}

/// Insert payload for an order line. The order ID is attached when the
/// order row exists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub unit_price: Decimal,
    pub quantity: i32,
}
