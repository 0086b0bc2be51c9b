//! Shopping cart and total arithmetic.
//!
//! The cart is a plain value kept in the visitor's session. Prices on the
//! lines are only for display; checkout re-prices every line from the
//! backend before an order is written.

use serde::{Deserialize, Serialize};

use crate::types::{Money, ProductId};

/// Maximum units of one product per cart line.
pub const MAX_LINE_QUANTITY: u32 = 99;

/// One product in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Money,
    pub quantity: u32,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl CartLine {
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.unit_price.times(self.quantity)
    }
}

/// A visitor's cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub lines: Vec<CartLine>,
}

/// Clamp a requested quantity to `1..=MAX_LINE_QUANTITY` and, when known, to
/// the available stock.
fn clamp_quantity(quantity: u32, available: Option<u32>) -> u32 {
    let capped = quantity.clamp(1, MAX_LINE_QUANTITY);
    available.map_or(capped, |stock| capped.min(stock))
}

impl Cart {
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    #[must_use]
    pub fn subtotal(&self) -> Money {
        self.lines
            .iter()
            .map(CartLine::line_total)
            .fold(Money::zero(), |acc, total| {
                acc.checked_add(total).unwrap_or(acc)
            })
    }

    #[must_use]
    pub fn line(&self, product_id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product_id == product_id)
    }

    /// Add a line, merging with an existing line for the same product.
    ///
    /// The merged quantity is clamped to `MAX_LINE_QUANTITY` and to
    /// `available` stock. Nothing is added when `available` is zero.
    /// Returns the resulting quantity of that product.
    pub fn add(&mut self, line: CartLine, available: Option<u32>) -> u32 {
        if available == Some(0) {
            self.remove(line.product_id);
            return 0;
        }

        if let Some(existing) = self
            .lines
            .iter_mut()
            .find(|existing| existing.product_id == line.product_id)
        {
            let wanted = existing.quantity.saturating_add(line.quantity);
            existing.quantity = clamp_quantity(wanted, available);
            existing.unit_price = line.unit_price;
            existing.name = line.name;
            existing.image_url = line.image_url;
            return existing.quantity;
        }

        let quantity = clamp_quantity(line.quantity, available);
        self.lines.push(CartLine { quantity, ..line });
        quantity
    }

    /// Set the quantity of a product. Zero removes the line.
    ///
    /// Returns `false` when the product is not in the cart.
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: u32, available: Option<u32>) -> bool {
        if quantity == 0 || available == Some(0) {
            return self.remove(product_id);
        }

        match self
            .lines
            .iter_mut()
            .find(|line| line.product_id == product_id)
        {
            Some(line) => {
                line.quantity = clamp_quantity(quantity, available);
                true
            }
            None => false,
        }
    }

    /// Remove a product. Returns whether a line was removed.
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.product_id != product_id);
        self.lines.len() != before
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

/// How shipping is charged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShippingPolicy {
    /// Charged on every non-empty order below the threshold.
    pub flat_rate: Money,
    /// Subtotal at or above which shipping is free.
    pub free_threshold: Money,
}

/// Computed cart totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartTotals {
    pub subtotal: Money,
    pub shipping: Money,
    pub total: Money,
}

impl ShippingPolicy {
    /// Shipping charge for a given subtotal.
    #[must_use]
    pub fn shipping_for(&self, subtotal: Money) -> Money {
        if subtotal.is_zero() || subtotal.amount >= self.free_threshold.amount {
            Money::zero()
        } else {
            self.flat_rate
        }
    }

    #[must_use]
    pub fn totals(&self, cart: &Cart) -> CartTotals {
        let subtotal = cart.subtotal();
        let shipping = self.shipping_for(subtotal);
        CartTotals {
            subtotal,
            shipping,
            total: subtotal.checked_add(shipping).unwrap_or(subtotal),
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn pesos(amount: i64) -> Money {
        Money::mxn(Decimal::from(amount))
    }

    fn line(id: ProductId, price: i64, quantity: u32) -> CartLine {
        CartLine {
            product_id: id,
            name: "Collar Aurora".to_string(),
            unit_price: pesos(price),
            quantity,
            image_url: None,
        }
    }

    fn policy() -> ShippingPolicy {
        ShippingPolicy {
            flat_rate: pesos(150),
            free_threshold: pesos(2000),
        }
    }

    #[test]
    fn test_add_merges_same_product() {
        let id = ProductId::random();
        let mut cart = Cart::new();
        cart.add(line(id, 500, 1), None);
        let quantity = cart.add(line(id, 500, 2), None);

        assert_eq!(quantity, 3);
        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_add_clamps_to_stock_and_maximum() {
        let id = ProductId::random();
        let mut cart = Cart::new();
        assert_eq!(cart.add(line(id, 500, 10), Some(4)), 4);
        assert_eq!(cart.add(line(id, 500, 10), Some(4)), 4);

        let other = ProductId::random();
        assert_eq!(cart.add(line(other, 100, 500), None), MAX_LINE_QUANTITY);
    }

    #[test]
    fn test_add_out_of_stock_adds_nothing() {
        let id = ProductId::random();
        let mut cart = Cart::new();
        assert_eq!(cart.add(line(id, 500, 1), Some(0)), 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_zero_quantity_becomes_one() {
        let mut cart = Cart::new();
        assert_eq!(cart.add(line(ProductId::random(), 500, 0), None), 1);
    }

    #[test]
    fn test_set_quantity_zero_removes() {
        let id = ProductId::random();
        let mut cart = Cart::new();
        cart.add(line(id, 500, 2), None);

        assert!(cart.set_quantity(id, 0, None));
        assert!(cart.is_empty());
        assert!(!cart.set_quantity(id, 1, None));
    }

    #[test]
    fn test_subtotal_sums_lines() {
        let mut cart = Cart::new();
        cart.add(line(ProductId::random(), 1250, 2), None);
        cart.add(line(ProductId::random(), 399, 1), None);
        assert_eq!(cart.subtotal(), pesos(2899));
    }

    #[test]
    fn test_totals_charge_flat_rate_below_threshold() {
        let mut cart = Cart::new();
        cart.add(line(ProductId::random(), 999, 1), None);
        let totals = policy().totals(&cart);

        assert_eq!(totals.subtotal, pesos(999));
        assert_eq!(totals.shipping, pesos(150));
        assert_eq!(totals.total, pesos(1149));
    }

    #[test]
    fn test_totals_free_shipping_at_threshold() {
        let mut cart = Cart::new();
        cart.add(line(ProductId::random(), 1000, 2), None);
        let totals = policy().totals(&cart);

        assert!(totals.shipping.is_zero());
        assert_eq!(totals.total, pesos(2000));
    }

    #[test]
    fn test_empty_cart_has_no_shipping() {
        let totals = policy().totals(&Cart::new());
        assert!(totals.total.is_zero());
    }
}
