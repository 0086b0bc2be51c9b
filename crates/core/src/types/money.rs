//! Type-safe money representation using decimal arithmetic.

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// ISO 4217 currency codes the store deals in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    #[default]
    MXN,
    USD,
}

impl Currency {
    /// Currency code as shown after the amount.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::MXN => "MXN",
            Self::USD => "USD",
        }
    }
}

/// An amount of money in a currency.
///
/// Amounts are kept as `Decimal` in the currency's standard unit (pesos, not
/// centavos) and rounded half-away-from-zero to two places for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    pub amount: Decimal,
    #[serde(default)]
    pub currency: Currency,
}

impl Money {
    /// Create an amount in an explicit currency.
    #[must_use]
    pub const fn new(amount: Decimal, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Create an amount in Mexican pesos.
    #[must_use]
    pub const fn mxn(amount: Decimal) -> Self {
        Self::new(amount, Currency::MXN)
    }

    /// Zero pesos.
    #[must_use]
    pub const fn zero() -> Self {
        Self::mxn(Decimal::ZERO)
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Multiply a unit price by a quantity.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self::new(self.amount * Decimal::from(quantity), self.currency)
    }

    /// Add two amounts of the same currency.
    ///
    /// Returns `None` if the currencies differ or the sum overflows.
    #[must_use]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        if self.currency != other.currency {
            return None;
        }
        self.amount
            .checked_add(other.amount)
            .map(|amount| Self::new(amount, self.currency))
    }

    /// Format for display, e.g. `$12,500.00 MXN`.
    #[must_use]
    pub fn display(&self) -> String {
        let rounded = self
            .amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let negative = rounded.is_sign_negative() && !rounded.is_zero();
        let text = format!("{:.2}", rounded.abs());
        let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, ch) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        let sign = if negative { "-" } else { "" };
        format!("{sign}${grouped}.{fraction} {}", self.currency.code())
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap_or_default()
    }

    #[test]
    fn test_display_groups_thousands() {
        assert_eq!(Money::mxn(dec("12500")).display(), "$12,500.00 MXN");
        assert_eq!(Money::mxn(dec("1234567.5")).display(), "$1,234,567.50 MXN");
        assert_eq!(Money::mxn(dec("999")).display(), "$999.00 MXN");
    }

    #[test]
    fn test_display_rounds_half_away_from_zero() {
        assert_eq!(Money::mxn(dec("10.005")).display(), "$10.01 MXN");
        assert_eq!(Money::mxn(dec("10.004")).display(), "$10.00 MXN");
    }

    #[test]
    fn test_display_negative() {
        assert_eq!(Money::mxn(dec("-1500")).display(), "-$1,500.00 MXN");
    }

    #[test]
    fn test_display_usd() {
        let usd = Money::new(dec("17.25"), Currency::USD);
        assert_eq!(usd.to_string(), "$17.25 USD");
    }

    #[test]
    fn test_times() {
        assert_eq!(Money::mxn(dec("450.50")).times(3), Money::mxn(dec("1351.50")));
        assert!(Money::mxn(dec("450.50")).times(0).is_zero());
    }

    #[test]
    fn test_checked_add_rejects_mixed_currency() {
        let mxn = Money::mxn(dec("1"));
        let usd = Money::new(dec("1"), Currency::USD);
        assert_eq!(mxn.checked_add(usd), None);
        assert_eq!(mxn.checked_add(mxn), Some(Money::mxn(dec("2"))));
    }
}
