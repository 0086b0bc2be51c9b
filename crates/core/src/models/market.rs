//! Market price payloads served by `/api/market-prices`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One price series: current value and change against the previous reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketQuote {
    pub value: f64,
    pub change: f64,
    pub change_percent: f64,
    pub last_update: DateTime<Utc>,
}

impl MarketQuote {
    /// A quote with no change information.
    #[must_use]
    pub const fn flat(value: f64, last_update: DateTime<Utc>) -> Self {
        Self {
            value,
            change: 0.0,
            change_percent: 0.0,
            last_update,
        }
    }

    /// A quote whose change is computed against a previous value.
    #[must_use]
    pub fn relative_to(value: f64, previous: f64, last_update: DateTime<Utc>) -> Self {
        let change = value - previous;
        let change_percent = if previous.abs() > f64::EPSILON {
            change / previous * 100.0
        } else {
            0.0
        };
        Self {
            value,
            change,
            change_percent,
            last_update,
        }
    }
}

/// Gold (MXN per troy ounce) and US dollar (MXN per USD) quotes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketPrices {
    pub gold: MarketQuote,
    pub usd: MarketQuote,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_camel_case() {
        let quote = MarketQuote::flat(17.0, DateTime::UNIX_EPOCH);
        let json = serde_json::to_value(quote).unwrap();
        assert!(json.get("changePercent").is_some());
        assert!(json.get("lastUpdate").is_some());
        assert!(json.get("change_percent").is_none());
    }

    #[test]
    fn test_relative_change() {
        let quote = MarketQuote::relative_to(18.0, 17.0, DateTime::UNIX_EPOCH);
        assert!((quote.change - 1.0).abs() < 1e-9);
        assert!((quote.change_percent - 5.882_352_941).abs() < 1e-6);
    }

    #[test]
    fn test_relative_to_zero_previous() {
        let quote = MarketQuote::relative_to(18.0, 0.0, DateTime::UNIX_EPOCH);
        assert!(quote.change_percent.abs() < f64::EPSILON);
    }
}
