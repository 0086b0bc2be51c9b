//! JSON API.

use aurelia_core::MarketPrices;
use axum::{Json, extract::State};
use serde::Serialize;
use tracing::instrument;

use crate::state::AppState;

/// Envelope of `/api/market-prices`.
#[derive(Debug, Serialize)]
pub struct MarketPricesResponse {
    pub success: bool,
    pub data: MarketPrices,
}

/// Gold and dollar quotes in pesos.
///
/// Always succeeds: when every provider fails the fallback quotes are
/// served.
#[instrument(skip(state))]
pub async fn market_prices(State(state): State<AppState>) -> Json<MarketPricesResponse> {
    Json(MarketPricesResponse {
        success: true,
        data: state.market().prices().await,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use aurelia_core::MarketQuote;
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn test_response_shape() {
        let t = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let response = MarketPricesResponse {
            success: true,
            data: MarketPrices {
                gold: MarketQuote::flat(34_000.0, t),
                usd: MarketQuote::flat(17.0, t),
            },
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["gold"]["value"], 34_000.0);
        assert_eq!(json["data"]["usd"]["changePercent"], 0.0);
        assert!(json["data"]["gold"]["lastUpdate"].is_string());
    }
}
