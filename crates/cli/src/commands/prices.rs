//! Print the market quotes the storefront would show.

use aurelia_backend::ConfigError;
use aurelia_storefront::config::MarketConfig;
use aurelia_storefront::services::MarketService;
use aurelia_storefront::services::market::MarketError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PricesError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Market service: {0}")]
    Market(#[from] MarketError),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Fetch current quotes and write them to stdout as pretty JSON.
///
/// Provider failures fall back to the built-in quotes, as on the storefront.
///
/// # Errors
///
/// Returns an error if the market configuration is invalid.
#[allow(clippy::print_stdout)]
pub async fn print() -> Result<(), PricesError> {
    let service = MarketService::from_config(&MarketConfig::from_env()?)?;
    let prices = service.prices().await;
    println!("{}", serde_json::to_string_pretty(&prices)?);
    Ok(())
}
