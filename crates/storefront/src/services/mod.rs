//! Services used by the storefront handlers.

pub mod market;

pub use market::MarketService;
