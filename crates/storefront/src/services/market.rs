//! Gold and US dollar prices in Mexican pesos.
//!
//! Each series has a chain of providers tried in order, without retries.
//! The first plausible quote wins; when every provider fails the series
//! falls back to a fixed reference price so the endpoint always answers.
//! Results are cached with `moka` so providers are hit at most once per TTL.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use aurelia_core::{MarketPrices, MarketQuote};
use chrono::{DateTime, Utc};
use moka::future::Cache;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::config::MarketConfig;

/// Gold reference price, MXN per troy ounce.
pub const FALLBACK_GOLD_MXN_PER_OZ: f64 = 34_000.0;

/// US dollar reference rate, MXN per USD.
pub const FALLBACK_USD_MXN: f64 = 17.0;

const PROVIDER_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors from a single price provider.
#[derive(Debug, Error)]
pub enum MarketError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("unexpected response: {0}")]
    Parse(String),

    #[error("implausible value: {0}")]
    Implausible(f64),
}

/// A reading from a provider, before change figures are settled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProviderQuote {
    pub value: f64,
    /// Absolute and percent change, when the provider reports them.
    pub change: Option<(f64, f64)>,
    pub last_update: DateTime<Utc>,
}

pub type QuoteFuture<'a> = Pin<Box<dyn Future<Output = Result<ProviderQuote, MarketError>> + Send + 'a>>;

/// A source of one price series.
pub trait QuoteProvider: Send + Sync {
    fn name(&self) -> &'static str;

    fn fetch(&self) -> QuoteFuture<'_>;
}

/// An ordered list of providers for one series with its fallback value.
pub struct QuoteChain {
    series: &'static str,
    providers: Vec<Box<dyn QuoteProvider>>,
    fallback: f64,
    previous: Mutex<Option<f64>>,
}

impl QuoteChain {
    #[must_use]
    pub fn new(series: &'static str, providers: Vec<Box<dyn QuoteProvider>>, fallback: f64) -> Self {
        Self {
            series,
            providers,
            fallback,
            previous: Mutex::new(None),
        }
    }

    /// Try each provider in turn, then fall back.
    pub async fn quote(&self, now: DateTime<Utc>) -> MarketQuote {
        for provider in &self.providers {
            match provider.fetch().await {
                Ok(reading) if is_plausible(reading.value) => {
                    debug!(series = self.series, provider = provider.name(), value = reading.value, "quote fetched");
                    return self.settle(reading);
                }
                Ok(reading) => warn!(
                    series = self.series,
                    provider = provider.name(),
                    error = %MarketError::Implausible(reading.value),
                    "discarding quote"
                ),
                Err(e) => warn!(
                    series = self.series,
                    provider = provider.name(),
                    error = %e,
                    "price provider failed"
                ),
            }
        }

        warn!(series = self.series, value = self.fallback, "all providers failed, serving fallback price");
        MarketQuote::flat(self.fallback, now)
    }

    /// Fill in change figures, computing them against the last served value
    /// when the provider did not report any.
    fn settle(&self, reading: ProviderQuote) -> MarketQuote {
        let mut previous = self
            .previous
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        let quote = match (reading.change, *previous) {
            (Some((change, change_percent)), _) => MarketQuote {
                value: reading.value,
                change,
                change_percent,
                last_update: reading.last_update,
            },
            (None, Some(last)) => MarketQuote::relative_to(reading.value, last, reading.last_update),
            (None, None) => MarketQuote::flat(reading.value, reading.last_update),
        };

        *previous = Some(reading.value);
        quote
    }
}

fn is_plausible(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Cached market prices.
#[derive(Clone)]
pub struct MarketService {
    inner: Arc<MarketServiceInner>,
}

struct MarketServiceInner {
    gold: QuoteChain,
    usd: QuoteChain,
    cache: Cache<(), MarketPrices>,
}

impl MarketService {
    /// Build the service with the default providers.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &MarketConfig) -> Result<Self, MarketError> {
        let http = reqwest::Client::builder()
            .timeout(PROVIDER_TIMEOUT)
            .user_agent(concat!("aurelia-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let mut gold: Vec<Box<dyn QuoteProvider>> = Vec::new();
        match &config.gold_api_key {
            Some(key) => gold.push(Box::new(GoldApiProvider::new(
                http.clone(),
                &config.gold_api_url,
                key.clone(),
            ))),
            None => warn!("GOLD_API_KEY not set, gold price will use the fallback"),
        }
        let usd: Vec<Box<dyn QuoteProvider>> =
            vec![Box::new(ExchangeRateProvider::new(http, &config.fx_api_url))];

        Ok(Self::new(
            QuoteChain::new("gold", gold, FALLBACK_GOLD_MXN_PER_OZ),
            QuoteChain::new("usd", usd, FALLBACK_USD_MXN),
            config.cache_ttl,
        ))
    }

    #[must_use]
    pub fn new(gold: QuoteChain, usd: QuoteChain, ttl: Duration) -> Self {
        let cache = Cache::builder().max_capacity(1).time_to_live(ttl).build();
        Self {
            inner: Arc::new(MarketServiceInner { gold, usd, cache }),
        }
    }

    /// Current prices. Never fails; concurrent callers share one fetch.
    #[instrument(skip(self))]
    pub async fn prices(&self) -> MarketPrices {
        let inner = Arc::clone(&self.inner);
        self.inner
            .cache
            .get_with((), async move {
                let now = Utc::now();
                let (gold, usd) = tokio::join!(inner.gold.quote(now), inner.usd.quote(now));
                MarketPrices { gold, usd }
            })
            .await
    }
}

// =============================================================================
// Providers
// =============================================================================

/// Read a response body, failing on non-success statuses.
async fn read_body(response: reqwest::Response) -> Result<String, MarketError> {
    let status = response.status();
    let text = response.text().await?;
    if !status.is_success() {
        return Err(MarketError::Api {
            status: status.as_u16(),
            message: text.chars().take(200).collect(),
        });
    }
    Ok(text)
}

fn timestamp(seconds: Option<i64>) -> DateTime<Utc> {
    seconds
        .map(|s| if s > 10_000_000_000 { s / 1000 } else { s })
        .and_then(|s| DateTime::from_timestamp(s, 0))
        .unwrap_or_else(Utc::now)
}

/// GoldAPI-style metals endpoint: `GET {base}/XAU/MXN`.
pub struct GoldApiProvider {
    http: reqwest::Client,
    url: String,
    key: SecretString,
}

#[derive(Deserialize)]
struct GoldApiResponse {
    price: Option<f64>,
    ch: Option<f64>,
    chp: Option<f64>,
    timestamp: Option<i64>,
    error: Option<String>,
}

impl GoldApiProvider {
    #[must_use]
    pub fn new(http: reqwest::Client, base_url: &str, key: SecretString) -> Self {
        Self {
            http,
            url: format!("{}/XAU/MXN", base_url.trim_end_matches('/')),
            key,
        }
    }

    fn parse(text: &str) -> Result<ProviderQuote, MarketError> {
        let body: GoldApiResponse =
            serde_json::from_str(text).map_err(|e| MarketError::Parse(e.to_string()))?;
        if let Some(error) = body.error {
            return Err(MarketError::Parse(error));
        }
        let value = body
            .price
            .ok_or_else(|| MarketError::Parse("missing price".to_string()))?;
        Ok(ProviderQuote {
            value,
            change: body.ch.zip(body.chp),
            last_update: timestamp(body.timestamp),
        })
    }
}

impl QuoteProvider for GoldApiProvider {
    fn name(&self) -> &'static str {
        "goldapi"
    }

    fn fetch(&self) -> QuoteFuture<'_> {
        Box::pin(async move {
            let response = self
                .http
                .get(&self.url)
                .header("x-access-token", self.key.expose_secret())
                .send()
                .await?;
            Self::parse(&read_body(response).await?)
        })
    }
}

/// Open exchange-rate endpoint: `GET {base}/latest/USD`.
pub struct ExchangeRateProvider {
    http: reqwest::Client,
    url: String,
}

#[derive(Deserialize)]
struct ExchangeRateResponse {
    result: String,
    #[serde(default)]
    rates: std::collections::HashMap<String, f64>,
    time_last_update_unix: Option<i64>,
}

impl ExchangeRateProvider {
    #[must_use]
    pub fn new(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            url: format!("{}/latest/USD", base_url.trim_end_matches('/')),
        }
    }

    fn parse(text: &str) -> Result<ProviderQuote, MarketError> {
        let body: ExchangeRateResponse =
            serde_json::from_str(text).map_err(|e| MarketError::Parse(e.to_string()))?;
        if body.result != "success" {
            return Err(MarketError::Parse(format!("result was {}", body.result)));
        }
        let value = body
            .rates
            .get("MXN")
            .copied()
            .ok_or_else(|| MarketError::Parse("missing MXN rate".to_string()))?;
        Ok(ProviderQuote {
            value,
            change: None,
            last_update: timestamp(body.time_last_update_unix),
        })
    }
}

impl QuoteProvider for ExchangeRateProvider {
    fn name(&self) -> &'static str {
        "open-er-api"
    }

    fn fetch(&self) -> QuoteFuture<'_> {
        Box::pin(async move {
            let response = self.http.get(&self.url).send().await?;
            Self::parse(&read_body(response).await?)
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Replays a fixed list of results, then keeps failing.
    struct StubProvider {
        results: Mutex<Vec<Result<ProviderQuote, MarketError>>>,
        calls: Arc<AtomicUsize>,
    }

    impl StubProvider {
        fn boxed(
            results: Vec<Result<ProviderQuote, MarketError>>,
            calls: &Arc<AtomicUsize>,
        ) -> Box<dyn QuoteProvider> {
            Box::new(Self {
                results: Mutex::new(results.into_iter().rev().collect()),
                calls: Arc::clone(calls),
            })
        }
    }

    impl QuoteProvider for StubProvider {
        fn name(&self) -> &'static str {
            "stub"
        }

        fn fetch(&self) -> QuoteFuture<'_> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self
                .results
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(MarketError::Parse("exhausted".to_string())));
            Box::pin(async move { next })
        }
    }

    fn reading(value: f64) -> Result<ProviderQuote, MarketError> {
        Ok(ProviderQuote {
            value,
            change: None,
            last_update: DateTime::UNIX_EPOCH,
        })
    }

    fn failure() -> Result<ProviderQuote, MarketError> {
        Err(MarketError::Api {
            status: 503,
            message: "down".to_string(),
        })
    }

    #[tokio::test]
    async fn test_first_successful_provider_wins() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let chain = QuoteChain::new(
            "gold",
            vec![
                StubProvider::boxed(vec![reading(40_100.0)], &first),
                StubProvider::boxed(vec![reading(1.0)], &second),
            ],
            FALLBACK_GOLD_MXN_PER_OZ,
        );

        let quote = chain.quote(Utc::now()).await;
        assert!((quote.value - 40_100.0).abs() < f64::EPSILON);
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_provider_falls_through_to_next() {
        let calls = Arc::new(AtomicUsize::new(0));
        let chain = QuoteChain::new(
            "usd",
            vec![
                StubProvider::boxed(vec![failure()], &calls),
                StubProvider::boxed(vec![reading(f64::NAN)], &calls),
                StubProvider::boxed(vec![reading(18.25)], &calls),
            ],
            FALLBACK_USD_MXN,
        );

        let quote = chain.quote(Utc::now()).await;
        assert!((quote.value - 18.25).abs() < f64::EPSILON);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_all_failing_serves_fallback() {
        let calls = Arc::new(AtomicUsize::new(0));
        let now = Utc::now();
        let chain = QuoteChain::new(
            "usd",
            vec![StubProvider::boxed(vec![failure()], &calls)],
            FALLBACK_USD_MXN,
        );

        let quote = chain.quote(now).await;
        assert_eq!(quote, MarketQuote::flat(17.0, now));
    }

    #[tokio::test]
    async fn test_empty_chain_serves_fallback() {
        let chain = QuoteChain::new("gold", Vec::new(), FALLBACK_GOLD_MXN_PER_OZ);
        let quote = chain.quote(Utc::now()).await;
        assert!((quote.value - 34_000.0).abs() < f64::EPSILON);
        assert!(quote.change.abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_change_computed_against_previous_value() {
        let calls = Arc::new(AtomicUsize::new(0));
        let chain = QuoteChain::new(
            "usd",
            vec![StubProvider::boxed(vec![reading(20.0), reading(21.0)], &calls)],
            FALLBACK_USD_MXN,
        );

        let first = chain.quote(Utc::now()).await;
        assert!(first.change.abs() < f64::EPSILON);

        let second = chain.quote(Utc::now()).await;
        assert!((second.change - 1.0).abs() < 1e-9);
        assert!((second.change_percent - 5.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_reported_change_is_kept() {
        let calls = Arc::new(AtomicUsize::new(0));
        let chain = QuoteChain::new(
            "gold",
            vec![StubProvider::boxed(
                vec![Ok(ProviderQuote {
                    value: 41_000.0,
                    change: Some((-120.5, -0.29)),
                    last_update: DateTime::UNIX_EPOCH,
                })],
                &calls,
            )],
            FALLBACK_GOLD_MXN_PER_OZ,
        );

        let quote = chain.quote(Utc::now()).await;
        assert!((quote.change + 120.5).abs() < f64::EPSILON);
        assert!((quote.change_percent + 0.29).abs() < f64::EPSILON);
        assert_eq!(quote.last_update, DateTime::UNIX_EPOCH);
    }

    #[tokio::test]
    async fn test_service_caches_prices() {
        let gold_calls = Arc::new(AtomicUsize::new(0));
        let usd_calls = Arc::new(AtomicUsize::new(0));
        let service = MarketService::new(
            QuoteChain::new(
                "gold",
                vec![StubProvider::boxed(vec![reading(40_000.0)], &gold_calls)],
                FALLBACK_GOLD_MXN_PER_OZ,
            ),
            QuoteChain::new(
                "usd",
                vec![StubProvider::boxed(vec![reading(18.0)], &usd_calls)],
                FALLBACK_USD_MXN,
            ),
            Duration::from_secs(60),
        );

        let first = service.prices().await;
        let second = service.prices().await;
        assert_eq!(first, second);
        assert_eq!(gold_calls.load(Ordering::SeqCst), 1);
        assert_eq!(usd_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_parse_goldapi() {
        let quote = GoldApiProvider::parse(
            r#"{"timestamp":1760000000,"metal":"XAU","currency":"MXN","price":74210.35,"ch":-310.2,"chp":-0.42}"#,
        )
        .unwrap();
        assert!((quote.value - 74_210.35).abs() < 1e-9);
        assert_eq!(quote.change, Some((-310.2, -0.42)));
        assert_eq!(quote.last_update.timestamp(), 1_760_000_000);

        assert!(GoldApiProvider::parse(r#"{"error":"Invalid API Key"}"#).is_err());
        assert!(GoldApiProvider::parse("<html>").is_err());
    }

    #[test]
    fn test_parse_exchange_rate() {
        let quote = ExchangeRateProvider::parse(
            r#"{"result":"success","time_last_update_unix":1760000000,"base_code":"USD","rates":{"USD":1,"MXN":18.42}}"#,
        )
        .unwrap();
        assert!((quote.value - 18.42).abs() < 1e-9);
        assert_eq!(quote.change, None);

        assert!(ExchangeRateProvider::parse(r#"{"result":"error","error-type":"unsupported-code"}"#).is_err());
        assert!(ExchangeRateProvider::parse(r#"{"result":"success","rates":{"EUR":0.9}}"#).is_err());
    }

    #[test]
    fn test_timestamp_accepts_milliseconds() {
        assert_eq!(timestamp(Some(1_760_000_000_000)).timestamp(), 1_760_000_000);
    }
}
