//! Best-effort price aggregation over three independent upstream sources.
//!
//! Each source is fetched with its own timeout; a failure or malformed
//! payload zeroes only that source's field and is logged, never aborting
//! the other fetches or the overall call. [`PriceAggregator::quote`] always
//! returns a quote.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::PricingConfig;
use crate::domain::PriceQuote;

/// Source of composite quotes.
///
/// The engine and broadcaster consume quotes through this trait so tests can
/// inject a fixed quote without touching the network.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Produce a fresh composite quote. Never fails outward; unavailable
    /// fields are zero.
    async fn quote(&self) -> PriceQuote;
}

/// Fetches the three upstream readings and composes them into one quote.
pub struct PriceAggregator {
    client: Client,
    spot_url: String,
    gold_url: String,
    ounce_url: String,
    timeout: Duration,
}

/// Shared wire shape for all three sources: a JSON object with a numeric
/// (or numeric-string) `price` field. Anything else is treated as
/// unavailable.
#[derive(Debug, Deserialize)]
struct PriceBody {
    price: Decimal,
}

impl PriceAggregator {
    pub fn new(config: &PricingConfig) -> Self {
        Self {
            client: Client::new(),
            spot_url: config.spot_url.clone(),
            gold_url: config.gold_url.clone(),
            ounce_url: config.ounce_url.clone(),
            timeout: Duration::from_secs(config.source_timeout_secs),
        }
    }

    /// Fetch one source, degrading to the zero sentinel on any failure.
    async fn fetch(&self, url: &str, source: &'static str) -> Decimal {
        match self.fetch_price(url).await {
            Ok(price) if price > Decimal::ZERO => {
                debug!(source, %price, "price source responded");
                price
            }
            Ok(price) => {
                warn!(source, %price, "price source returned a non-positive price");
                Decimal::ZERO
            }
            Err(e) => {
                warn!(source, error = %e, "price source unavailable");
                Decimal::ZERO
            }
        }
    }

    async fn fetch_price(&self, url: &str) -> Result<Decimal, reqwest::Error> {
        let body: PriceBody = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(body.price)
    }
}

#[async_trait]
impl QuoteProvider for PriceAggregator {
    async fn quote(&self) -> PriceQuote {
        let (spot, gold, ounce) = tokio::join!(
            self.fetch(&self.spot_url, "spot"),
            self.fetch(&self.gold_url, "gold_18k"),
            self.fetch(&self.ounce_url, "ounce"),
        );

        PriceQuote::compose(spot, gold, ounce)
    }
}
