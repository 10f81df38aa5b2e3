//! Market data collaborator
//!
//! The engine consumes quotes through a trait; fetching is out of scope.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// A market quote at a point in time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketQuote {
    /// Current Yes price
    pub yes_price: Decimal,
    /// Dollar liquidity; `None` means the source does not know, which is
    /// distinct from a reported zero
    #[serde(default)]
    pub liquidity: Option<Decimal>,
    /// Whether the market has resolved or closed
    #[serde(default)]
    pub resolved: bool,
}

/// Source of current market state
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Quote for a market, or `None` when the source has never seen it
    async fn quote(&self, market_id: &str) -> Option<MarketQuote>;
}

/// Fixed quote table for tests and batch replays
#[derive(Default)]
pub struct StaticMarketData {
    quotes: RwLock<HashMap<String, MarketQuote>>,
}

impl StaticMarketData {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a quote
    pub async fn set_quote(&self, market_id: &str, quote: MarketQuote) {
        let mut quotes = self.quotes.write().await;
        quotes.insert(market_id.to_string(), quote);
    }

    /// Mark a market resolved
    pub async fn resolve(&self, market_id: &str) {
        let mut quotes = self.quotes.write().await;
        if let Some(quote) = quotes.get_mut(market_id) {
            quote.resolved = true;
        }
    }
}

#[async_trait]
impl MarketDataSource for StaticMarketData {
    async fn quote(&self, market_id: &str) -> Option<MarketQuote> {
        let quotes = self.quotes.read().await;
        quotes.get(market_id).cloned()
    }
}
