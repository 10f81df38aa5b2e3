//! Batch replay of predictions

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info};

use super::processor::AutoProcessor;
use super::types::{EngineError, ProcessReport};
use crate::market::MarketDataSource;
use crate::signal::Prediction;
use crate::store::TradeStore;

/// Runs a batch of predictions through the processor
///
/// Predictions for the same market run strictly in arrival order; distinct
/// markets run concurrently up to the configured bound.
pub struct BatchRunner<S: TradeStore + 'static, M: MarketDataSource + 'static> {
    processor: Arc<AutoProcessor<S, M>>,
    max_concurrent_markets: usize,
}

impl<S: TradeStore + 'static, M: MarketDataSource + 'static> BatchRunner<S, M> {
    /// Create a runner over an existing processor
    pub fn new(processor: Arc<AutoProcessor<S, M>>, max_concurrent_markets: usize) -> Self {
        Self {
            processor,
            max_concurrent_markets: max_concurrent_markets.max(1),
        }
    }

    /// Process every prediction and collect reports
    ///
    /// Reports come back in completion order, not submission order. A fatal
    /// error in any market aborts the whole batch once in-flight markets
    /// drain.
    pub async fn run(&self, predictions: Vec<Prediction>) -> Result<Vec<ProcessReport>, EngineError> {
        // Group by market, preserving per-market arrival order
        let mut by_market: HashMap<String, Vec<Prediction>> = HashMap::new();
        let mut market_order = Vec::new();
        for prediction in predictions {
            if !by_market.contains_key(&prediction.market_id) {
                market_order.push(prediction.market_id.clone());
            }
            by_market
                .entry(prediction.market_id.clone())
                .or_default()
                .push(prediction);
        }

        info!(
            markets = market_order.len(),
            max_concurrent = self.max_concurrent_markets,
            "Starting batch"
        );

        let semaphore = Arc::new(Semaphore::new(self.max_concurrent_markets));
        let mut handles = Vec::with_capacity(market_order.len());

        for market_id in market_order {
            let batch = by_market.remove(&market_id).unwrap_or_default();
            let processor = Arc::clone(&self.processor);
            let semaphore = Arc::clone(&semaphore);

            handles.push(tokio::spawn(async move {
                let _permit = semaphore
                    .acquire()
                    .await
                    .map_err(|_| EngineError::Store(crate::store::StoreError::Unavailable(
                        "semaphore closed".to_string(),
                    )))?;
                let mut reports = Vec::with_capacity(batch.len());
                for prediction in &batch {
                    reports.push(processor.process(prediction).await?);
                }
                Ok::<_, EngineError>(reports)
            }));
        }

        let mut reports = Vec::new();
        let mut first_error = None;
        for handle in handles {
            match handle.await {
                Ok(Ok(mut market_reports)) => reports.append(&mut market_reports),
                Ok(Err(e)) => {
                    error!(error = %e, "Market batch failed");
                    first_error.get_or_insert(e);
                }
                Err(e) => {
                    error!(error = %e, "Market task panicked");
                    first_error.get_or_insert(EngineError::Store(
                        crate::store::StoreError::Unavailable(e.to_string()),
                    ));
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => {
                let traded = reports.iter().filter(|r| r.traded()).count();
                info!(processed = reports.len(), traded, "Batch complete");
                Ok(reports)
            }
        }
    }
}
