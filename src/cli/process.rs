//! Process command implementation

use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Config;
use crate::engine::{AutoProcessor, BatchRunner, ProcessOutcome, SkipReason};
use crate::market::{MarketQuote, StaticMarketData};
use crate::signal::Prediction;
use crate::store::MemoryStore;

#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// JSON file containing an array of predictions
    #[arg(long)]
    pub predictions: PathBuf,

    /// JSON file mapping market id to quote (optional)
    #[arg(long)]
    pub quotes: Option<PathBuf>,

    /// Print every per-prediction outcome, not just the summary
    #[arg(short, long)]
    pub verbose: bool,
}

impl ProcessArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let raw = std::fs::read_to_string(&self.predictions)?;
        let predictions: Vec<Prediction> = serde_json::from_str(&raw)?;

        let market_data = Arc::new(StaticMarketData::new());
        if let Some(path) = &self.quotes {
            let raw = std::fs::read_to_string(path)?;
            let quotes: std::collections::HashMap<String, MarketQuote> =
                serde_json::from_str(&raw)?;
            for (market_id, quote) in quotes {
                market_data.set_quote(&market_id, quote).await;
            }
        }

        let store = Arc::new(MemoryStore::new());
        let processor = Arc::new(AutoProcessor::new(config, Arc::clone(&store), market_data));
        let runner = BatchRunner::new(
            Arc::clone(&processor),
            config.engine.max_concurrent_markets,
        );

        tracing::info!(count = predictions.len(), "Processing predictions");
        let reports = runner.run(predictions).await?;
        processor.audit().await?;

        let mut traded = 0usize;
        let mut denied = 0usize;
        let mut skipped = [0usize; 6];
        for report in &reports {
            match &report.outcome {
                ProcessOutcome::Traded { trade_id, snapshot, .. } => {
                    traded += 1;
                    if self.verbose {
                        println!(
                            "TRADED  {} trade={} equity={}",
                            report.market_id, trade_id, snapshot.total_value
                        );
                    }
                }
                ProcessOutcome::Denied { reason, .. } => {
                    denied += 1;
                    if self.verbose {
                        println!("DENIED  {} ({})", report.market_id, reason);
                    }
                }
                ProcessOutcome::Skipped(reason) => {
                    skipped[skip_index(*reason)] += 1;
                    if self.verbose {
                        println!("SKIPPED {} ({:?})", report.market_id, reason);
                    }
                }
            }
        }

        let state = processor.portfolio_state().await;
        println!("Processed {} predictions", reports.len());
        println!("  Traded: {traded}");
        println!("  Denied: {denied}");
        println!(
            "  Skipped: resolved={} breaker={} duplicate={} no-signal={} superseded={} zero-size={}",
            skipped[0], skipped[1], skipped[2], skipped[3], skipped[4], skipped[5]
        );
        println!("Portfolio:");
        println!("  Equity: {}", state.total_value);
        println!("  Cash: {}", state.cash);
        println!("  Open positions: {}", state.open_positions);
        println!("  Total exposure: {}", state.total_exposure);
        println!("  Daily P&L: {}", state.daily_pnl);

        Ok(())
    }
}

fn skip_index(reason: SkipReason) -> usize {
    match reason {
        SkipReason::MarketResolved => 0,
        SkipReason::BreakerOpen => 1,
        SkipReason::AlreadyProcessed => 2,
        SkipReason::NoSignal => 3,
        SkipReason::DuplicateSignal => 4,
        SkipReason::SizedToZero => 5,
    }
}
