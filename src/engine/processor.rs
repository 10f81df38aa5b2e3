//! Per-prediction processing pipeline

use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::types::{EngineError, InvariantViolation, ProcessOutcome, ProcessReport, SkipReason};
use crate::config::Config;
use crate::market::{MarketDataSource, MarketQuote};
use crate::portfolio::{PortfolioLedger, PortfolioSnapshot, Trade};
use crate::risk::{
    CircuitBreaker, DrawdownMonitor, PositionSizer, ProposedTrade, RiskLimitChecker,
};
use crate::signal::{Prediction, Side, Signal, SignalGenerator};
use crate::store::{StoreError, TradeStore};
use crate::telemetry::{record_counter, set_gauge, CounterMetric, GaugeMetric};

/// Mutable account state: the ledger plus risk state
///
/// Single-writer at account granularity; every mutation happens behind one
/// lock, transactionally with the store write that caused it.
struct AccountState {
    ledger: PortfolioLedger,
    drawdown: DrawdownMonitor,
    breaker: CircuitBreaker,
}

/// Orchestrates the signal-to-trade pipeline for one account
///
/// `process` is the single entry point the scheduler invokes per prediction.
/// Distinct markets may be processed concurrently; calls for the same market
/// serialize on a per-market lock because the pipeline reads then writes
/// shared signal/trade state for that market.
pub struct AutoProcessor<S: TradeStore, M: MarketDataSource> {
    generator: SignalGenerator,
    sizer: PositionSizer,
    checker: RiskLimitChecker,
    store: Arc<S>,
    market_data: Arc<M>,
    account: Mutex<AccountState>,
    market_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl<S: TradeStore, M: MarketDataSource> AutoProcessor<S, M> {
    /// Create a processor for a fresh account
    pub fn new(config: &Config, store: Arc<S>, market_data: Arc<M>) -> Self {
        let initial = config.engine.initial_bankroll;
        Self {
            generator: SignalGenerator::new(config.signal.clone()),
            sizer: PositionSizer::new(config.sizing.clone()),
            checker: RiskLimitChecker::new(config.risk.clone()),
            store,
            market_data,
            account: Mutex::new(AccountState {
                ledger: PortfolioLedger::new(initial),
                drawdown: DrawdownMonitor::new(initial),
                breaker: CircuitBreaker::new(
                    config.breaker.clone(),
                    config.risk.max_daily_loss_pct,
                ),
            }),
            market_locks: Mutex::new(HashMap::new()),
        }
    }

    async fn market_lock(&self, market_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.market_locks.lock().await;
        locks
            .entry(market_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Drop the map entry once no other task holds or awaits the lock
    async fn release_market_lock(&self, market_id: &str, lock: Arc<Mutex<()>>) {
        let mut locks = self.market_locks.lock().await;
        // Two handles left (the map's and ours) means nobody is waiting;
        // new arrivals need the map lock we hold, so the check cannot race
        if Arc::strong_count(&lock) == 2 {
            locks.remove(market_id);
        }
    }

    /// Process one prediction into at most one trade
    ///
    /// Expected business outcomes (no edge, breaker open, risk denial) are
    /// reported in the returned `ProcessOutcome`, never as errors. Transient
    /// store failures surface as `EngineError::Store` and the call is
    /// idempotent on retry: a retry resumes a conversion the failure left
    /// half-done rather than dropping it.
    pub async fn process(&self, prediction: &Prediction) -> Result<ProcessReport, EngineError> {
        prediction.validate().map_err(|e| {
            warn!(prediction_id = %prediction.id, error = %e, "Rejected malformed prediction");
            e
        })?;
        record_counter(CounterMetric::PredictionsProcessed, 1);

        // Serialize all read-then-write steps for this market
        let lock = self.market_lock(&prediction.market_id).await;
        let guard = lock.lock().await;
        let result = self.process_serialized(prediction).await;
        drop(guard);
        self.release_market_lock(&prediction.market_id, lock).await;
        result
    }

    async fn process_serialized(
        &self,
        prediction: &Prediction,
    ) -> Result<ProcessReport, EngineError> {
        let report = |outcome| ProcessReport {
            prediction_id: prediction.id,
            market_id: prediction.market_id.clone(),
            outcome,
        };

        let quote = self.market_data.quote(&prediction.market_id).await;
        if quote.as_ref().is_some_and(|q| q.resolved) {
            debug!(market_id = %prediction.market_id, "Market resolved, discarding");
            return Ok(report(ProcessOutcome::Skipped(SkipReason::MarketResolved)));
        }

        // Idempotency: executed and denied signals are final. An unexecuted,
        // undenied signal means a commit failed mid-flight and the
        // conversion is still owed; it is resumed below, not re-created.
        let stranded = match self.store.signal_for_prediction(prediction.id).await? {
            Some(signal) if signal.executed || signal.denial.is_some() => {
                debug!(prediction_id = %prediction.id, "Prediction already processed");
                return Ok(report(ProcessOutcome::Skipped(SkipReason::AlreadyProcessed)));
            }
            other => other,
        };

        let now = Utc::now();
        {
            let mut account = self.account.lock().await;
            if !account.breaker.check(now) {
                debug!(market_id = %prediction.market_id, "Suppressed by circuit breaker");
                return Ok(report(ProcessOutcome::Skipped(SkipReason::BreakerOpen)));
            }
        }

        let signal = match stranded {
            Some(signal) => {
                info!(
                    market_id = %prediction.market_id,
                    signal_id = %signal.id,
                    "Resuming signal stranded by a failed commit"
                );
                signal
            }
            None => match self.admit_prediction(prediction, &quote).await? {
                Ok(signal) => signal,
                Err(skip) => return Ok(report(ProcessOutcome::Skipped(skip))),
            },
        };

        let outcome = self.convert_signal(prediction, signal, &quote).await?;
        Ok(report(outcome))
    }

    /// Fresh-signal path: generate, supersede check, size, persist
    async fn admit_prediction(
        &self,
        prediction: &Prediction,
        quote: &Option<MarketQuote>,
    ) -> Result<Result<Signal, SkipReason>, EngineError> {
        let liquidity = quote.as_ref().and_then(|q| q.liquidity);
        let Some(mut signal) = self.generator.generate(prediction, liquidity) else {
            return Ok(Err(SkipReason::NoSignal));
        };

        // Supersede policy: never two unexecuted signals for one market
        if self
            .store
            .unexecuted_signal(&prediction.market_id)
            .await?
            .is_some()
        {
            debug!(market_id = %prediction.market_id, "Unexecuted signal exists, discarding");
            return Ok(Err(SkipReason::DuplicateSignal));
        }

        let (win_prob, entry_price) = side_terms(signal.side, prediction);
        let equity = {
            let account = self.account.lock().await;
            account.ledger.equity()
        };
        let size = self.sizer.size(win_prob, entry_price, signal.strength, equity);
        if size <= Decimal::ZERO {
            debug!(market_id = %prediction.market_id, "Sizer refused the trade");
            return Ok(Err(SkipReason::SizedToZero));
        }
        signal.suggested_size = size;

        self.store.insert_signal(&signal).await?;
        record_counter(CounterMetric::SignalsGenerated, 1);
        Ok(Ok(signal))
    }

    /// Risk admission and atomic commit for a persisted, sized signal
    async fn convert_signal(
        &self,
        prediction: &Prediction,
        mut signal: Signal,
        quote: &Option<MarketQuote>,
    ) -> Result<ProcessOutcome, EngineError> {
        let (_, entry_price) = side_terms(signal.side, prediction);
        let proposed = ProposedTrade {
            market_id: prediction.market_id.clone(),
            side: signal.side,
            entry_price,
            size: signal.suggested_size,
        };

        let mut account = self.account.lock().await;

        if let Err(reason) = self.checker.admit(&proposed, &account.ledger.state()) {
            // The denial is recorded as final; the signal stays permanently
            // unexecuted and a retry will not resume it
            self.store.mark_denied(signal.id, reason).await?;
            signal.denial = Some(reason);
            warn!(
                market_id = %prediction.market_id,
                signal_id = %signal.id,
                %reason,
                "Trade denied by risk limits"
            );
            record_counter(CounterMetric::RiskDenials, 1);
            return Ok(ProcessOutcome::Denied { signal, reason });
        }

        let trade = Trade::open(
            prediction.market_id.clone(),
            signal.id,
            signal.side,
            entry_price,
            signal.suggested_size,
        );

        // Atomic: executed flag and trade row change together or not at all
        self.store
            .commit_open(signal.id, &trade)
            .await
            .map_err(|e| match e {
                StoreError::AlreadyExecuted(_) | StoreError::TradeExists(_) => {
                    EngineError::Invariant(InvariantViolation::DuplicateTrade {
                        trade_id: trade.id,
                    })
                }
                other => EngineError::Store(other),
            })?;
        signal.executed = true;
        record_counter(CounterMetric::TradesOpened, 1);

        if let Some(q) = quote {
            account.ledger.update_mark(&prediction.market_id, q.yes_price);
        }
        // Timestamp under the account lock so snapshots cannot interleave
        // out of order across markets
        let snapshot = account.ledger.apply_open(&trade, Utc::now())?;
        self.store.append_snapshot(&snapshot).await?;
        self.observe(&mut account, &snapshot)?;

        info!(
            market_id = %prediction.market_id,
            signal_id = %signal.id,
            trade_id = %trade.id,
            side = ?signal.side,
            strength = ?signal.strength,
            size = %signal.suggested_size,
            "Trade opened"
        );

        Ok(ProcessOutcome::Traded {
            signal,
            trade_id: trade.id,
            snapshot,
        })
    }

    /// Close an open trade at the given exit price for the held token
    ///
    /// Applies the close to the ledger, feeds the realized result to the
    /// circuit breaker, and emits a snapshot.
    pub async fn close_trade(
        &self,
        trade_id: Uuid,
        exit_price: Decimal,
    ) -> Result<PortfolioSnapshot, EngineError> {
        let open = self
            .store
            .trade(trade_id)
            .await?
            .ok_or(InvariantViolation::UnknownTrade { trade_id })?;

        let now = Utc::now();
        let pnl = if open.entry_price > Decimal::ZERO {
            (exit_price - open.entry_price) * (open.size / open.entry_price)
        } else {
            Decimal::ZERO
        };

        self.store
            .close_trade(trade_id, exit_price, now, pnl)
            .await?;
        record_counter(CounterMetric::TradesClosed, 1);

        let mut account = self.account.lock().await;
        let closed_at = Utc::now();
        let snapshot = account.ledger.apply_close(trade_id, pnl, closed_at)?;
        self.store.append_snapshot(&snapshot).await?;
        account.breaker.record_trade_result(pnl, closed_at);
        self.observe(&mut account, &snapshot)?;

        info!(%trade_id, pnl = %pnl, "Trade closed");
        Ok(snapshot)
    }

    /// Feed a snapshot to the drawdown monitor and circuit breaker
    fn observe(
        &self,
        account: &mut AccountState,
        snapshot: &PortfolioSnapshot,
    ) -> Result<(), InvariantViolation> {
        let drawdown = account
            .drawdown
            .update(snapshot.total_value, snapshot.timestamp)?;
        account.breaker.record_snapshot(
            drawdown,
            snapshot.daily_pnl,
            snapshot.total_value,
            snapshot.timestamp,
        );

        set_gauge(GaugeMetric::Equity, decimal_to_f64(snapshot.total_value));
        set_gauge(GaugeMetric::TotalExposure, decimal_to_f64(snapshot.total_exposure));
        set_gauge(GaugeMetric::DailyPnl, decimal_to_f64(snapshot.daily_pnl));
        set_gauge(GaugeMetric::UnrealizedPnl, decimal_to_f64(snapshot.unrealized_pnl));
        set_gauge(GaugeMetric::RealizedPnl, decimal_to_f64(snapshot.realized_pnl));
        set_gauge(GaugeMetric::DrawdownPct, decimal_to_f64(drawdown));
        set_gauge(GaugeMetric::OpenPositions, account.ledger.open_count() as f64);
        Ok(())
    }

    /// Verify that every signal's bookkeeping is consistent
    ///
    /// An executed signal with no trade means a signal-to-trade conversion
    /// was lost after commit; an unexecuted signal with no recorded denial
    /// means one is still owed. Both are surfaced, never silently passed.
    pub async fn audit(&self) -> Result<(), EngineError> {
        let signals = self.store.signals().await?;
        let trades = self.store.trades().await?;

        for signal in &signals {
            if signal.executed {
                let has_trade = trades.iter().any(|t| t.signal_id == Some(signal.id));
                if !has_trade {
                    return Err(EngineError::Invariant(InvariantViolation::OrphanedSignal {
                        signal_id: signal.id,
                    }));
                }
            } else if signal.denial.is_none() {
                return Err(EngineError::Invariant(InvariantViolation::StrandedSignal {
                    signal_id: signal.id,
                }));
            }
        }
        Ok(())
    }

    /// Current account state view for reporting
    pub async fn portfolio_state(&self) -> crate::portfolio::PortfolioState {
        let account = self.account.lock().await;
        account.ledger.state()
    }

    /// Current breaker state for reporting
    pub async fn breaker_state(&self) -> crate::risk::BreakerState {
        let mut account = self.account.lock().await;
        account.breaker.check(Utc::now());
        account.breaker.state()
    }

    /// Reset the daily P&L anchor (start of trading day)
    pub async fn reset_daily(&self) {
        let mut account = self.account.lock().await;
        account.ledger.reset_daily();
    }
}

/// Win probability and token price for the chosen side
///
/// A No signal bets on the No token at its own price with its own win
/// probability; feeding the raw Yes numbers would size every No signal to
/// zero.
fn side_terms(side: Side, prediction: &Prediction) -> (Decimal, Decimal) {
    match side {
        Side::Yes => (prediction.probability, prediction.market_price),
        Side::No => (
            Decimal::ONE - prediction.probability,
            Decimal::ONE - prediction.market_price,
        ),
    }
}

fn decimal_to_f64(value: Decimal) -> f64 {
    use rust_decimal::prelude::ToPrimitive;
    value.to_f64().unwrap_or(0.0)
}
