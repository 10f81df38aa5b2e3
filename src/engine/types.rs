//! Engine types and failure semantics

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::portfolio::PortfolioSnapshot;
use crate::risk::DenialReason;
use crate::signal::{Signal, ValidationError};
use crate::store::StoreError;

/// Fatal bookkeeping inconsistency
///
/// These abort processing for the account and are surfaced to operators,
/// never silently patched.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum InvariantViolation {
    #[error("ledger imbalance: total {total_value} != cash {cash} + positions {positions_value}")]
    LedgerImbalance {
        total_value: Decimal,
        cash: Decimal,
        positions_value: Decimal,
    },
    #[error("snapshot out of order: last {last}, offered {offered}")]
    OutOfOrderSnapshot {
        last: DateTime<Utc>,
        offered: DateTime<Utc>,
    },
    #[error("duplicate trade {trade_id}")]
    DuplicateTrade { trade_id: Uuid },
    #[error("unknown trade {trade_id}")]
    UnknownTrade { trade_id: Uuid },
    #[error("signal {signal_id} executed but no trade exists")]
    OrphanedSignal { signal_id: Uuid },
    #[error("signal {signal_id} unexecuted with no recorded denial")]
    StrandedSignal { signal_id: Uuid },
}

/// Errors surfaced by `AutoProcessor::process`
///
/// Validation failures are never retried. Store failures are transient and
/// may be retried by the scheduler; `process` is idempotent on retry.
/// Invariant violations halt the account.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid prediction: {0}")]
    Validation(#[from] ValidationError),
    #[error("store failure: {0}")]
    Store(#[from] StoreError),
    #[error("invariant violation: {0}")]
    Invariant(#[from] InvariantViolation),
}

/// Why a prediction produced no trade without reaching risk admission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Market already resolved or closed
    MarketResolved,
    /// Circuit breaker is open
    BreakerOpen,
    /// Prediction already processed (idempotent retry)
    AlreadyProcessed,
    /// No actionable edge
    NoSignal,
    /// An unexecuted signal already exists for the market
    DuplicateSignal,
    /// Sizer refused the trade (degenerate price or zero Kelly)
    SizedToZero,
}

/// Outcome of processing one prediction
#[derive(Debug, Clone)]
pub enum ProcessOutcome {
    /// No state was created
    Skipped(SkipReason),
    /// Signal persisted but the trade was denied; the signal stays
    /// permanently unexecuted
    Denied {
        signal: Signal,
        reason: DenialReason,
    },
    /// Signal converted to an open trade
    Traded {
        signal: Signal,
        trade_id: Uuid,
        snapshot: PortfolioSnapshot,
    },
}

/// Report returned to the scheduler for one prediction
#[derive(Debug, Clone)]
pub struct ProcessReport {
    pub prediction_id: Uuid,
    pub market_id: String,
    pub outcome: ProcessOutcome,
}

impl ProcessReport {
    /// Whether a trade was committed
    pub fn traded(&self) -> bool {
        matches!(self.outcome, ProcessOutcome::Traded { .. })
    }
}
