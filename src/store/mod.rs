//! Persistence collaborator contract
//!
//! The engine requires durable storage with atomic multi-record writes and
//! per-market ordering. The contract is a trait; tests and paper runs use
//! the in-memory implementation.

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::portfolio::{PortfolioSnapshot, Trade};
use crate::risk::DenialReason;
use crate::signal::Signal;

/// Store failures
///
/// `Unavailable` is transient: the scheduler retries with backoff and
/// `process` is idempotent on retry. The remaining variants are contract
/// violations the caller maps to invariant failures.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("signal {0} not found")]
    SignalNotFound(Uuid),
    #[error("signal {0} already executed")]
    AlreadyExecuted(Uuid),
    #[error("trade already exists for signal {0}")]
    TradeExists(Uuid),
    #[error("trade {0} not found")]
    TradeNotFound(Uuid),
    #[error("trade {0} already closed")]
    AlreadyClosed(Uuid),
}

impl StoreError {
    /// Whether the failure is retryable
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

/// Durable storage for signals, trades, and snapshots
///
/// Implementations must make `commit_open` atomic: the executed flag flip
/// and the trade insert succeed or fail together. Writes for one market are
/// applied in submission order.
#[async_trait]
pub trait TradeStore: Send + Sync {
    /// Persist a new unexecuted signal
    async fn insert_signal(&self, signal: &Signal) -> Result<(), StoreError>;

    /// Signal previously created for a prediction, if any
    async fn signal_for_prediction(
        &self,
        prediction_id: Uuid,
    ) -> Result<Option<Signal>, StoreError>;

    /// Unexecuted signal for a market, if any
    async fn unexecuted_signal(&self, market_id: &str) -> Result<Option<Signal>, StoreError>;

    /// Record a risk denial against an unexecuted signal
    ///
    /// Marks the denial as final so a retry of the same prediction is a
    /// no-op rather than a resumed conversion.
    async fn mark_denied(&self, signal_id: Uuid, reason: DenialReason) -> Result<(), StoreError>;

    /// Atomically mark the signal executed and insert the open trade
    async fn commit_open(&self, signal_id: Uuid, trade: &Trade) -> Result<(), StoreError>;

    /// Close an open trade, recording exit price, time, and P&L
    async fn close_trade(
        &self,
        trade_id: Uuid,
        exit_price: Decimal,
        exit_time: DateTime<Utc>,
        pnl: Decimal,
    ) -> Result<Trade, StoreError>;

    /// Fetch one trade
    async fn trade(&self, trade_id: Uuid) -> Result<Option<Trade>, StoreError>;

    /// Append a portfolio snapshot
    async fn append_snapshot(&self, snapshot: &PortfolioSnapshot) -> Result<(), StoreError>;

    /// All signals, for reporting and audits
    async fn signals(&self) -> Result<Vec<Signal>, StoreError>;

    /// All trades, for reporting and audits
    async fn trades(&self) -> Result<Vec<Trade>, StoreError>;

    /// Snapshot history
    async fn snapshots(&self) -> Result<Vec<PortfolioSnapshot>, StoreError>;
}
