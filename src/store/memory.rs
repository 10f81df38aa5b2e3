//! In-memory store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{StoreError, TradeStore};
use crate::portfolio::{PortfolioSnapshot, Trade, TradeStatus};
use crate::risk::DenialReason;
use crate::signal::Signal;

#[derive(Default)]
struct Inner {
    signals: HashMap<Uuid, Signal>,
    trades: HashMap<Uuid, Trade>,
    snapshots: Vec<PortfolioSnapshot>,
}

/// In-memory `TradeStore` used by tests and paper runs
///
/// A single write lock over all records gives the atomic multi-record
/// commit the contract requires.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
    fail_next: Arc<AtomicBool>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next operation fail with a transient error (test hook)
    pub fn fail_next_operation(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    fn check_fault(&self) -> Result<(), StoreError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected fault".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl TradeStore for MemoryStore {
    async fn insert_signal(&self, signal: &Signal) -> Result<(), StoreError> {
        self.check_fault()?;
        let mut inner = self.inner.write().await;
        inner.signals.insert(signal.id, signal.clone());
        Ok(())
    }

    async fn signal_for_prediction(
        &self,
        prediction_id: Uuid,
    ) -> Result<Option<Signal>, StoreError> {
        self.check_fault()?;
        let inner = self.inner.read().await;
        Ok(inner
            .signals
            .values()
            .find(|s| s.prediction_id == prediction_id)
            .cloned())
    }

    async fn unexecuted_signal(&self, market_id: &str) -> Result<Option<Signal>, StoreError> {
        self.check_fault()?;
        let inner = self.inner.read().await;
        Ok(inner
            .signals
            .values()
            .find(|s| s.market_id == market_id && !s.executed)
            .cloned())
    }

    async fn mark_denied(&self, signal_id: Uuid, reason: DenialReason) -> Result<(), StoreError> {
        self.check_fault()?;
        let mut inner = self.inner.write().await;
        let signal = inner
            .signals
            .get_mut(&signal_id)
            .ok_or(StoreError::SignalNotFound(signal_id))?;
        if signal.executed {
            return Err(StoreError::AlreadyExecuted(signal_id));
        }
        signal.denial = Some(reason);
        Ok(())
    }

    async fn commit_open(&self, signal_id: Uuid, trade: &Trade) -> Result<(), StoreError> {
        self.check_fault()?;
        let mut inner = self.inner.write().await;

        // All checks before any mutation: both records change or neither does
        let signal = inner
            .signals
            .get(&signal_id)
            .ok_or(StoreError::SignalNotFound(signal_id))?;
        if signal.executed {
            return Err(StoreError::AlreadyExecuted(signal_id));
        }
        if inner
            .trades
            .values()
            .any(|t| t.signal_id == Some(signal_id))
        {
            return Err(StoreError::TradeExists(signal_id));
        }

        inner
            .signals
            .get_mut(&signal_id)
            .expect("checked above")
            .executed = true;
        inner.trades.insert(trade.id, trade.clone());
        Ok(())
    }

    async fn close_trade(
        &self,
        trade_id: Uuid,
        exit_price: Decimal,
        exit_time: DateTime<Utc>,
        pnl: Decimal,
    ) -> Result<Trade, StoreError> {
        self.check_fault()?;
        let mut inner = self.inner.write().await;
        let trade = inner
            .trades
            .get_mut(&trade_id)
            .ok_or(StoreError::TradeNotFound(trade_id))?;
        if trade.status != TradeStatus::Open {
            return Err(StoreError::AlreadyClosed(trade_id));
        }

        trade.status = TradeStatus::Closed;
        trade.exit_price = Some(exit_price);
        trade.exit_time = Some(exit_time);
        trade.pnl = Some(pnl);
        Ok(trade.clone())
    }

    async fn trade(&self, trade_id: Uuid) -> Result<Option<Trade>, StoreError> {
        self.check_fault()?;
        let inner = self.inner.read().await;
        Ok(inner.trades.get(&trade_id).cloned())
    }

    async fn append_snapshot(&self, snapshot: &PortfolioSnapshot) -> Result<(), StoreError> {
        self.check_fault()?;
        let mut inner = self.inner.write().await;
        inner.snapshots.push(snapshot.clone());
        Ok(())
    }

    async fn signals(&self) -> Result<Vec<Signal>, StoreError> {
        self.check_fault()?;
        let inner = self.inner.read().await;
        Ok(inner.signals.values().cloned().collect())
    }

    async fn trades(&self) -> Result<Vec<Trade>, StoreError> {
        self.check_fault()?;
        let inner = self.inner.read().await;
        Ok(inner.trades.values().cloned().collect())
    }

    async fn snapshots(&self) -> Result<Vec<PortfolioSnapshot>, StoreError> {
        self.check_fault()?;
        let inner = self.inner.read().await;
        Ok(inner.snapshots.clone())
    }
}
