//! Portfolio types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::signal::Side;

/// Trade lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeStatus {
    Open,
    Closed,
    Cancelled,
}

/// A committed trade
///
/// Created at most once per signal. Mutated only on close; immutable once
/// `Closed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    /// Unique trade identifier
    pub id: Uuid,
    /// Market traded
    pub market_id: String,
    /// Signal that produced the trade; kept nullable for audit imports
    pub signal_id: Option<Uuid>,
    /// Trade side
    pub side: Side,
    /// Entry price
    pub entry_price: Decimal,
    /// Dollar size committed
    pub size: Decimal,
    /// Lifecycle status
    pub status: TradeStatus,
    /// Entry timestamp
    pub entry_time: DateTime<Utc>,
    /// Exit price, set on close
    pub exit_price: Option<Decimal>,
    /// Exit timestamp, set on close
    pub exit_time: Option<DateTime<Utc>>,
    /// Realized P&L, set on close
    pub pnl: Option<Decimal>,
}

impl Trade {
    /// Open a new trade from an executed signal
    pub fn open(
        market_id: String,
        signal_id: Uuid,
        side: Side,
        entry_price: Decimal,
        size: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            market_id,
            signal_id: Some(signal_id),
            side,
            entry_price,
            size,
            status: TradeStatus::Open,
            entry_time: Utc::now(),
            exit_price: None,
            exit_time: None,
            pnl: None,
        }
    }
}

/// Point-in-time account snapshot
///
/// Append-only: one per committed trade (or periodic tick), never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    pub timestamp: DateTime<Utc>,
    pub total_value: Decimal,
    pub cash: Decimal,
    pub positions_value: Decimal,
    pub total_exposure: Decimal,
    pub daily_pnl: Decimal,
    pub unrealized_pnl: Decimal,
    pub realized_pnl: Decimal,
}

/// Read-only view of account state for risk admission
#[derive(Debug, Clone)]
pub struct PortfolioState {
    pub total_value: Decimal,
    pub cash: Decimal,
    pub positions_value: Decimal,
    pub total_exposure: Decimal,
    pub open_positions: usize,
    pub daily_pnl: Decimal,
}
