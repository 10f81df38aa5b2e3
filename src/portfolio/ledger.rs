//! Portfolio ledger
//!
//! Applies committed trades, maintains cash/exposure/P&L, and emits
//! snapshots with the ledger identity checked on every one.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use uuid::Uuid;

use super::types::{PortfolioSnapshot, PortfolioState, Trade};
use crate::engine::InvariantViolation;
use crate::signal::Side;

/// An open position held by the ledger for mark-to-market
#[derive(Debug, Clone)]
struct OpenPosition {
    market_id: String,
    side: Side,
    entry_price: Decimal,
    size: Decimal,
}

/// Account ledger, the single mutable bookkeeping state per account
///
/// Invariant on every snapshot: total_value == cash + positions_value. A
/// violation is surfaced as fatal, never corrected in place.
#[derive(Debug, Clone)]
pub struct PortfolioLedger {
    cash: Decimal,
    positions_value: Decimal,
    total_value: Decimal,
    total_exposure: Decimal,
    realized_pnl: Decimal,
    daily_anchor: Decimal,
    open: HashMap<Uuid, OpenPosition>,
    /// Last seen Yes price per market, for unrealized P&L
    marks: HashMap<String, Decimal>,
    last_snapshot_at: Option<DateTime<Utc>>,
}

impl PortfolioLedger {
    /// Create a ledger holding only cash
    pub fn new(initial_cash: Decimal) -> Self {
        Self {
            cash: initial_cash,
            positions_value: Decimal::ZERO,
            total_value: initial_cash,
            total_exposure: Decimal::ZERO,
            realized_pnl: Decimal::ZERO,
            daily_anchor: initial_cash,
            open: HashMap::new(),
            marks: HashMap::new(),
            last_snapshot_at: None,
        }
    }

    /// Equity available to the sizer
    pub fn equity(&self) -> Decimal {
        self.total_value
    }

    /// Open position count
    pub fn open_count(&self) -> usize {
        self.open.len()
    }

    /// Realized P&L movement since the daily anchor
    pub fn daily_pnl(&self) -> Decimal {
        self.total_value - self.daily_anchor
    }

    /// Record the latest Yes price for a market
    pub fn update_mark(&mut self, market_id: &str, yes_price: Decimal) {
        self.marks.insert(market_id.to_string(), yes_price);
    }

    /// Unrealized P&L across open positions, from last known marks
    ///
    /// Positions in markets with no mark yet contribute zero: unrealized
    /// P&L is an external input, not stored state.
    pub fn unrealized_pnl(&self) -> Decimal {
        self.open
            .values()
            .map(|pos| {
                let Some(mark) = self.marks.get(&pos.market_id) else {
                    return Decimal::ZERO;
                };
                let current = match pos.side {
                    Side::Yes => *mark,
                    Side::No => Decimal::ONE - *mark,
                };
                if pos.entry_price <= Decimal::ZERO {
                    return Decimal::ZERO;
                }
                let shares = pos.size / pos.entry_price;
                (current - pos.entry_price) * shares
            })
            .sum()
    }

    /// Read-only state view for risk admission
    pub fn state(&self) -> PortfolioState {
        PortfolioState {
            total_value: self.total_value,
            cash: self.cash,
            positions_value: self.positions_value,
            total_exposure: self.total_exposure,
            open_positions: self.open.len(),
            daily_pnl: self.daily_pnl(),
        }
    }

    /// Apply an opened trade and emit a snapshot
    pub fn apply_open(
        &mut self,
        trade: &Trade,
        now: DateTime<Utc>,
    ) -> Result<PortfolioSnapshot, InvariantViolation> {
        if self.open.contains_key(&trade.id) {
            return Err(InvariantViolation::DuplicateTrade { trade_id: trade.id });
        }

        self.cash -= trade.size;
        self.positions_value += trade.size;
        self.total_exposure += trade.size;
        self.open.insert(
            trade.id,
            OpenPosition {
                market_id: trade.market_id.clone(),
                side: trade.side,
                entry_price: trade.entry_price,
                size: trade.size,
            },
        );
        self.update_mark(
            &trade.market_id,
            match trade.side {
                Side::Yes => trade.entry_price,
                Side::No => Decimal::ONE - trade.entry_price,
            },
        );

        self.snapshot(now)
    }

    /// Apply a closed trade and emit a snapshot
    ///
    /// `pnl` is the realized result; cash receives the original size plus
    /// the P&L.
    pub fn apply_close(
        &mut self,
        trade_id: Uuid,
        pnl: Decimal,
        now: DateTime<Utc>,
    ) -> Result<PortfolioSnapshot, InvariantViolation> {
        let position = self
            .open
            .remove(&trade_id)
            .ok_or(InvariantViolation::UnknownTrade { trade_id })?;

        self.cash += position.size + pnl;
        self.positions_value -= position.size;
        self.total_exposure -= position.size;
        self.realized_pnl += pnl;
        self.total_value += pnl;

        self.snapshot(now)
    }

    /// Reset the daily P&L anchor at the start of a trading day
    pub fn reset_daily(&mut self) {
        self.daily_anchor = self.total_value;
    }

    /// Emit a snapshot, enforcing the ledger identity and timestamp order
    pub fn snapshot(&mut self, now: DateTime<Utc>) -> Result<PortfolioSnapshot, InvariantViolation> {
        if let Some(last) = self.last_snapshot_at {
            if now < last {
                return Err(InvariantViolation::OutOfOrderSnapshot {
                    last,
                    offered: now,
                });
            }
        }

        if self.total_value != self.cash + self.positions_value {
            return Err(InvariantViolation::LedgerImbalance {
                total_value: self.total_value,
                cash: self.cash,
                positions_value: self.positions_value,
            });
        }

        self.last_snapshot_at = Some(now);
        Ok(PortfolioSnapshot {
            timestamp: now,
            total_value: self.total_value,
            cash: self.cash,
            positions_value: self.positions_value,
            total_exposure: self.total_exposure,
            daily_pnl: self.daily_pnl(),
            unrealized_pnl: self.unrealized_pnl(),
            realized_pnl: self.realized_pnl,
        })
    }
}
