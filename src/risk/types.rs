//! Risk types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a proposed trade was denied
///
/// A denial is an expected business outcome, carried as a typed value inside
/// the process report. It is never raised through the error channel and is
/// never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum DenialReason {
    /// Open position count at the limit
    #[error("too many open positions")]
    TooManyPositions,
    /// Single position above the per-position cap
    #[error("position too large")]
    PositionTooLarge,
    /// Total exposure would exceed the cap
    #[error("exposure too high")]
    ExposureTooHigh,
    /// Daily loss limit breached, no new trades today
    #[error("daily loss limit reached")]
    DailyLossLimit,
}

/// A sized trade awaiting risk admission
#[derive(Debug, Clone)]
pub struct ProposedTrade {
    pub market_id: String,
    pub side: crate::signal::Side,
    pub entry_price: Decimal,
    pub size: Decimal,
}
