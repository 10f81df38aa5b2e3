//! Risk management module
//!
//! Position sizing, admission limits, drawdown tracking, and the circuit
//! breaker gating all trading

mod breaker;
mod drawdown;
mod limits;
mod sizing;
mod types;

pub use breaker::{BreakerState, CircuitBreaker, TripReason};
pub use drawdown::DrawdownMonitor;
pub use limits::RiskLimitChecker;
pub use sizing::PositionSizer;
pub use types::{DenialReason, ProposedTrade};
