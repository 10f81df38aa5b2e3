//! edge-engine: Automated trade decision engine for prediction markets
//!
//! This library provides the core components for:
//! - Signal generation from model predictions (edge and confidence gates)
//! - Fractional-Kelly position sizing for binary contracts
//! - Layered risk admission with ordered limit checks
//! - Circuit breaker gating all trading
//! - Exactly-once signal-to-trade orchestration
//! - Portfolio ledger with enforced bookkeeping invariants
//! - Full observability stack

pub mod cli;
pub mod config;
pub mod engine;
pub mod market;
pub mod portfolio;
pub mod risk;
pub mod signal;
pub mod store;
pub mod telemetry;
