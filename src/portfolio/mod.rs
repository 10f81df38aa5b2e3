//! Portfolio bookkeeping
//!
//! Trade records, snapshots, and the account ledger

mod ledger;
mod types;

pub use ledger::PortfolioLedger;
pub use types::{PortfolioSnapshot, PortfolioState, Trade, TradeStatus};
