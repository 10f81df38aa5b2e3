//! Risk admission checks

use tracing::debug;

use super::types::{DenialReason, ProposedTrade};
use crate::config::RiskConfig;
use crate::portfolio::PortfolioState;

/// Ordered admission check against account state
///
/// Stateless and pure: evaluates the configured limits in a fixed order and
/// reports the first failure. Never mutates the portfolio state it reads.
#[derive(Debug, Clone)]
pub struct RiskLimitChecker {
    config: RiskConfig,
}

impl RiskLimitChecker {
    /// Create a new checker
    pub fn new(config: RiskConfig) -> Self {
        Self { config }
    }

    /// Admit or deny a proposed trade
    ///
    /// Check order is fixed: position count, single-position size, total
    /// exposure, daily loss. The first limit breached wins.
    pub fn admit(
        &self,
        proposed: &ProposedTrade,
        state: &PortfolioState,
    ) -> Result<(), DenialReason> {
        if state.open_positions >= self.config.max_open_positions {
            debug!(
                open = state.open_positions,
                max = self.config.max_open_positions,
                "Denied: position count"
            );
            return Err(DenialReason::TooManyPositions);
        }

        if proposed.size > self.config.max_position_pct * state.total_value {
            debug!(
                size = %proposed.size,
                total_value = %state.total_value,
                "Denied: position size"
            );
            return Err(DenialReason::PositionTooLarge);
        }

        if state.total_exposure + proposed.size
            > self.config.max_total_exposure_pct * state.total_value
        {
            debug!(
                exposure = %state.total_exposure,
                size = %proposed.size,
                "Denied: total exposure"
            );
            return Err(DenialReason::ExposureTooHigh);
        }

        if state.daily_pnl <= -(self.config.max_daily_loss_pct * state.total_value) {
            debug!(daily_pnl = %state.daily_pnl, "Denied: daily loss limit");
            return Err(DenialReason::DailyLossLimit);
        }

        Ok(())
    }
}
