//! Drawdown tracking

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::engine::InvariantViolation;

/// Tracks peak equity and current drawdown
///
/// Updates must arrive in non-decreasing timestamp order, one per snapshot.
/// An out-of-order update would corrupt peak monotonicity and is rejected,
/// never silently applied.
#[derive(Debug, Clone)]
pub struct DrawdownMonitor {
    peak_equity: Decimal,
    current_equity: Decimal,
    last_update: Option<DateTime<Utc>>,
}

impl DrawdownMonitor {
    /// Create a monitor seeded with initial equity
    pub fn new(initial_equity: Decimal) -> Self {
        Self {
            peak_equity: initial_equity,
            current_equity: initial_equity,
            last_update: None,
        }
    }

    /// Apply a new equity observation, returning the drawdown percentage
    pub fn update(
        &mut self,
        equity: Decimal,
        timestamp: DateTime<Utc>,
    ) -> Result<Decimal, InvariantViolation> {
        if let Some(last) = self.last_update {
            if timestamp < last {
                return Err(InvariantViolation::OutOfOrderSnapshot {
                    last,
                    offered: timestamp,
                });
            }
        }

        self.last_update = Some(timestamp);
        self.current_equity = equity;
        if equity > self.peak_equity {
            self.peak_equity = equity;
        }

        Ok(self.current_drawdown())
    }

    /// Drawdown from peak as a fraction in [0, 1]
    pub fn current_drawdown(&self) -> Decimal {
        if self.peak_equity <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        (self.peak_equity - self.current_equity) / self.peak_equity
    }

    /// Highest equity seen so far
    pub fn peak_equity(&self) -> Decimal {
        self.peak_equity
    }
}
