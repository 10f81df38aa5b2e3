//! Fractional-Kelly position sizing

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

use crate::config::SizingConfig;
use crate::signal::Strength;

/// Probability clamp so the Kelly formula never sees 0 or 1 exactly
const PROB_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 4); // 0.0001

/// Fractional-Kelly sizer for binary outcomes
///
/// Pure function of its inputs; never panics on out-of-range values.
#[derive(Debug, Clone)]
pub struct PositionSizer {
    config: SizingConfig,
}

impl PositionSizer {
    /// Create a new sizer
    pub fn new(config: SizingConfig) -> Self {
        Self { config }
    }

    /// Multiplier applied on top of the Kelly fraction per strength grade
    pub fn strength_multiplier(strength: Strength) -> Decimal {
        match strength {
            Strength::Strong => dec!(1.0),
            Strength::Medium => dec!(0.7),
            Strength::Weak => dec!(0.5),
        }
    }

    /// Calculate the dollar position size
    ///
    /// Kelly for a binary contract priced at `market_price`:
    /// b = (1 - price) / price (net payout odds per dollar),
    /// f* = (p*b - (1 - p)) / b, clipped to [0, 1].
    /// The bet fraction is f* scaled by the configured Kelly fraction and the
    /// strength multiplier, then clamped to [min_position_size,
    /// max_position_pct * equity]. The cap binds over the floor: when the
    /// account is too small for the floor to fit under the cap, the size is
    /// zero, never above the cap.
    ///
    /// Degenerate prices (b <= 0) and non-positive equity size to zero.
    pub fn size(
        &self,
        probability: Decimal,
        market_price: Decimal,
        strength: Strength,
        equity: Decimal,
    ) -> Decimal {
        if equity <= Decimal::ZERO {
            return Decimal::ZERO;
        }

        // Refuse to size at degenerate prices
        if market_price <= Decimal::ZERO || market_price >= Decimal::ONE {
            debug!(%market_price, "Degenerate price, sizing to zero");
            return Decimal::ZERO;
        }

        let p = probability
            .max(PROB_EPSILON)
            .min(Decimal::ONE - PROB_EPSILON);

        let b = (Decimal::ONE - market_price) / market_price;
        let q = Decimal::ONE - p;

        let kelly = ((p * b) - q) / b;
        let kelly = kelly.max(Decimal::ZERO).min(Decimal::ONE);
        if kelly == Decimal::ZERO {
            return Decimal::ZERO;
        }

        let fraction = kelly * self.config.kelly_fraction * Self::strength_multiplier(strength);
        let raw = fraction * equity;

        // The equity cap binds over the minimum floor: an account too small
        // to fit the floor under the cap sizes to zero rather than above it
        let max_size = self.config.max_position_pct * equity;
        if max_size < self.config.min_position_size {
            debug!(%equity, %max_size, "Equity cap below minimum size, sizing to zero");
            return Decimal::ZERO;
        }
        raw.min(max_size).max(self.config.min_position_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_sizer() -> PositionSizer {
        PositionSizer::new(SizingConfig::default())
    }

    #[test]
    fn test_kelly_worked_example() {
        // p = 0.6 at price 0.5: b = 1, f* = 0.2, quarter Kelly = 0.05.
        // 0.05 * 10_000 = 500, exactly at the 5% cap.
        let sizer = make_sizer();
        let size = sizer.size(dec!(0.6), dec!(0.5), Strength::Strong, dec!(10000));
        assert_eq!(size, dec!(500));
    }

    #[test]
    fn test_large_edge_clamped_to_max() {
        // p = 0.8755 at price 0.50: f* = 0.751, f = 0.18775,
        // raw = $1877.50, clamped by the 5% cap to $500.
        let sizer = make_sizer();
        let size = sizer.size(dec!(0.8755), dec!(0.50), Strength::Strong, dec!(10000));
        assert_eq!(size, dec!(500));
    }

    #[test]
    fn test_medium_strength_scales_down() {
        let sizer = make_sizer();
        let strong = sizer.size(dec!(0.58), dec!(0.5), Strength::Strong, dec!(10000));
        let medium = sizer.size(dec!(0.58), dec!(0.5), Strength::Medium, dec!(10000));
        // f* = 0.16, strong = 0.04 * 10000 = 400, medium = 0.7 * 400 = 280
        assert_eq!(strong, dec!(400));
        assert_eq!(medium, dec!(280));
    }

    #[test]
    fn test_no_edge_sizes_to_zero() {
        let sizer = make_sizer();
        let size = sizer.size(dec!(0.5), dec!(0.5), Strength::Strong, dec!(10000));
        assert_eq!(size, dec!(0));
    }

    #[test]
    fn test_negative_kelly_sizes_to_zero() {
        let sizer = make_sizer();
        // Probability below price: Kelly is negative, clipped to zero
        let size = sizer.size(dec!(0.4), dec!(0.5), Strength::Strong, dec!(10000));
        assert_eq!(size, dec!(0));
    }

    #[test]
    fn test_degenerate_prices() {
        let sizer = make_sizer();
        assert_eq!(sizer.size(dec!(0.9), dec!(1.0), Strength::Strong, dec!(10000)), dec!(0));
        assert_eq!(sizer.size(dec!(0.9), dec!(0), Strength::Strong, dec!(10000)), dec!(0));
        assert_eq!(sizer.size(dec!(0.9), dec!(1.5), Strength::Strong, dec!(10000)), dec!(0));
    }

    #[test]
    fn test_out_of_range_probability_is_clamped() {
        let sizer = make_sizer();
        // Must not panic; p clamps into (0, 1)
        let size = sizer.size(dec!(1.7), dec!(0.5), Strength::Strong, dec!(10000));
        assert!(size > dec!(0));
        assert!(size <= dec!(500));
    }

    #[test]
    fn test_zero_and_negative_equity() {
        let sizer = make_sizer();
        assert_eq!(sizer.size(dec!(0.6), dec!(0.5), Strength::Strong, dec!(0)), dec!(0));
        assert_eq!(sizer.size(dec!(0.6), dec!(0.5), Strength::Strong, dec!(-100)), dec!(0));
    }

    #[test]
    fn test_minimum_size_floor() {
        let sizer = make_sizer();
        // Small account: raw size below $10 floors at the minimum
        let size = sizer.size(dec!(0.62), dec!(0.5), Strength::Medium, dec!(200));
        assert_eq!(size, dec!(10));
    }

    #[test]
    fn test_floor_never_exceeds_equity_cap() {
        let sizer = make_sizer();
        // Equity 100: the 5% cap is $5, below the $10 floor. The floor must
        // not override the cap; the account is too small to trade.
        let size = sizer.size(dec!(0.62), dec!(0.5), Strength::Medium, dec!(100));
        assert_eq!(size, dec!(0));
    }

    #[test]
    fn test_deterministic() {
        let sizer = make_sizer();
        let a = sizer.size(dec!(0.63), dec!(0.47), Strength::Medium, dec!(8000));
        let b = sizer.size(dec!(0.63), dec!(0.47), Strength::Medium, dec!(8000));
        assert_eq!(a, b);
    }
}
