//! Signal generation from model predictions

use rust_decimal::Decimal;
use tracing::debug;

use super::{Prediction, Side, Signal, Strength};
use crate::config::SignalConfig;

/// Strength thresholds on the absolute edge
const STRONG_EDGE: Decimal = Decimal::from_parts(15, 0, 0, false, 2); // 0.15
const MEDIUM_EDGE: Decimal = Decimal::from_parts(10, 0, 0, false, 2); // 0.10

/// Turns one prediction into zero or one signal
///
/// Pure and deterministic: identical inputs produce the same admission
/// decision, side, and strength. No external state is consulted or mutated.
pub struct SignalGenerator {
    config: SignalConfig,
}

impl SignalGenerator {
    /// Create a new generator
    pub fn new(config: SignalConfig) -> Self {
        Self { config }
    }

    /// Grade strength from the absolute edge
    pub fn grade(abs_edge: Decimal) -> Strength {
        if abs_edge > STRONG_EDGE {
            Strength::Strong
        } else if abs_edge > MEDIUM_EDGE {
            Strength::Medium
        } else {
            Strength::Weak
        }
    }

    /// Generate a signal if the prediction clears the admission gates
    ///
    /// `liquidity` is the market's dollar liquidity when the data source
    /// knows it. `None` means unknown and passes the gate: an upstream data
    /// gap must not reject a trade, and is distinct from a reported zero.
    ///
    /// Weak signals (edge at or below 0.10) are not worth acting on and are
    /// dropped here rather than persisted.
    pub fn generate(&self, prediction: &Prediction, liquidity: Option<Decimal>) -> Option<Signal> {
        let edge = prediction.edge();
        let side = if edge > Decimal::ZERO { Side::Yes } else { Side::No };
        let abs_edge = edge.abs();

        if abs_edge < self.config.min_edge {
            debug!(
                market_id = %prediction.market_id,
                edge = %edge,
                min = %self.config.min_edge,
                "Edge below threshold"
            );
            return None;
        }

        if prediction.confidence < self.config.min_confidence {
            debug!(
                market_id = %prediction.market_id,
                confidence = %prediction.confidence,
                min = %self.config.min_confidence,
                "Confidence below threshold"
            );
            return None;
        }

        if let Some(liq) = liquidity {
            if liq < self.config.min_liquidity {
                debug!(
                    market_id = %prediction.market_id,
                    liquidity = %liq,
                    min = %self.config.min_liquidity,
                    "Liquidity below threshold"
                );
                return None;
            }
        }

        let strength = Self::grade(abs_edge);
        if strength == Strength::Weak {
            debug!(
                market_id = %prediction.market_id,
                edge = %edge,
                "Weak signal dropped"
            );
            return None;
        }

        Some(Signal::new(
            prediction.market_id.clone(),
            side,
            strength,
            Decimal::ZERO, // filled in by the sizer before persistence
            prediction.id,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn make_prediction(probability: Decimal, market_price: Decimal, confidence: Decimal) -> Prediction {
        Prediction {
            id: Uuid::new_v4(),
            market_id: "mkt-1".to_string(),
            probability,
            market_price,
            confidence,
            model_version: "v1".to_string(),
            timestamp: Utc::now(),
        }
    }

    fn make_generator() -> SignalGenerator {
        SignalGenerator::new(SignalConfig::default())
    }

    #[test]
    fn test_edge_below_min_no_signal() {
        let gen = make_generator();
        // 4% edge, below the 5% minimum
        let p = make_prediction(dec!(0.54), dec!(0.50), dec!(0.9));
        assert!(gen.generate(&p, None).is_none());
    }

    #[test]
    fn test_low_confidence_no_signal() {
        let gen = make_generator();
        let p = make_prediction(dec!(0.70), dec!(0.50), dec!(0.50));
        assert!(gen.generate(&p, None).is_none());
    }

    #[test]
    fn test_negative_edge_gives_no_side() {
        let gen = make_generator();
        // Market at 70%, we think 50% -> Yes is overpriced, buy No
        let p = make_prediction(dec!(0.50), dec!(0.70), dec!(0.9));
        let signal = gen.generate(&p, None).unwrap();
        assert_eq!(signal.side, Side::No);
        assert_eq!(signal.strength, Strength::Strong);
    }

    #[test]
    fn test_strength_grading() {
        assert_eq!(SignalGenerator::grade(dec!(0.16)), Strength::Strong);
        assert_eq!(SignalGenerator::grade(dec!(0.15)), Strength::Medium);
        assert_eq!(SignalGenerator::grade(dec!(0.11)), Strength::Medium);
        assert_eq!(SignalGenerator::grade(dec!(0.10)), Strength::Weak);
        assert_eq!(SignalGenerator::grade(dec!(0.05)), Strength::Weak);
    }

    #[test]
    fn test_weak_signal_dropped() {
        let gen = make_generator();
        // 8% edge clears admission but grades Weak
        let p = make_prediction(dec!(0.58), dec!(0.50), dec!(0.9));
        assert!(gen.generate(&p, None).is_none());
    }

    #[test]
    fn test_unknown_liquidity_passes() {
        let gen = make_generator();
        let p = make_prediction(dec!(0.70), dec!(0.50), dec!(0.9));
        assert!(gen.generate(&p, None).is_some());
    }

    #[test]
    fn test_zero_liquidity_rejected() {
        let gen = make_generator();
        let p = make_prediction(dec!(0.70), dec!(0.50), dec!(0.9));
        // A reported zero is not "unknown" and fails the gate
        assert!(gen.generate(&p, Some(dec!(0))).is_none());
    }

    #[test]
    fn test_sufficient_liquidity_passes() {
        let gen = make_generator();
        let p = make_prediction(dec!(0.70), dec!(0.50), dec!(0.9));
        assert!(gen.generate(&p, Some(dec!(500))).is_some());
        assert!(gen.generate(&p, Some(dec!(499))).is_none());
    }

    #[test]
    fn test_deterministic_decision() {
        let gen = make_generator();
        let p = make_prediction(dec!(0.70), dec!(0.50), dec!(0.9));
        let a = gen.generate(&p, None).unwrap();
        let b = gen.generate(&p, None).unwrap();
        assert_eq!(a.side, b.side);
        assert_eq!(a.strength, b.strength);
        assert_eq!(a.prediction_id, b.prediction_id);
    }

    #[test]
    fn test_worked_scenario_strong_yes() {
        let gen = make_generator();
        // probability 0.8755 vs price 0.50 -> edge 0.3755, Strong Yes
        let p = make_prediction(dec!(0.8755), dec!(0.50), dec!(0.8755));
        let signal = gen.generate(&p, None).unwrap();
        assert_eq!(signal.side, Side::Yes);
        assert_eq!(signal.strength, Strength::Strong);
    }
}
