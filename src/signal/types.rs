//! Signal types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::risk::DenialReason;

/// Trading side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Buy Yes tokens
    Yes,
    /// Buy No tokens
    No,
}

/// Signal strength, graded from the absolute edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strength {
    Weak,
    Medium,
    Strong,
}

/// A probability estimate for one market, produced by the model collaborator
///
/// Input-only: the engine validates numeric ranges at ingress but never
/// mutates a prediction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    /// Unique prediction identifier
    pub id: Uuid,
    /// Market this prediction is about
    pub market_id: String,
    /// Estimated probability of the Yes outcome
    pub probability: Decimal,
    /// Current market price of the Yes outcome
    pub market_price: Decimal,
    /// Model confidence in the estimate
    pub confidence: Decimal,
    /// Version of the model that produced it
    pub model_version: String,
    /// When the prediction was made
    pub timestamp: DateTime<Utc>,
}

/// Malformed prediction, rejected at ingress and never retried
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("probability {0} outside [0, 1]")]
    ProbabilityOutOfRange(Decimal),
    #[error("market price {0} outside [0, 1]")]
    PriceOutOfRange(Decimal),
    #[error("confidence {0} outside [0, 1]")]
    ConfidenceOutOfRange(Decimal),
    #[error("empty market id")]
    EmptyMarketId,
}

impl Prediction {
    /// Validate numeric ranges
    ///
    /// Model correctness is not checked here, only that the fields are
    /// well-formed probabilities.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.market_id.is_empty() {
            return Err(ValidationError::EmptyMarketId);
        }
        if self.probability < Decimal::ZERO || self.probability > Decimal::ONE {
            return Err(ValidationError::ProbabilityOutOfRange(self.probability));
        }
        if self.market_price < Decimal::ZERO || self.market_price > Decimal::ONE {
            return Err(ValidationError::PriceOutOfRange(self.market_price));
        }
        if self.confidence < Decimal::ZERO || self.confidence > Decimal::ONE {
            return Err(ValidationError::ConfidenceOutOfRange(self.confidence));
        }
        Ok(())
    }

    /// Signed edge for the Yes side
    pub fn edge(&self) -> Decimal {
        self.probability - self.market_price
    }
}

/// A trading recommendation derived from one prediction, not yet a trade
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    /// Unique signal identifier
    pub id: Uuid,
    /// Associated market
    pub market_id: String,
    /// Trade direction
    pub side: Side,
    /// Strength grade from the absolute edge
    pub strength: Strength,
    /// Sizer-suggested dollar amount
    pub suggested_size: Decimal,
    /// Prediction this signal came from
    pub prediction_id: Uuid,
    /// Whether the signal has been converted to a trade
    ///
    /// Flips false to true exactly once, never reverts. A denied signal
    /// stays unexecuted permanently.
    pub executed: bool,
    /// Recorded risk denial, if the trade was refused
    ///
    /// Distinguishes a final denial from a signal stranded by a failed
    /// commit: unexecuted and undenied means the conversion is still owed.
    #[serde(default)]
    pub denial: Option<DenialReason>,
    /// Signal creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Signal {
    /// Create a new unexecuted signal
    pub fn new(
        market_id: String,
        side: Side,
        strength: Strength,
        suggested_size: Decimal,
        prediction_id: Uuid,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            market_id,
            side,
            strength,
            suggested_size,
            prediction_id,
            executed: false,
            denial: None,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

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

    #[test]
    fn test_valid_prediction() {
        let p = make_prediction(dec!(0.6), dec!(0.5), dec!(0.8));
        assert!(p.validate().is_ok());
        assert_eq!(p.edge(), dec!(0.1));
    }

    #[test]
    fn test_probability_out_of_range() {
        let p = make_prediction(dec!(1.2), dec!(0.5), dec!(0.8));
        assert_eq!(
            p.validate(),
            Err(ValidationError::ProbabilityOutOfRange(dec!(1.2)))
        );
    }

    #[test]
    fn test_price_out_of_range() {
        let p = make_prediction(dec!(0.6), dec!(-0.1), dec!(0.8));
        assert_eq!(p.validate(), Err(ValidationError::PriceOutOfRange(dec!(-0.1))));
    }

    #[test]
    fn test_confidence_out_of_range() {
        let p = make_prediction(dec!(0.6), dec!(0.5), dec!(1.5));
        assert_eq!(
            p.validate(),
            Err(ValidationError::ConfidenceOutOfRange(dec!(1.5)))
        );
    }

    #[test]
    fn test_empty_market_id() {
        let mut p = make_prediction(dec!(0.6), dec!(0.5), dec!(0.8));
        p.market_id = String::new();
        assert_eq!(p.validate(), Err(ValidationError::EmptyMarketId));
    }

    #[test]
    fn test_boundary_values_valid() {
        let p = make_prediction(dec!(0), dec!(1), dec!(0));
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_strength_ordering() {
        assert!(Strength::Strong > Strength::Medium);
        assert!(Strength::Medium > Strength::Weak);
    }

    #[test]
    fn test_new_signal_unexecuted() {
        let signal = Signal::new(
            "mkt-1".to_string(),
            Side::Yes,
            Strength::Strong,
            dec!(100),
            Uuid::new_v4(),
        );
        assert!(!signal.executed);
        assert_eq!(signal.market_id, "mkt-1");
    }
}
