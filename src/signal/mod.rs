//! Signal generation
//!
//! Prediction ingress validation and signal admission

mod generator;
mod types;

pub use generator::SignalGenerator;
pub use types::{Prediction, Side, Signal, Strength, ValidationError};
