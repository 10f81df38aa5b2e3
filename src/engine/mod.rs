//! Trade decision engine
//!
//! Orchestrates prediction intake through signal generation, sizing, risk
//! admission, and trade commitment, with failure semantics split between
//! retryable store errors and fatal invariant violations.

mod batch;
mod processor;
mod types;

pub use batch::BatchRunner;
pub use processor::AutoProcessor;
pub use types::{EngineError, InvariantViolation, ProcessOutcome, ProcessReport, SkipReason};
