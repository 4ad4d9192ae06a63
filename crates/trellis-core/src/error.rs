//! Error types for model construction and queries.

use thiserror::Error;

/// Error types for engine operations.
///
/// Construction errors name the model component that failed; query errors
/// carry the inputs that made the request unanswerable. Every operation
/// validates its own preconditions and surfaces the first violation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("invalid transition model: {reason}")]
    InvalidTransitionModel { reason: String },

    #[error("invalid sensor model: {reason}")]
    InvalidSensorModel { reason: String },

    #[error("invalid prior: {reason}")]
    InvalidPrior { reason: String },

    #[error("invalid evidence sequence {sequence:?}: {reason}")]
    InvalidEvidence { sequence: Vec<usize>, reason: String },

    #[error("timestamp {target} is not in the future: evidence already covers times 0..={horizon_end}")]
    InvalidFutureTimestamp { target: usize, horizon_end: usize },

    #[error("timestamp {earliest} has no later evidence to smooth with: the horizon ends at {horizon_end}")]
    InvalidPastTimestamp { earliest: usize, horizon_end: usize },

    #[error("invalid range: from {from} exceeds to {to}")]
    InvalidRange { from: usize, to: usize },
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
