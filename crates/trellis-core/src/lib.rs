//! Trellis core library.
//!
//! Exact inference over discrete hidden Markov models:
//! - Model storage and validation (derive-the-last-entry row convention)
//! - Forward recursion: joint likelihoods, sequence likelihoods, filtering
//! - Prediction of future state beliefs
//! - Backward recursion and smoothing
//! - Unified range queries spanning past, present, and future times

pub mod error;
pub mod model;

mod backward;
mod forward;
mod predict;
mod query;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use error::{EngineError, Result};
pub use model::HiddenMarkovModel;
