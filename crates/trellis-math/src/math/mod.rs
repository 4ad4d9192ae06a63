//! Core math modules.

pub mod mass;
pub mod stochastic;
