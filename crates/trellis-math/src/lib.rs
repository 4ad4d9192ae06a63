//! Trellis math utilities.

pub mod math;

pub use math::mass::*;
pub use math::stochastic::*;
