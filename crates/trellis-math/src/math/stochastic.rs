//! Partial stochastic-row validation and completion.
//!
//! A caller describes a distribution over n outcomes by supplying only its
//! first n-1 entries; the final entry is derived as 1 minus the supplied
//! mass. Validation and derivation are split so that callers can report a
//! defect before any allocation happens:
//! - [`check_partial_row`] rejects rows that cannot be completed
//! - [`complete_row`] appends the derived final entry to a checked row

use super::mass::{mass, MASS_TOLERANCE};
use thiserror::Error;

/// Reason a supplied partial row cannot describe a distribution.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RowDefect {
    #[error("entry {index} is not a finite number")]
    NonFinite { index: usize },

    #[error("entry {index} is {value}, outside [0, 1]")]
    OutOfRange { index: usize, value: f64 },

    #[error("entries sum to {sum}, leaving no mass for the derived final entry")]
    ExcessMass { sum: f64 },
}

/// Check that a partial row can be completed into a distribution.
///
/// Every entry must be finite and within [0, 1], and the total supplied
/// mass must not exceed 1.0 beyond [`MASS_TOLERANCE`]. The empty row is
/// valid: it describes a single-outcome distribution whose only entry is
/// derived.
pub fn check_partial_row(row: &[f64]) -> Result<(), RowDefect> {
    for (index, &value) in row.iter().enumerate() {
        if !value.is_finite() {
            return Err(RowDefect::NonFinite { index });
        }
        if !(0.0..=1.0).contains(&value) {
            return Err(RowDefect::OutOfRange { index, value });
        }
    }
    let sum = mass(row);
    if sum > 1.0 + MASS_TOLERANCE {
        return Err(RowDefect::ExcessMass { sum });
    }
    Ok(())
}

/// Complete a partial row by appending the derived final entry.
///
/// The appended entry is `1 - mass(row)`, clamped at 0.0 so a row whose
/// supplied mass sits within tolerance above 1.0 still completes cleanly.
pub fn complete_row(row: &[f64]) -> Result<Vec<f64>, RowDefect> {
    check_partial_row(row)?;
    let mut completed = Vec::with_capacity(row.len() + 1);
    completed.extend_from_slice(row);
    completed.push((1.0 - mass(row)).max(0.0));
    Ok(completed)
}
