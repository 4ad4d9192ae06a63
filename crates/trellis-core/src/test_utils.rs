//! Test utilities for trellis-core.
//!
//! Shared model fixtures and floating point assertions used by the unit
//! test modules and, behind the `test-utils` feature, by downstream crates.

use crate::model::HiddenMarkovModel;

/// Assert that two floating point numbers are approximately equal.
#[macro_export]
macro_rules! assert_approx_eq {
    ($a:expr, $b:expr) => {
        $crate::assert_approx_eq!($a, $b, 1e-9_f64)
    };
    ($a:expr, $b:expr, $epsilon:expr) => {{
        let a: f64 = $a;
        let b: f64 = $b;
        let eps: f64 = $epsilon;
        let diff = (a - b).abs();
        if diff > eps {
            panic!(
                "assertion failed: `(left ~= right)` (left: `{}`, right: `{}`, diff: `{}`, epsilon: `{}`)",
                a, b, diff, eps
            );
        }
    }};
}

/// Assert that two belief tables agree row by row within `epsilon`.
pub fn assert_rows_close(actual: &[Vec<f64>], expected: &[Vec<f64>], epsilon: f64) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "row count mismatch: {} vs {}",
        actual.len(),
        expected.len()
    );
    for (row_idx, (got, want)) in actual.iter().zip(expected).enumerate() {
        assert_eq!(got.len(), want.len(), "row {row_idx} width mismatch");
        for (col_idx, (g, w)) in got.iter().zip(want).enumerate() {
            let diff = (g - w).abs();
            assert!(
                diff <= epsilon,
                "row {row_idx} col {col_idx}: {g} vs {w} (diff {diff})"
            );
        }
    }
}

/// The textbook two-state weather model: state 0 rain, state 1 dry,
/// symbol 0 umbrella, symbol 1 no umbrella.
pub fn weather_model() -> HiddenMarkovModel {
    HiddenMarkovModel::new(&[vec![0.7], vec![0.3]], &[vec![0.9], vec![0.2]], &[0.5])
        .expect("weather fixture is a valid model")
}

/// A lopsided three-state, two-symbol model. Exercises rectangular sensor
/// shapes and rows with no symmetry to hide indexing mistakes behind.
pub fn three_state_chain() -> HiddenMarkovModel {
    HiddenMarkovModel::new(
        &[vec![0.6, 0.3], vec![0.1, 0.7], vec![0.2, 0.2]],
        &[vec![0.8], vec![0.5], vec![0.1]],
        &[0.5, 0.3],
    )
    .expect("chain fixture is a valid model")
}
