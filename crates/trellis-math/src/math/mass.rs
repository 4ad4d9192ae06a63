//! Probability-mass helpers for belief vectors and stochastic rows.

/// Tolerance for treating a row's mass as exactly 1.0.
pub const MASS_TOLERANCE: f64 = 1e-9;

/// Total mass of a vector (plain sum).
pub fn mass(values: &[f64]) -> f64 {
    values.iter().sum()
}

/// True when the vector's mass is 1.0 within [`MASS_TOLERANCE`].
pub fn is_unit_mass(values: &[f64]) -> bool {
    (mass(values) - 1.0).abs() <= MASS_TOLERANCE
}

/// Scale a vector so its mass becomes 1.0, returning the pre-scaling mass.
///
/// A zero-mass vector is left untouched: every entry stays 0.0 and the
/// caller can tell from the returned mass that no distribution exists.
pub fn normalize_in_place(values: &mut [f64]) -> f64 {
    let total = mass(values);
    if total > 0.0 {
        for v in values.iter_mut() {
            *v /= total;
        }
    }
    total
}

/// Normalized copy of a vector. Zero-mass input yields an all-zero copy.
pub fn normalized(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    normalize_in_place(&mut out);
    out
}

/// Shannon entropy of a distribution, in nats. Zero entries contribute 0.
pub fn entropy(probs: &[f64]) -> f64 {
    probs
        .iter()
        .map(|&p| if p > 0.0 { -p * p.ln() } else { 0.0 })
        .sum()
}

/// Index of the largest entry, first index on ties. None for empty input.
pub fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (idx, &v) in values.iter().enumerate() {
        let replace = match best {
            None => true,
            Some(b) => v > values[b],
        };
        if replace {
            best = Some(idx);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        if a.is_nan() || b.is_nan() {
            return false;
        }
        (a - b).abs() <= tol
    }

    #[test]
    fn mass_sums_entries() {
        assert!(approx_eq(mass(&[0.25, 0.5, 0.125]), 0.875, 1e-12));
        assert_eq!(mass(&[]), 0.0);
    }

    #[test]
    fn unit_mass_within_tolerance() {
        assert!(is_unit_mass(&[0.5, 0.5]));
        assert!(is_unit_mass(&[0.5, 0.5 + 1e-10]));
        assert!(!is_unit_mass(&[0.5, 0.6]));
    }

    #[test]
    fn normalize_reports_prior_mass() {
        let mut v = [0.2, 0.6];
        let total = normalize_in_place(&mut v);
        assert!(approx_eq(total, 0.8, 1e-12));
        assert!(is_unit_mass(&v));
        assert!(approx_eq(v[0], 0.25, 1e-12));
    }

    #[test]
    fn normalize_zero_mass_left_untouched() {
        let mut v = [0.0, 0.0, 0.0];
        let total = normalize_in_place(&mut v);
        assert_eq!(total, 0.0);
        assert!(v.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn normalized_copies() {
        let v = [1.0, 3.0];
        let out = normalized(&v);
        assert!(approx_eq(out[0], 0.25, 1e-12));
        assert!(approx_eq(out[1], 0.75, 1e-12));
        assert_eq!(v[0], 1.0);
    }

    #[test]
    fn entropy_uniform_is_maximal() {
        let uniform = [0.25; 4];
        assert!(approx_eq(entropy(&uniform), 4.0f64.ln(), 1e-12));

        let skewed = [0.7, 0.1, 0.1, 0.1];
        assert!(entropy(&skewed) < entropy(&uniform));
    }

    #[test]
    fn entropy_point_mass_is_zero() {
        assert!(approx_eq(entropy(&[0.0, 1.0, 0.0]), 0.0, 1e-12));
    }

    #[test]
    fn argmax_prefers_first_on_tie() {
        assert_eq!(argmax(&[0.1, 0.4, 0.4, 0.1]), Some(1));
        assert_eq!(argmax(&[0.9]), Some(0));
        assert_eq!(argmax(&[]), None);
    }
}
