//! End-to-end scenarios for the inference engine.
//!
//! The textbook umbrella world provides hand-checkable numbers; an
//! exhaustive path-enumeration reference cross-checks every recursion on
//! models small enough that summing all O(M^n) hidden-state paths is
//! affordable.

use trellis_core::HiddenMarkovModel;

/// Two states (rain, dry), two symbols (umbrella, none).
fn umbrella_world() -> HiddenMarkovModel {
    HiddenMarkovModel::new(&[vec![0.7], vec![0.3]], &[vec![0.9], vec![0.2]], &[0.5]).unwrap()
}

fn three_state() -> HiddenMarkovModel {
    HiddenMarkovModel::new(
        &[vec![0.6, 0.3], vec![0.1, 0.7], vec![0.2, 0.2]],
        &[vec![0.8], vec![0.5], vec![0.1]],
        &[0.5, 0.3],
    )
    .unwrap()
}

// ============================================================================
// Path-enumeration reference
// ============================================================================

/// Weight of one hidden-state path. Sensor factors apply only to observed
/// times, so the same enumeration serves smoothing and prediction.
fn path_weight(model: &HiddenMarkovModel, path: &[usize], evidence: &[usize]) -> f64 {
    let mut weight = model.prior()[path[0]];
    if let Some(&symbol) = evidence.first() {
        weight *= model.sensor()[path[0]][symbol];
    }
    for time in 1..path.len() {
        weight *= model.transition()[path[time - 1]][path[time]];
        if let Some(&symbol) = evidence.get(time) {
            weight *= model.sensor()[path[time]][symbol];
        }
    }
    weight
}

/// `P(X_target = s, evidence)` by summing over all state paths of length
/// `path_len`.
fn enumerate_marginal(
    model: &HiddenMarkovModel,
    evidence: &[usize],
    path_len: usize,
    target: usize,
) -> Vec<f64> {
    let num_states = model.num_states();
    let mut marginal = vec![0.0; num_states];
    for mut code in 0..num_states.pow(path_len as u32) {
        let mut path = Vec::with_capacity(path_len);
        for _ in 0..path_len {
            path.push(code % num_states);
            code /= num_states;
        }
        marginal[path[target]] += path_weight(model, &path, evidence);
    }
    marginal
}

fn normalized(mut row: Vec<f64>) -> Vec<f64> {
    let total: f64 = row.iter().sum();
    if total > 0.0 {
        for value in &mut row {
            *value /= total;
        }
    }
    row
}

fn assert_row_close(actual: &[f64], expected: &[f64], tolerance: f64) {
    assert_eq!(actual.len(), expected.len());
    for (state, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!(
            (a - e).abs() <= tolerance,
            "state {state}: {a} vs {e}"
        );
    }
}

// ============================================================================
// Textbook numbers
// ============================================================================

mod textbook_tests {
    use super::*;

    #[test]
    fn filtering_two_umbrella_days() {
        let model = umbrella_world();
        let filtered = model.filtered_beliefs(&[0, 0]).unwrap();

        assert_row_close(&filtered[0], &[0.818, 0.182], 1e-3);
        assert_row_close(&filtered[1], &[0.883, 0.117], 1e-3);
    }

    #[test]
    fn smoothing_the_first_umbrella_day() {
        let model = umbrella_world();
        let smoothed = model.smoothed_beliefs(&[0, 0], 0).unwrap();

        assert_eq!(smoothed.len(), 1);
        assert_row_close(&smoothed[0], &[0.883, 0.117], 1e-3);
    }

    #[test]
    fn likelihood_of_two_umbrella_days() {
        let model = umbrella_world();
        let likelihoods = model.sequence_likelihoods(&[0, 0]).unwrap();

        assert!((likelihoods[0] - 0.55).abs() < 1e-9);
        assert!((likelihoods[1] - 0.3515).abs() < 1e-9);
    }

    #[test]
    fn longer_sequences_keep_degrading_likelihood() {
        let model = umbrella_world();
        let likelihoods = model.sequence_likelihoods(&[0, 0, 1, 0, 1]).unwrap();

        for pair in likelihoods.windows(2) {
            assert!(pair[1] <= pair[0]);
        }
    }
}

// ============================================================================
// Exhaustive cross-checks
// ============================================================================

mod enumeration_tests {
    use super::*;

    #[test]
    fn joint_likelihoods_match_enumeration() {
        let model = three_state();
        let evidence = [0, 1, 1, 0];
        let joint = model.joint_likelihoods(&evidence).unwrap();

        for (time, row) in joint.iter().enumerate() {
            let reference = enumerate_marginal(&model, &evidence[..=time], time + 1, time);
            assert_row_close(row, &reference, 1e-12);
        }
    }

    #[test]
    fn smoothed_beliefs_match_enumeration() {
        let model = three_state();
        let evidence = [0, 1, 1, 0];
        let smoothed = model.smoothed_beliefs(&evidence, 0).unwrap();

        for (time, row) in smoothed.iter().enumerate() {
            let reference =
                normalized(enumerate_marginal(&model, &evidence, evidence.len(), time));
            assert_row_close(row, &reference, 1e-12);
        }
    }

    #[test]
    fn predicted_beliefs_match_enumeration() {
        let model = umbrella_world();
        let evidence = [0, 1, 0];
        let predicted = model.predicted_beliefs(&evidence, 5).unwrap();

        for (step, row) in predicted.iter().enumerate() {
            let target = evidence.len() + step;
            let reference =
                normalized(enumerate_marginal(&model, &evidence, target + 1, target));
            assert_row_close(row, &reference, 1e-12);
        }
    }

    #[test]
    fn straddling_query_matches_enumeration() {
        let model = umbrella_world();
        let evidence = [0, 0, 1];
        let rows = model.query(&evidence, 0, 4).unwrap();

        assert_eq!(rows.len(), 5);
        for (time, row) in rows.iter().enumerate() {
            let path_len = (time + 1).max(evidence.len());
            let reference = normalized(enumerate_marginal(&model, &evidence, path_len, time));
            assert_row_close(row, &reference, 1e-12);
        }
    }
}

// ============================================================================
// Boundary shapes
// ============================================================================

mod boundary_tests {
    use super::*;

    #[test]
    fn single_state_model_is_always_certain() {
        let model = HiddenMarkovModel::new(&[vec![]], &[vec![0.4]], &[]).unwrap();
        let rows = model.query(&[0, 1, 0], 0, 5).unwrap();

        assert_eq!(rows.len(), 6);
        for row in &rows {
            assert_eq!(row.len(), 1);
            assert!((row[0] - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn impossible_evidence_stays_zero_through_query() {
        // All sensor mass sits on symbol 0; observing symbol 1 zeroes the
        // trellis and the zeros must survive smoothing and prediction.
        let model =
            HiddenMarkovModel::new(&[vec![0.5], vec![0.5]], &[vec![1.0], vec![1.0]], &[0.5])
                .unwrap();
        let rows = model.query(&[0, 1], 0, 3).unwrap();

        assert_eq!(rows.len(), 4);
        for row in &rows[1..] {
            assert_eq!(row, &vec![0.0, 0.0]);
        }
        for row in &rows {
            assert!(row.iter().all(|value| value.is_finite()));
        }
    }

    #[test]
    fn single_observation_supports_present_and_future() {
        let model = umbrella_world();

        let present = model.query(&[0], 0, 0).unwrap();
        assert_eq!(present.len(), 1);
        assert_row_close(&present[0], &[0.45 / 0.55, 0.10 / 0.55], 1e-9);

        let span = model.query(&[0], 0, 3).unwrap();
        assert_eq!(span.len(), 4);
    }
}
