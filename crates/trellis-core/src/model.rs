//! Hidden Markov model storage and validation.
//!
//! Callers describe each distribution by its first n-1 entries; the final
//! entry is derived at construction as 1 minus the supplied mass. A model
//! that constructs successfully is fully materialized and immutable, so
//! every query can assume row-stochastic matrices without re-checking.

use serde::Serialize;
use tracing::debug;
use trellis_math::complete_row;

use crate::error::{EngineError, Result};

/// A validated discrete-state, discrete-observation hidden Markov model.
///
/// Owns three materialized components:
/// - `transition`: M x M row-stochastic matrix, `transition[s'][s]` is the
///   probability of moving from state `s'` to state `s` in one step
/// - `sensor`: M x E row-stochastic matrix, `sensor[s][e]` is the
///   probability of observing symbol `e` in state `s`
/// - `prior`: length-M distribution over the state at time 0
///
/// Queries take `&self`, allocate fresh result matrices, and never alias
/// the rows handed to the constructor.
#[derive(Debug, Clone, Serialize)]
pub struct HiddenMarkovModel {
    transition: Vec<Vec<f64>>,
    sensor: Vec<Vec<f64>>,
    prior: Vec<f64>,
}

impl HiddenMarkovModel {
    /// Build a model from partial rows.
    ///
    /// `transition_rows` must hold M rows of M-1 entries, `sensor_rows`
    /// M rows of E-1 entries (E is fixed by the first row), and
    /// `prior_row` M-1 entries. Each supplied entry must be finite and in
    /// [0, 1], and no partial row may carry more than unit mass. The first
    /// violation is returned as the error for the offending component.
    pub fn new(
        transition_rows: &[Vec<f64>],
        sensor_rows: &[Vec<f64>],
        prior_row: &[f64],
    ) -> Result<Self> {
        let num_states = transition_rows.len();
        if num_states == 0 {
            return Err(EngineError::InvalidTransitionModel {
                reason: "at least one state is required".to_string(),
            });
        }

        let mut transition = Vec::with_capacity(num_states);
        for (index, row) in transition_rows.iter().enumerate() {
            if row.len() != num_states - 1 {
                return Err(EngineError::InvalidTransitionModel {
                    reason: format!(
                        "row {index} has {} entries, expected {} for {num_states} states",
                        row.len(),
                        num_states - 1
                    ),
                });
            }
            let completed =
                complete_row(row).map_err(|defect| EngineError::InvalidTransitionModel {
                    reason: format!("row {index}: {defect}"),
                })?;
            transition.push(completed);
        }

        if sensor_rows.len() != num_states {
            return Err(EngineError::InvalidSensorModel {
                reason: format!("{} rows for {num_states} states", sensor_rows.len()),
            });
        }
        let partial_width = sensor_rows[0].len();
        let mut sensor = Vec::with_capacity(num_states);
        for (index, row) in sensor_rows.iter().enumerate() {
            if row.len() != partial_width {
                return Err(EngineError::InvalidSensorModel {
                    reason: format!(
                        "row {index} has {} entries, expected {partial_width}",
                        row.len()
                    ),
                });
            }
            let completed =
                complete_row(row).map_err(|defect| EngineError::InvalidSensorModel {
                    reason: format!("row {index}: {defect}"),
                })?;
            sensor.push(completed);
        }

        if prior_row.len() != num_states - 1 {
            return Err(EngineError::InvalidPrior {
                reason: format!(
                    "{} entries, expected {} for {num_states} states",
                    prior_row.len(),
                    num_states - 1
                ),
            });
        }
        let prior = complete_row(prior_row)
            .map_err(|defect| EngineError::InvalidPrior {
                reason: defect.to_string(),
            })?;

        debug!(
            states = num_states,
            symbols = partial_width + 1,
            "hidden markov model constructed"
        );

        Ok(Self {
            transition,
            sensor,
            prior,
        })
    }

    /// Number of hidden states M.
    pub fn num_states(&self) -> usize {
        self.transition.len()
    }

    /// Number of observable symbols E.
    pub fn num_symbols(&self) -> usize {
        self.sensor[0].len()
    }

    /// The materialized M x M transition matrix.
    pub fn transition(&self) -> &[Vec<f64>] {
        &self.transition
    }

    /// The materialized M x E sensor matrix.
    pub fn sensor(&self) -> &[Vec<f64>] {
        &self.sensor
    }

    /// The materialized length-M prior.
    pub fn prior(&self) -> &[f64] {
        &self.prior
    }

    /// Reject evidence an operation cannot interpret: an empty sequence
    /// has no horizon, and every symbol must fall inside 0..E.
    pub(crate) fn check_evidence(&self, evidence: &[usize]) -> Result<()> {
        if evidence.is_empty() {
            return Err(EngineError::InvalidEvidence {
                sequence: Vec::new(),
                reason: "evidence sequence is empty".to_string(),
            });
        }
        let num_symbols = self.num_symbols();
        for (time, &symbol) in evidence.iter().enumerate() {
            if symbol >= num_symbols {
                return Err(EngineError::InvalidEvidence {
                    sequence: evidence.to_vec(),
                    reason: format!(
                        "symbol {symbol} at time {time} is outside 0..{num_symbols}"
                    ),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::weather_model;
    use trellis_math::is_unit_mass;

    #[test]
    fn construction_derives_final_entries() {
        let model = weather_model();
        assert_eq!(model.num_states(), 2);
        assert_eq!(model.num_symbols(), 2);

        assert!((model.transition()[0][1] - 0.3).abs() < 1e-12);
        assert!((model.transition()[1][1] - 0.7).abs() < 1e-12);
        assert!((model.sensor()[0][1] - 0.1).abs() < 1e-12);
        assert!((model.sensor()[1][1] - 0.8).abs() < 1e-12);
        assert!((model.prior()[1] - 0.5).abs() < 1e-12);

        for row in model.transition() {
            assert!(is_unit_mass(row));
        }
        for row in model.sensor() {
            assert!(is_unit_mass(row));
        }
        assert!(is_unit_mass(model.prior()));
    }

    #[test]
    fn single_state_model_is_all_derived() {
        // M = 1: every partial row is empty except the sensor row.
        let model =
            HiddenMarkovModel::new(&[vec![]], &[vec![0.3]], &[]).unwrap();
        assert_eq!(model.num_states(), 1);
        assert_eq!(model.num_symbols(), 2);
        assert_eq!(model.transition()[0], vec![1.0]);
        assert_eq!(model.prior(), &[1.0]);
        assert!((model.sensor()[0][1] - 0.7).abs() < 1e-12);
    }

    #[test]
    fn zero_states_rejected() {
        let result = HiddenMarkovModel::new(&[], &[], &[]);
        assert!(matches!(
            result,
            Err(EngineError::InvalidTransitionModel { .. })
        ));
    }

    #[test]
    fn transition_shape_violations() {
        // Row 1 has too many entries for a 2-state model.
        let result = HiddenMarkovModel::new(
            &[vec![0.7], vec![0.3, 0.1]],
            &[vec![0.9], vec![0.2]],
            &[0.5],
        );
        match result {
            Err(EngineError::InvalidTransitionModel { reason }) => {
                assert!(reason.contains("row 1"));
            }
            other => panic!("expected transition error, got {other:?}"),
        }
    }

    #[test]
    fn transition_excess_mass_rejected() {
        let result = HiddenMarkovModel::new(
            &[vec![0.7, 0.6], vec![0.1, 0.1], vec![0.2, 0.2]],
            &[vec![0.5], vec![0.5], vec![0.5]],
            &[0.3, 0.3],
        );
        match result {
            Err(EngineError::InvalidTransitionModel { reason }) => {
                assert!(reason.contains("row 0"));
                assert!(reason.contains("sum"));
            }
            other => panic!("expected transition error, got {other:?}"),
        }
    }

    #[test]
    fn sensor_row_count_and_width_checked() {
        let result = HiddenMarkovModel::new(
            &[vec![0.7], vec![0.3]],
            &[vec![0.9]],
            &[0.5],
        );
        assert!(matches!(result, Err(EngineError::InvalidSensorModel { .. })));

        let result = HiddenMarkovModel::new(
            &[vec![0.7], vec![0.3]],
            &[vec![0.9], vec![0.2, 0.1]],
            &[0.5],
        );
        match result {
            Err(EngineError::InvalidSensorModel { reason }) => {
                assert!(reason.contains("row 1"));
            }
            other => panic!("expected sensor error, got {other:?}"),
        }
    }

    #[test]
    fn out_of_range_cells_rejected() {
        let result = HiddenMarkovModel::new(
            &[vec![0.7], vec![0.3]],
            &[vec![1.2], vec![0.2]],
            &[0.5],
        );
        match result {
            Err(EngineError::InvalidSensorModel { reason }) => {
                assert!(reason.contains("outside [0, 1]"));
            }
            other => panic!("expected sensor error, got {other:?}"),
        }

        let result = HiddenMarkovModel::new(
            &[vec![f64::NAN], vec![0.3]],
            &[vec![0.9], vec![0.2]],
            &[0.5],
        );
        assert!(matches!(
            result,
            Err(EngineError::InvalidTransitionModel { .. })
        ));
    }

    #[test]
    fn prior_violations() {
        let result = HiddenMarkovModel::new(
            &[vec![0.7], vec![0.3]],
            &[vec![0.9], vec![0.2]],
            &[0.5, 0.4],
        );
        assert!(matches!(result, Err(EngineError::InvalidPrior { .. })));

        let result = HiddenMarkovModel::new(
            &[vec![0.7], vec![0.3]],
            &[vec![0.9], vec![0.2]],
            &[1.5],
        );
        assert!(matches!(result, Err(EngineError::InvalidPrior { .. })));
    }

    #[test]
    fn evidence_checks() {
        let model = weather_model();

        assert!(matches!(
            model.check_evidence(&[]),
            Err(EngineError::InvalidEvidence { .. })
        ));

        match model.check_evidence(&[0, 2, 1]) {
            Err(EngineError::InvalidEvidence { sequence, reason }) => {
                assert_eq!(sequence, vec![0, 2, 1]);
                assert!(reason.contains("symbol 2 at time 1"));
            }
            other => panic!("expected evidence error, got {other:?}"),
        }

        assert!(model.check_evidence(&[0, 1, 0]).is_ok());
    }

    #[test]
    fn serializes_materialized_rows() {
        let model = weather_model();
        let json = serde_json::to_value(&model).unwrap();

        // Supplied entries survive verbatim; derived entries are close to
        // the remainder but not bit-exact (1.0 - 0.7 in f64).
        assert_eq!(json["transition"][0][0], 0.7);
        assert_eq!(json["prior"][0], 0.5);
        let derived = json["transition"][0][1].as_f64().unwrap();
        assert!((derived - 0.3).abs() < 1e-12);
        assert_eq!(json["sensor"][1].as_array().unwrap().len(), 2);
    }
}
