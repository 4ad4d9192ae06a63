//! Projection of beliefs past the evidence horizon.
//!
//! Prediction has no new observations to weigh in, so each step is a pure
//! transition `p' = p . T`. Projected beliefs decay toward the chain's
//! stationary distribution as the horizon recedes.

use crate::error::{EngineError, Result};
use crate::model::HiddenMarkovModel;

impl HiddenMarkovModel {
    /// Beliefs for the future times `horizon_end+1 ..= target`, one
    /// transition step at a time from the last filtered belief.
    ///
    /// `horizon_end` is the last observed time, `evidence.len() - 1`.
    /// `target` must fall strictly after it; anything else is not a
    /// prediction and is rejected with
    /// [`EngineError::InvalidFutureTimestamp`].
    pub fn predicted_beliefs(&self, evidence: &[usize], target: usize) -> Result<Vec<Vec<f64>>> {
        self.check_evidence(evidence)?;
        let horizon_end = evidence.len() - 1;
        if target <= horizon_end {
            return Err(EngineError::InvalidFutureTimestamp { target, horizon_end });
        }

        let filtered = self.filtered_beliefs(evidence)?;
        Ok(self.project_from(&filtered[horizon_end], target - horizon_end))
    }

    /// Roll a belief forward `steps` transitions, collecting each row.
    pub(crate) fn project_from(&self, seed: &[f64], steps: usize) -> Vec<Vec<f64>> {
        let mut rows = Vec::with_capacity(steps);
        let mut current = seed.to_vec();
        for _ in 0..steps {
            current = self.transition_step(&current);
            rows.push(current.clone());
        }
        rows
    }
}
