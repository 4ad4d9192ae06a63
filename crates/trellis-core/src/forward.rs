//! Forward recursion over the evidence trellis.
//!
//! The unnormalized recursion accumulates joint likelihoods:
//!
//! ```text
//! L[0][s] = prior[s] * sensor[s][e_0]
//! L[t][s] = (sum over s' of L[t-1][s'] * transition[s'][s]) * sensor[s][e_t]
//! ```
//!
//! Filtering runs the same recurrence but renormalizes every row, turning
//! accumulated mass into a posterior over states given the evidence so far.

use trellis_math::{mass, normalize_in_place};

use crate::error::{EngineError, Result};
use crate::model::HiddenMarkovModel;

impl HiddenMarkovModel {
    /// Unnormalized forward likelihoods for every prefix of `evidence`.
    ///
    /// Row `t` holds `P(e_0..=e_t, X_t = s)` for each state `s`, in
    /// increasing time order. Row masses shrink geometrically with sequence
    /// length; long sequences are better served by [`Self::filtered_beliefs`].
    pub fn joint_likelihoods(&self, evidence: &[usize]) -> Result<Vec<Vec<f64>>> {
        self.check_evidence(evidence)?;

        let mut rows = Vec::with_capacity(evidence.len());
        let mut current = self.weighted_prior(evidence[0]);
        for &symbol in &evidence[1..] {
            let mut next = self.transition_step(&current);
            self.weight_by_sensor(&mut next, symbol);
            rows.push(current);
            current = next;
        }
        rows.push(current);
        Ok(rows)
    }

    /// Likelihood of each evidence prefix: `P(e_0..=e_t)` for every `t`.
    ///
    /// Entry `t` is the total mass of forward row `t`, so the returned
    /// values are non-increasing in `t`.
    pub fn sequence_likelihoods(&self, evidence: &[usize]) -> Result<Vec<f64>> {
        let joint = self.joint_likelihoods(evidence)?;
        Ok(joint.iter().map(|row| mass(row)).collect())
    }

    /// Filtered state beliefs for every prefix of `evidence`.
    ///
    /// Row `t` is `P(X_t = s | e_0..=e_t)`. A row whose unnormalized mass
    /// is zero (the prefix is impossible under the model) is returned
    /// all-zero rather than rescaled into a fake distribution.
    pub fn filtered_beliefs(&self, evidence: &[usize]) -> Result<Vec<Vec<f64>>> {
        self.check_evidence(evidence)?;

        let mut rows = Vec::with_capacity(evidence.len());
        let mut current = self.weighted_prior(evidence[0]);
        normalize_in_place(&mut current);
        for &symbol in &evidence[1..] {
            let next = self.filter_step(&current, symbol)?;
            rows.push(current);
            current = next;
        }
        rows.push(current);
        Ok(rows)
    }

    /// Advance a filtered belief by one observation.
    ///
    /// `belief` must be a length-M row, typically the last row returned by
    /// [`Self::filtered_beliefs`]. The result is renormalized unless its
    /// mass is zero. Renormalization commutes through the recurrence, so
    /// folding this step over a sequence reproduces the batch filter.
    ///
    /// A wrong-length `belief` fails with [`EngineError::InvalidPrior`]
    /// naming the belief row: the step treats the row as its prior.
    pub fn filter_step(&self, belief: &[f64], symbol: usize) -> Result<Vec<f64>> {
        if belief.len() != self.num_states() {
            return Err(EngineError::InvalidPrior {
                reason: format!(
                    "belief row length {} does not match the model's {} states",
                    belief.len(),
                    self.num_states()
                ),
            });
        }
        let num_symbols = self.num_symbols();
        if symbol >= num_symbols {
            return Err(EngineError::InvalidEvidence {
                sequence: vec![symbol],
                reason: format!("symbol {symbol} is outside 0..{num_symbols}"),
            });
        }

        let mut next = self.transition_step(belief);
        self.weight_by_sensor(&mut next, symbol);
        normalize_in_place(&mut next);
        Ok(next)
    }

    /// One step of the transition model: `out[s] = sum_{s'} row[s'] * T[s'][s]`.
    pub(crate) fn transition_step(&self, row: &[f64]) -> Vec<f64> {
        let transition = self.transition();
        let mut next = vec![0.0; self.num_states()];
        for (prev_state, &weight) in row.iter().enumerate() {
            for (next_state, cell) in next.iter_mut().enumerate() {
                *cell += weight * transition[prev_state][next_state];
            }
        }
        next
    }

    /// Prior weighted by the sensor likelihood of the first symbol.
    fn weighted_prior(&self, symbol: usize) -> Vec<f64> {
        self.prior()
            .iter()
            .zip(self.sensor())
            .map(|(weight, sensor_row)| weight * sensor_row[symbol])
            .collect()
    }

    fn weight_by_sensor(&self, row: &mut [f64], symbol: usize) {
        for (state, cell) in row.iter_mut().enumerate() {
            *cell *= self.sensor()[state][symbol];
        }
    }
}
