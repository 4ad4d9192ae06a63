//! Backward recursion and smoothing.
//!
//! Backward messages weigh the evidence that arrives after a time of
//! interest:
//!
//! ```text
//! b[horizon_end][s] = 1
//! b[t][s] = sum over s' of transition[s][s'] * sensor[s'][e_{t+1}] * b[t+1][s']
//! ```
//!
//! Smoothing multiplies filtered beliefs by backward messages elementwise
//! and renormalizes, yielding `P(X_t = s | e_0..=e_{horizon_end})`.

use trellis_math::normalize_in_place;

use crate::error::{EngineError, Result};
use crate::model::HiddenMarkovModel;

impl HiddenMarkovModel {
    /// Backward messages for the times `earliest ..= horizon_end - 1`,
    /// indexed by `t - earliest`.
    ///
    /// The message at the final observed time is all-ones and carries no
    /// information, so it is never returned; `earliest` must name a time
    /// with at least one observation after it.
    pub fn backward_messages(&self, evidence: &[usize], earliest: usize) -> Result<Vec<Vec<f64>>> {
        self.check_evidence(evidence)?;
        let horizon_end = evidence.len() - 1;
        // No arithmetic on `earliest`: it can be any usize.
        if earliest >= horizon_end {
            return Err(EngineError::InvalidPastTimestamp {
                earliest,
                horizon_end,
            });
        }

        let count = horizon_end - earliest;
        let mut messages = vec![Vec::new(); count];
        let mut ahead = vec![1.0; self.num_states()];
        for time in (earliest..horizon_end).rev() {
            ahead = self.backward_step(&ahead, evidence[time + 1]);
            messages[time - earliest] = ahead.clone();
        }
        Ok(messages)
    }

    /// Smoothed posteriors for the times `earliest ..= horizon_end - 1`.
    ///
    /// The final observed time needs no backward pass: its smoothed belief
    /// is the filtered belief, which [`Self::query`] stitches in whenever a
    /// range reaches the horizon.
    pub fn smoothed_beliefs(&self, evidence: &[usize], earliest: usize) -> Result<Vec<Vec<f64>>> {
        let filtered = self.filtered_beliefs(evidence)?;
        self.smooth_with_filtered(evidence, earliest, &filtered)
    }

    /// Smoothing against an already-computed filter pass. Range queries
    /// call this directly to avoid filtering the same evidence twice.
    pub(crate) fn smooth_with_filtered(
        &self,
        evidence: &[usize],
        earliest: usize,
        filtered: &[Vec<f64>],
    ) -> Result<Vec<Vec<f64>>> {
        let messages = self.backward_messages(evidence, earliest)?;

        let mut rows = Vec::with_capacity(messages.len());
        for (offset, message) in messages.iter().enumerate() {
            let mut row: Vec<f64> = filtered[earliest + offset]
                .iter()
                .zip(message)
                .map(|(filtered_mass, backward_mass)| filtered_mass * backward_mass)
                .collect();
            normalize_in_place(&mut row);
            rows.push(row);
        }
        Ok(rows)
    }

    /// One step of the backward recurrence against the next observation.
    fn backward_step(&self, ahead: &[f64], symbol: usize) -> Vec<f64> {
        let transition = self.transition();
        let sensor = self.sensor();

        let mut message = vec![0.0; self.num_states()];
        for (state, cell) in message.iter_mut().enumerate() {
            let mut total = 0.0;
            for (next_state, &weight) in ahead.iter().enumerate() {
                total += transition[state][next_state] * sensor[next_state][symbol] * weight;
            }
            *cell = total;
        }
        message
    }
}
