//! Range queries across past, present, and future times.
//!
//! A query names a closed time range `[from, to]` against an evidence
//! sequence and gets one belief row per time. Times before the evidence
//! horizon are smoothed, the horizon itself is filtered, and times after
//! it are predicted. Ranges that straddle the horizon stitch the three
//! sources together around a single filter pass.

use tracing::debug;

use crate::error::{EngineError, Result};
use crate::model::HiddenMarkovModel;

impl HiddenMarkovModel {
    /// Beliefs for every time in `from ..= to` given `evidence`, in
    /// increasing time order.
    pub fn query(&self, evidence: &[usize], from: usize, to: usize) -> Result<Vec<Vec<f64>>> {
        self.check_evidence(evidence)?;
        if from > to {
            return Err(EngineError::InvalidRange { from, to });
        }
        let horizon_end = evidence.len() - 1;

        if from > horizon_end {
            debug!(from, to, horizon_end, "range query resolved by prediction");
            let predicted = self.predicted_beliefs(evidence, to)?;
            return Ok(predicted
                .into_iter()
                .skip(from - horizon_end - 1)
                .collect());
        }

        if to < horizon_end {
            debug!(from, to, horizon_end, "range query resolved by smoothing");
            let smoothed = self.smoothed_beliefs(evidence, from)?;
            return Ok(smoothed.into_iter().take(to - from + 1).collect());
        }

        // The range touches the horizon: smooth the strictly-past times,
        // reuse the filter pass for the horizon row, project the rest.
        debug!(from, to, horizon_end, "range query stitched at the horizon");
        let filtered = self.filtered_beliefs(evidence)?;
        let mut rows = Vec::with_capacity(to - from + 1);
        if from < horizon_end {
            rows.extend(self.smooth_with_filtered(evidence, from, &filtered)?);
        }
        rows.push(filtered[horizon_end].clone());
        if to > horizon_end {
            rows.extend(self.project_from(&filtered[horizon_end], to - horizon_end));
        }
        Ok(rows)
    }
}
