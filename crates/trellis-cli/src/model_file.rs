//! Model files on disk.
//!
//! A model file is a JSON document naming the hidden states and
//! observation symbols, plus the partial probability rows the engine
//! completes. Labels double as evidence tokens on the command line, so
//! [`ModelSpec`] keeps the label-to-index mapping alongside the matrices.

use std::path::Path;

use serde::Deserialize;
use tracing::debug;
use trellis_core::HiddenMarkovModel;

use crate::error::{CliError, Result};

/// On-disk model description.
///
/// Probability rows follow the derived-last-entry convention: each row
/// carries all but its final entry, and the engine fills in the
/// remainder. A two-state transition matrix is therefore two rows of
/// one number each.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelSpec {
    /// Hidden state labels, in matrix row order.
    pub states: Vec<String>,
    /// Observation symbol labels, in sensor column order.
    pub symbols: Vec<String>,
    /// Partial transition rows, one per state.
    pub transition: Vec<Vec<f64>>,
    /// Partial sensor rows, one per state.
    pub sensor: Vec<Vec<f64>>,
    /// Partial prior over the initial state.
    pub prior: Vec<f64>,
}

impl ModelSpec {
    /// Load and parse a model file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| CliError::ReadModel {
            path: path.to_path_buf(),
            source,
        })?;
        let spec: ModelSpec = serde_json::from_str(&raw).map_err(|source| CliError::ParseModel {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(
            states = spec.states.len(),
            symbols = spec.symbols.len(),
            path = %path.display(),
            "model file loaded"
        );
        Ok(spec)
    }

    /// Check that labels and matrices agree, then build the engine model.
    pub fn build(&self) -> Result<HiddenMarkovModel> {
        if self.states.is_empty() {
            return Err(CliError::ShapeMismatch("the model lists no states".to_string()));
        }
        if self.symbols.is_empty() {
            return Err(CliError::ShapeMismatch("the model lists no symbols".to_string()));
        }
        if self.transition.len() != self.states.len() {
            return Err(CliError::ShapeMismatch(format!(
                "{} states but {} transition rows",
                self.states.len(),
                self.transition.len()
            )));
        }
        if self.sensor.len() != self.states.len() {
            return Err(CliError::ShapeMismatch(format!(
                "{} states but {} sensor rows",
                self.states.len(),
                self.sensor.len()
            )));
        }
        if let Some(row) = self.sensor.first() {
            if row.len() + 1 != self.symbols.len() {
                return Err(CliError::ShapeMismatch(format!(
                    "{} symbols but sensor rows carry {} entries (the last entry is derived)",
                    self.symbols.len(),
                    row.len()
                )));
            }
        }
        Ok(HiddenMarkovModel::new(&self.transition, &self.sensor, &self.prior)?)
    }

    /// Resolve an evidence token to a symbol index.
    ///
    /// Labels win over digits, so a model with a symbol literally named
    /// "1" still resolves "1" to that symbol.
    pub fn symbol_index(&self, token: &str) -> Result<usize> {
        if let Some(index) = self.symbols.iter().position(|label| label == token) {
            return Ok(index);
        }
        if let Ok(index) = token.parse::<usize>() {
            if index < self.symbols.len() {
                return Ok(index);
            }
        }
        Err(CliError::UnknownSymbol {
            label: token.to_string(),
        })
    }

    /// Resolve a full evidence sequence of labels or indices.
    pub fn parse_evidence(&self, tokens: &[String]) -> Result<Vec<usize>> {
        tokens
            .iter()
            .map(|token| self.symbol_index(token.trim()))
            .collect()
    }

    pub fn state_label(&self, index: usize) -> &str {
        self.states.get(index).map(String::as_str).unwrap_or("?")
    }

    pub fn symbol_label(&self, index: usize) -> &str {
        self.symbols.get(index).map(String::as_str).unwrap_or("?")
    }
}
