//! Error types for the trellis CLI.
//!
//! Every error knows its exit code and carries a short remediation hint
//! for human output. Engine errors pass through unchanged, so the message
//! the library produced is the message the user reads.

use std::path::PathBuf;

use thiserror::Error;
use trellis_core::EngineError;

use crate::exit_codes::ExitCode;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("cannot read model file {path}: {source}")]
    ReadModel {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("model file {path} is not valid JSON: {source}")]
    ParseModel {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("model file mismatch: {0}")]
    ShapeMismatch(String),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("unknown symbol {label:?}")]
    UnknownSymbol { label: String },

    #[error("{what} expects a number, got {token:?}")]
    BadNumber { what: &'static str, token: String },

    #[error("expected {expected} row entries, got {got}")]
    RowLength { expected: usize, got: usize },

    #[error("usage: {usage}")]
    Usage { usage: &'static str },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// The process exit code this error maps to.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            CliError::Io(_) => ExitCode::InternalError,
            _ => ExitCode::InputError,
        }
    }

    /// Short headline for human-readable output.
    pub fn headline(&self) -> &'static str {
        match self {
            CliError::ReadModel { .. } => "Cannot Read Model File",
            CliError::ParseModel { .. } | CliError::ShapeMismatch(_) => "Invalid Model File",
            CliError::Engine(
                EngineError::InvalidTransitionModel { .. }
                | EngineError::InvalidSensorModel { .. }
                | EngineError::InvalidPrior { .. },
            ) => "Invalid Model",
            CliError::Engine(EngineError::InvalidEvidence { .. }) => "Invalid Evidence",
            CliError::Engine(
                EngineError::InvalidFutureTimestamp { .. }
                | EngineError::InvalidPastTimestamp { .. },
            ) => "Invalid Timestamp",
            CliError::Engine(EngineError::InvalidRange { .. }) => "Invalid Range",
            CliError::UnknownSymbol { .. } => "Unknown Symbol",
            CliError::BadNumber { .. } => "Invalid Number",
            CliError::RowLength { .. } => "Invalid Row",
            CliError::Usage { .. } => "Usage Error",
            CliError::Io(_) => "I/O Error",
        }
    }

    /// Human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            CliError::ReadModel { .. } => "Check the path and file permissions.",
            CliError::ParseModel { .. } | CliError::ShapeMismatch(_) => {
                "Validate the file with 'trellis check --model <file>'."
            }
            CliError::Engine(EngineError::InvalidEvidence { .. }) => {
                "Evidence must be a non-empty list of the model's symbols."
            }
            CliError::Engine(EngineError::InvalidFutureTimestamp { .. }) => {
                "Prediction targets must lie strictly after the last observation."
            }
            CliError::Engine(EngineError::InvalidPastTimestamp { .. }) => {
                "Smoothing needs at least one observation after the requested time."
            }
            CliError::Engine(EngineError::InvalidRange { .. }) => {
                "Ranges are inclusive and need from <= to."
            }
            CliError::Engine(_) => {
                "Fix the offending row; each row's partial sum must stay at or below 1."
            }
            CliError::UnknownSymbol { .. } => {
                "Run 'trellis check --model <file>' to list the declared labels."
            }
            CliError::BadNumber { .. } => "Use plain decimal numbers, e.g. 0.25.",
            CliError::RowLength { .. } => {
                "Enter exactly the listed number of values; the final entry is derived."
            }
            CliError::Usage { .. } => "Run 'trellis --help' for the full command surface.",
            CliError::Io(_) => "Check disk space and stream redirection, then retry.",
        }
    }
}

/// Format an error for human-readable stderr output.
///
/// ```text
/// ✗ Invalid Evidence
///   Reason: symbol 7 at time 2 is outside 0..2
///   Fix: Evidence must be a non-empty list of the model's symbols.
/// ```
pub fn format_error_human(err: &CliError, use_color: bool) -> String {
    let (red, cyan, reset) = if use_color {
        ("\x1b[31m", "\x1b[36m", "\x1b[0m")
    } else {
        ("", "", "")
    };

    format!(
        "{red}\u{2717}{reset} {headline}\n  Reason: {err}\n  {cyan}Fix:{reset} {remediation}",
        headline = err.headline(),
        remediation = err.remediation()
    )
}
