//! Rendering of command results.
//!
//! Every command assembles a serializable report struct first; both the
//! JSON and the human format are derived from that struct, so the two
//! views cannot drift apart. Reports go to stdout, logs to stderr.

use std::io::Write;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use trellis_core::HiddenMarkovModel;
use trellis_math::{argmax, entropy};

use crate::error::Result;
use crate::model_file::ModelSpec;

/// Supported output formats for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable tables (default).
    #[default]
    Human,

    /// Pretty-printed JSON for machine consumption.
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Human => write!(f, "human"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Report for `trellis check`: labels plus the materialized matrices.
#[derive(Debug, Serialize)]
pub struct CheckReport<'a> {
    pub states: &'a [String],
    pub symbols: &'a [String],
    pub model: &'a HiddenMarkovModel,
}

/// One timestamped belief row.
#[derive(Debug, Serialize)]
pub struct BeliefRow<'a> {
    pub time: usize,
    pub belief: &'a [f64],
    /// Shannon entropy of the row in nats. 0 means certain.
    pub entropy: f64,
    /// Most likely state label; absent when the row carries no mass.
    pub top_state: Option<&'a str>,
}

/// Report for the belief-producing commands (filter, predict, smooth, query).
#[derive(Debug, Serialize)]
pub struct BeliefReport<'a> {
    pub operation: &'static str,
    pub evidence: &'a [usize],
    pub states: &'a [String],
    pub rows: Vec<BeliefRow<'a>>,
}

/// Report for `trellis likelihood`.
#[derive(Debug, Serialize)]
pub struct LikelihoodReport<'a> {
    pub evidence: &'a [usize],
    pub prefix_likelihoods: &'a [f64],
    pub sequence_likelihood: f64,
}

/// Annotate raw belief rows with timestamps, entropy, and top labels.
pub fn belief_report<'a>(
    operation: &'static str,
    evidence: &'a [usize],
    first_time: usize,
    rows: &'a [Vec<f64>],
    spec: &'a ModelSpec,
) -> BeliefReport<'a> {
    let rows = rows
        .iter()
        .enumerate()
        .map(|(offset, belief)| BeliefRow {
            time: first_time + offset,
            belief,
            entropy: entropy(belief),
            top_state: argmax(belief)
                .filter(|_| belief.iter().any(|p| *p > 0.0))
                .map(|index| spec.state_label(index)),
        })
        .collect();
    BeliefReport {
        operation,
        evidence,
        states: &spec.states,
        rows,
    }
}

pub fn render_check<W: Write>(
    out: &mut W,
    format: OutputFormat,
    report: &CheckReport<'_>,
) -> Result<()> {
    match format {
        OutputFormat::Json => write_json(out, report),
        OutputFormat::Human => {
            writeln!(out, "# Model Check")?;
            writeln!(out, "States:  {}", report.states.join(", "))?;
            writeln!(out, "Symbols: {}", report.symbols.join(", "))?;
            writeln!(out)?;

            let width = label_width(report.states);
            writeln!(out, "Transition (row state -> column state):")?;
            for (state, row) in report.states.iter().zip(report.model.transition()) {
                writeln!(out, "  {state:<width$} {}", format_row(row))?;
            }
            writeln!(out, "Sensor (state -> symbol):")?;
            for (state, row) in report.states.iter().zip(report.model.sensor()) {
                writeln!(out, "  {state:<width$} {}", format_row(row))?;
            }
            writeln!(out, "Prior: {}", format_row(report.model.prior()))?;
            writeln!(out)?;
            writeln!(
                out,
                "Model is valid: {} states, {} symbols.",
                report.states.len(),
                report.symbols.len()
            )?;
            Ok(())
        }
    }
}

pub fn render_beliefs<W: Write>(
    out: &mut W,
    format: OutputFormat,
    report: &BeliefReport<'_>,
) -> Result<()> {
    match format {
        OutputFormat::Json => write_json(out, report),
        OutputFormat::Human => {
            writeln!(out, "# Beliefs ({})", report.operation)?;
            writeln!(out, "Evidence: {} observations", report.evidence.len())?;
            writeln!(out)?;

            // Column per state, wide enough for "P[label]".
            let width = report
                .states
                .iter()
                .map(|label| label.len() + 3)
                .max()
                .unwrap_or(8)
                .max(8);
            write!(out, "{:<6} ", "TIME")?;
            for state in report.states {
                write!(out, "{:<width$} ", format!("P[{state}]"))?;
            }
            writeln!(out, "{:<10} TOP", "ENTROPY")?;
            for row in &report.rows {
                write!(out, "{:<6} ", row.time)?;
                for value in row.belief {
                    write!(out, "{value:<width$.4} ")?;
                }
                writeln!(out, "{:<10.4} {}", row.entropy, row.top_state.unwrap_or("-"))?;
            }
            Ok(())
        }
    }
}

pub fn render_likelihood<W: Write>(
    out: &mut W,
    format: OutputFormat,
    report: &LikelihoodReport<'_>,
) -> Result<()> {
    match format {
        OutputFormat::Json => write_json(out, report),
        OutputFormat::Human => {
            writeln!(out, "# Sequence Likelihood")?;
            writeln!(out, "Evidence: {} observations", report.evidence.len())?;
            writeln!(out)?;
            writeln!(out, "{:<6} PREFIX", "TIME")?;
            for (time, prefix) in report.prefix_likelihoods.iter().enumerate() {
                writeln!(out, "{time:<6} {prefix:.6}")?;
            }
            writeln!(out)?;
            writeln!(
                out,
                "Sequence likelihood: {:.6}",
                report.sequence_likelihood
            )?;
            Ok(())
        }
    }
}

fn write_json<W: Write, R: Serialize>(out: &mut W, report: &R) -> Result<()> {
    let rendered =
        serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string());
    writeln!(out, "{rendered}")?;
    Ok(())
}

fn format_row(row: &[f64]) -> String {
    row.iter()
        .map(|value| format!("{value:.4}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn label_width(labels: &[String]) -> usize {
    labels.iter().map(String::len).max().unwrap_or(0).max(5)
}
