//! Interactive inference sessions.
//!
//! A session keeps one model and a growing evidence sequence in memory.
//! Commands arrive one per line on stdin and reports go to stdout in the
//! session's output format. Without a model file the session opens with
//! a short form that builds the model from prompted rows.

use std::io::{self, BufRead, Write};
use std::path::Path;

use tracing::debug;
use trellis_core::HiddenMarkovModel;

use crate::error::{CliError, Result};
use crate::model_file::ModelSpec;
use crate::render::{self, OutputFormat};

const HELP: &str = "\
commands:
  observe <symbol> ...   append observations (labels or indices)
  evidence               list the current observations
  beliefs                filtered beliefs over the observations
  likelihood             prefix likelihoods of the observations
  predict <time>         project beliefs forward to a future time
  smooth [<time>]        smoothed beliefs from a past time (default 0)
  query <from> <to>      beliefs over an inclusive time range
  reset                  drop all observations
  help                   show this message
  quit                   leave the session";

/// Run a session against real stdin/stdout.
pub fn run(model_path: Option<&Path>, format: OutputFormat) -> Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    run_with(&mut stdin.lock(), &mut stdout.lock(), model_path, format)
}

fn run_with<B: BufRead, W: Write>(
    input: &mut B,
    out: &mut W,
    model_path: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let spec = match model_path {
        Some(path) => ModelSpec::from_file(path)?,
        None => prompt_for_model(input, out)?,
    };
    let model = spec.build()?;
    debug!(
        states = spec.states.len(),
        symbols = spec.symbols.len(),
        "session model ready"
    );
    writeln!(
        out,
        "Model ready: {} states, {} symbols. Type 'help' for commands.",
        spec.states.len(),
        spec.symbols.len()
    )?;

    let mut session = Session {
        spec,
        model,
        evidence: Vec::new(),
        format,
    };

    loop {
        write!(out, "trellis> ")?;
        out.flush()?;
        let Some(line) = read_line(input)? else {
            break;
        };
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            continue;
        };
        let args: Vec<&str> = words.collect();
        if command == "quit" || command == "exit" {
            break;
        }
        match session.dispatch(out, command, &args) {
            Ok(()) => {}
            // A dead output stream ends the session; everything else is
            // reported and the loop keeps going.
            Err(CliError::Io(err)) => return Err(CliError::Io(err)),
            Err(other) => writeln!(out, "error: {other}")?,
        }
    }
    writeln!(out, "bye")?;
    Ok(())
}

struct Session {
    spec: ModelSpec,
    model: HiddenMarkovModel,
    evidence: Vec<usize>,
    format: OutputFormat,
}

impl Session {
    fn dispatch<W: Write>(&mut self, out: &mut W, command: &str, args: &[&str]) -> Result<()> {
        match command {
            "observe" => self.observe(out, args),
            "evidence" => self.show_evidence(out),
            "beliefs" => self.beliefs(out),
            "likelihood" => self.likelihood(out),
            "predict" => self.predict(out, args),
            "smooth" => self.smooth(out, args),
            "query" => self.query(out, args),
            "reset" => {
                self.evidence.clear();
                writeln!(out, "evidence cleared")?;
                Ok(())
            }
            "help" => {
                writeln!(out, "{HELP}")?;
                Ok(())
            }
            other => {
                writeln!(out, "unknown command {other:?}; type 'help'")?;
                Ok(())
            }
        }
    }

    fn observe<W: Write>(&mut self, out: &mut W, args: &[&str]) -> Result<()> {
        if args.is_empty() {
            return Err(CliError::Usage {
                usage: "observe <symbol> [<symbol> ...]",
            });
        }
        // Resolve every token before touching the sequence, so a typo
        // halfway through does not leave half the batch behind.
        let mut parsed = Vec::with_capacity(args.len());
        for token in args {
            parsed.push(self.spec.symbol_index(token)?);
        }
        self.evidence.extend(parsed);
        writeln!(out, "evidence now spans times 0..{}", self.evidence.len())?;
        Ok(())
    }

    fn show_evidence<W: Write>(&self, out: &mut W) -> Result<()> {
        if self.evidence.is_empty() {
            writeln!(out, "no observations yet")?;
            return Ok(());
        }
        let labels: Vec<&str> = self
            .evidence
            .iter()
            .map(|&symbol| self.spec.symbol_label(symbol))
            .collect();
        writeln!(out, "{} observations: {}", labels.len(), labels.join(", "))?;
        Ok(())
    }

    fn beliefs<W: Write>(&self, out: &mut W) -> Result<()> {
        let rows = self.model.filtered_beliefs(&self.evidence)?;
        let report = render::belief_report("filter", &self.evidence, 0, &rows, &self.spec);
        render::render_beliefs(out, self.format, &report)
    }

    fn likelihood<W: Write>(&self, out: &mut W) -> Result<()> {
        let prefixes = self.model.sequence_likelihoods(&self.evidence)?;
        let report = render::LikelihoodReport {
            evidence: &self.evidence,
            prefix_likelihoods: &prefixes,
            sequence_likelihood: prefixes.last().copied().unwrap_or(0.0),
        };
        render::render_likelihood(out, self.format, &report)
    }

    fn predict<W: Write>(&self, out: &mut W, args: &[&str]) -> Result<()> {
        let target = match args {
            [token] => parse_time(token)?,
            _ => {
                return Err(CliError::Usage {
                    usage: "predict <time>",
                })
            }
        };
        let rows = self.model.predicted_beliefs(&self.evidence, target)?;
        let report = render::belief_report(
            "predict",
            &self.evidence,
            self.evidence.len(),
            &rows,
            &self.spec,
        );
        render::render_beliefs(out, self.format, &report)
    }

    fn smooth<W: Write>(&self, out: &mut W, args: &[&str]) -> Result<()> {
        let earliest = match args {
            [] => 0,
            [token] => parse_time(token)?,
            _ => {
                return Err(CliError::Usage {
                    usage: "smooth [<time>]",
                })
            }
        };
        let rows = self.model.smoothed_beliefs(&self.evidence, earliest)?;
        let report = render::belief_report("smooth", &self.evidence, earliest, &rows, &self.spec);
        render::render_beliefs(out, self.format, &report)
    }

    fn query<W: Write>(&self, out: &mut W, args: &[&str]) -> Result<()> {
        let (from, to) = match args {
            [from, to] => (parse_time(from)?, parse_time(to)?),
            _ => {
                return Err(CliError::Usage {
                    usage: "query <from> <to>",
                })
            }
        };
        let rows = self.model.query(&self.evidence, from, to)?;
        let report = render::belief_report("query", &self.evidence, from, &rows, &self.spec);
        render::render_beliefs(out, self.format, &report)
    }
}

// ==== model form ====

fn prompt_for_model<B: BufRead, W: Write>(input: &mut B, out: &mut W) -> Result<ModelSpec> {
    writeln!(out, "No model file given; define one now.")?;
    let states = prompt_labels(input, out, "State labels (comma separated): ")?;
    let symbols = prompt_labels(input, out, "Symbol labels (comma separated): ")?;

    writeln!(
        out,
        "Transition rows: {} value(s) each, the last entry is derived.",
        states.len() - 1
    )?;
    let mut transition = Vec::with_capacity(states.len());
    for state in &states {
        let prompt = format!("P[{state} -> ...]: ");
        transition.push(prompt_row(input, out, &prompt, states.len() - 1)?);
    }

    writeln!(
        out,
        "Sensor rows: {} value(s) each, the last entry is derived.",
        symbols.len() - 1
    )?;
    let mut sensor = Vec::with_capacity(states.len());
    for state in &states {
        let prompt = format!("P[{state} emits ...]: ");
        sensor.push(prompt_row(input, out, &prompt, symbols.len() - 1)?);
    }

    let prior = prompt_row(input, out, "Prior over states: ", states.len() - 1)?;

    Ok(ModelSpec {
        states,
        symbols,
        transition,
        sensor,
        prior,
    })
}

fn prompt_labels<B: BufRead, W: Write>(
    input: &mut B,
    out: &mut W,
    prompt: &str,
) -> Result<Vec<String>> {
    loop {
        write!(out, "{prompt}")?;
        out.flush()?;
        let Some(line) = read_line(input)? else {
            return Err(incomplete_model());
        };
        let labels: Vec<String> = line
            .split(',')
            .map(|label| label.trim().to_string())
            .filter(|label| !label.is_empty())
            .collect();
        if labels.is_empty() {
            writeln!(out, "error: enter at least one label")?;
            continue;
        }
        return Ok(labels);
    }
}

fn prompt_row<B: BufRead, W: Write>(
    input: &mut B,
    out: &mut W,
    prompt: &str,
    expected: usize,
) -> Result<Vec<f64>> {
    loop {
        write!(out, "{prompt}")?;
        out.flush()?;
        let Some(line) = read_line(input)? else {
            return Err(incomplete_model());
        };
        match parse_row(&line, expected) {
            Ok(row) => return Ok(row),
            Err(err) => writeln!(out, "error: {err}")?,
        }
    }
}

fn parse_row(line: &str, expected: usize) -> Result<Vec<f64>> {
    let tokens: Vec<&str> = line
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .collect();
    if tokens.len() != expected {
        return Err(CliError::RowLength {
            expected,
            got: tokens.len(),
        });
    }
    tokens
        .iter()
        .map(|token| {
            token.parse().map_err(|_| CliError::BadNumber {
                what: "row entry",
                token: token.to_string(),
            })
        })
        .collect()
}

fn parse_time(token: &str) -> Result<usize> {
    token.parse().map_err(|_| CliError::BadNumber {
        what: "time",
        token: token.to_string(),
    })
}

fn read_line<B: BufRead>(input: &mut B) -> Result<Option<String>> {
    let mut raw = String::new();
    if input.read_line(&mut raw)? == 0 {
        return Ok(None);
    }
    Ok(Some(raw.trim().to_string()))
}

fn incomplete_model() -> CliError {
    CliError::Io(io::Error::new(
        io::ErrorKind::UnexpectedEof,
        "input ended before the model was complete",
    ))
}
