//! trellis - exact inference for discrete hidden Markov models
//!
//! The command line front end for trellis-core, handling:
//! - Model file validation and display
//! - Filtering, prediction, smoothing, and range queries over evidence
//! - Evidence likelihood reports
//! - Interactive sessions with incremental evidence

mod error;
mod exit_codes;
mod logging;
mod model_file;
mod render;
mod session;

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use trellis_core::HiddenMarkovModel;

use crate::error::{format_error_human, Result};
use crate::exit_codes::ExitCode;
use crate::logging::{init_logging, LogConfig, LogFormat, LogLevel};
use crate::model_file::ModelSpec;
use crate::render::{
    belief_report, render_beliefs, render_check, render_likelihood, CheckReport,
    LikelihoodReport, OutputFormat,
};

/// trellis - exact inference for discrete hidden Markov models
#[derive(Parser)]
#[command(name = "trellis")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "human")]
    format: OutputFormat,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease verbosity (quiet mode)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a model file and print the materialized matrices
    Check(CheckArgs),

    /// Prefix likelihoods of an evidence sequence
    Likelihood(EvidenceArgs),

    /// Filtered beliefs after each observation
    Filter(EvidenceArgs),

    /// Project beliefs past the end of the evidence
    Predict(PredictArgs),

    /// Smoothed beliefs using evidence from both sides
    Smooth(SmoothArgs),

    /// Beliefs over an arbitrary inclusive time range
    Query(QueryArgs),

    /// Interactive session with incremental evidence
    Session(SessionArgs),
}

// ============================================================================
// Command argument structs
// ============================================================================

#[derive(Args, Debug)]
struct CheckArgs {
    /// Model file (JSON)
    #[arg(long, short = 'm')]
    model: PathBuf,
}

#[derive(Args, Debug)]
struct EvidenceArgs {
    /// Model file (JSON)
    #[arg(long, short = 'm')]
    model: PathBuf,

    /// Observed symbols, as labels or zero-based indices
    #[arg(required = true, value_delimiter = ',')]
    evidence: Vec<String>,
}

#[derive(Args, Debug)]
struct PredictArgs {
    #[command(flatten)]
    input: EvidenceArgs,

    /// Future timestep to project to (inclusive)
    #[arg(long, short = 't')]
    target: usize,
}

#[derive(Args, Debug)]
struct SmoothArgs {
    #[command(flatten)]
    input: EvidenceArgs,

    /// Earliest timestep to smooth (defaults to the start)
    #[arg(long, default_value_t = 0)]
    from: usize,
}

#[derive(Args, Debug)]
struct QueryArgs {
    #[command(flatten)]
    input: EvidenceArgs,

    /// First timestep of the range (inclusive)
    #[arg(long)]
    from: usize,

    /// Last timestep of the range (inclusive)
    #[arg(long)]
    to: usize,
}

#[derive(Args, Debug)]
struct SessionArgs {
    /// Model file (JSON); omit to define the model interactively
    #[arg(long, short = 'm')]
    model: Option<PathBuf>,
}

// ============================================================================
// Main entry point
// ============================================================================

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.global.quiet {
        LogLevel::Error
    } else {
        match cli.global.verbose {
            0 => LogLevel::Info,
            1 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    };
    // JSON stdout pairs with JSONL stderr so agents can parse both streams.
    let log_format = match cli.global.format {
        OutputFormat::Json => LogFormat::Jsonl,
        OutputFormat::Human => LogFormat::Human,
    };
    init_logging(&LogConfig {
        format: log_format,
        level: log_level,
    });

    let exit_code = match cli.command {
        Commands::Check(args) => run_check(&cli.global, &args),
        Commands::Likelihood(args) => run_likelihood(&cli.global, &args),
        Commands::Filter(args) => run_filter(&cli.global, &args),
        Commands::Predict(args) => run_predict(&cli.global, &args),
        Commands::Smooth(args) => run_smooth(&cli.global, &args),
        Commands::Query(args) => run_query(&cli.global, &args),
        Commands::Session(args) => run_session(&cli.global, &args),
    };

    if !exit_code.is_success() {
        tracing::debug!(code = %exit_code, "exiting with failure");
    }
    std::process::exit(exit_code.as_i32());
}

// ============================================================================
// Command implementations
// ============================================================================

fn run_check(global: &GlobalOpts, args: &CheckArgs) -> ExitCode {
    finish(global, try_check(global, args))
}

fn try_check(global: &GlobalOpts, args: &CheckArgs) -> Result<()> {
    let spec = ModelSpec::from_file(&args.model)?;
    let model = spec.build()?;
    let report = CheckReport {
        states: &spec.states,
        symbols: &spec.symbols,
        model: &model,
    };
    render_check(&mut std::io::stdout(), global.format, &report)
}

fn run_likelihood(global: &GlobalOpts, args: &EvidenceArgs) -> ExitCode {
    finish(global, try_likelihood(global, args))
}

fn try_likelihood(global: &GlobalOpts, args: &EvidenceArgs) -> Result<()> {
    let (_spec, model, evidence) = load(args)?;
    let prefixes = model.sequence_likelihoods(&evidence)?;
    let report = LikelihoodReport {
        evidence: &evidence,
        prefix_likelihoods: &prefixes,
        sequence_likelihood: prefixes.last().copied().unwrap_or(0.0),
    };
    render_likelihood(&mut std::io::stdout(), global.format, &report)
}

fn run_filter(global: &GlobalOpts, args: &EvidenceArgs) -> ExitCode {
    finish(global, try_filter(global, args))
}

fn try_filter(global: &GlobalOpts, args: &EvidenceArgs) -> Result<()> {
    let (spec, model, evidence) = load(args)?;
    let rows = model.filtered_beliefs(&evidence)?;
    let report = belief_report("filter", &evidence, 0, &rows, &spec);
    render_beliefs(&mut std::io::stdout(), global.format, &report)
}

fn run_predict(global: &GlobalOpts, args: &PredictArgs) -> ExitCode {
    finish(global, try_predict(global, args))
}

fn try_predict(global: &GlobalOpts, args: &PredictArgs) -> Result<()> {
    let (spec, model, evidence) = load(&args.input)?;
    let rows = model.predicted_beliefs(&evidence, args.target)?;
    let report = belief_report("predict", &evidence, evidence.len(), &rows, &spec);
    render_beliefs(&mut std::io::stdout(), global.format, &report)
}

fn run_smooth(global: &GlobalOpts, args: &SmoothArgs) -> ExitCode {
    finish(global, try_smooth(global, args))
}

fn try_smooth(global: &GlobalOpts, args: &SmoothArgs) -> Result<()> {
    let (spec, model, evidence) = load(&args.input)?;
    let rows = model.smoothed_beliefs(&evidence, args.from)?;
    let report = belief_report("smooth", &evidence, args.from, &rows, &spec);
    render_beliefs(&mut std::io::stdout(), global.format, &report)
}

fn run_query(global: &GlobalOpts, args: &QueryArgs) -> ExitCode {
    finish(global, try_query(global, args))
}

fn try_query(global: &GlobalOpts, args: &QueryArgs) -> Result<()> {
    let (spec, model, evidence) = load(&args.input)?;
    let rows = model.query(&evidence, args.from, args.to)?;
    let report = belief_report("query", &evidence, args.from, &rows, &spec);
    render_beliefs(&mut std::io::stdout(), global.format, &report)
}

fn run_session(global: &GlobalOpts, args: &SessionArgs) -> ExitCode {
    finish(global, session::run(args.model.as_deref(), global.format))
}

// ============================================================================
// Shared helpers
// ============================================================================

fn load(args: &EvidenceArgs) -> Result<(ModelSpec, HiddenMarkovModel, Vec<usize>)> {
    let spec = ModelSpec::from_file(&args.model)?;
    let model = spec.build()?;
    let evidence = spec.parse_evidence(&args.evidence)?;
    Ok((spec, model, evidence))
}

fn finish(global: &GlobalOpts, outcome: Result<()>) -> ExitCode {
    match outcome {
        Ok(()) => ExitCode::Clean,
        Err(err) => {
            let use_color = !global.no_color && std::io::stderr().is_terminal();
            eprintln!("{}", format_error_human(&err, use_color));
            err.exit_code()
        }
    }
}
