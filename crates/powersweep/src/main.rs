//! powersweep: sweep external tools across their parameter space, measure
//! time/energy/counters per run, and model the results.
//!
//! The binary is a thin dispatch layer: each subcommand wires files and
//! flags into the library crates and converts their errors into an exit
//! code. All diagnostics go to stderr so result files and reports can be
//! piped from stdout.

mod predict;
mod report;
mod sweep;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use itertools::Itertools;
use mimalloc::MiMalloc;
use tracing_subscriber::EnvFilter;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Crates to include in the logging allowlist.
const CRATES: &[&str] = &[
    "powersweep",
    "powersweep_sampler",
    "powersweep_model",
    "powersweep_store",
];

/// Benchmark external tools across the cartesian product of their tunable
/// flags and predict metrics for untested combinations.
///
/// Each tool is described declaratively in a JSON file: command template,
/// parameter axes with finite domains, requested perf events, and the
/// feature encoding used by the modeling phase.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the measurement sweep for one tool
    ///
    /// Enumerates the cartesian product of the tool's axis domains, runs
    /// every point under the perf and time wrappers with energy snapshots
    /// around each repetition, and persists the raw results. Ctrl-C stops
    /// the sweep between repetitions, flushes partial results, and exits
    /// successfully.
    Sweep {
        /// Path to the tool description JSON
        #[arg(short, long, value_name = "PATH")]
        config: PathBuf,

        /// Result file to write (defaults to <tool>.res)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// Override the description's repetitions per sweep point
        #[arg(short, long)]
        repetitions: Option<u32>,

        /// Directory for the tool's stdout/stderr capture files
        #[arg(long, value_name = "DIR")]
        capture_dir: Option<PathBuf>,
    },

    /// Train per-metric models from persisted results and predict
    ///
    /// Randomly assigns each repetition to the training or control side,
    /// fits one least-squares model per metric, and writes predictions
    /// for every held-out tuple as JSON.
    Predict {
        /// Path to the tool description JSON
        #[arg(short, long, value_name = "PATH")]
        config: PathBuf,

        /// Persisted result file from a previous sweep
        #[arg(short, long, value_name = "PATH")]
        input: PathBuf,

        /// Percentage of repetitions assigned to the training side
        #[arg(short, long, default_value_t = 80, value_name = "1-100")]
        training_percentage: u32,

        /// Prediction file to write (stdout if not specified)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Compare predictions against the observed corridors
    Report {
        /// Path to the tool description JSON
        #[arg(short, long, value_name = "PATH")]
        config: PathBuf,

        /// Persisted result file from a previous sweep
        #[arg(short, long, value_name = "PATH")]
        input: PathBuf,

        /// Prediction file from a previous predict run
        #[arg(short, long, value_name = "PATH")]
        predictions: PathBuf,

        /// Report file to write (stdout if not specified)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose.tracing_level_filter());

    let result = match cli.command {
        Commands::Sweep {
            config,
            output,
            repetitions,
            capture_dir,
        } => sweep::run(&config, output, repetitions, capture_dir),
        Commands::Predict {
            config,
            input,
            training_percentage,
            output,
        } => predict::run(&config, &input, training_percentage, output),
        Commands::Report {
            config,
            input,
            predictions,
            output,
        } => report::run(&config, &input, &predictions, output),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Initialize structured logging. Output goes to stderr so reports and
/// JSON on stdout remain clean for piping. Default to warn, allowlist
/// our crates at the requested level.
fn init_tracing(level: tracing::level_filters::LevelFilter) {
    let allowlist = CRATES.iter().map(|c| format!("{c}={level}")).join(",");
    let filter = EnvFilter::new(format!("warn,{allowlist}"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
