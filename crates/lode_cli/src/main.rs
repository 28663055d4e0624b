//! lode CLI — the command-line interface for the lode asset pipeline.
//!
//! Provides `lode build` for running the full pipeline (graph, transform,
//! chunk, emit) and `lode graph` for inspecting the resolved module graph
//! and chunk plan without writing anything.

#![warn(missing_docs)]

mod build;
mod graph;
mod pipeline;
mod report;

use std::process;

use clap::{Parser, Subcommand, ValueEnum};

/// lode — a deterministic asset build pipeline.
#[derive(Parser, Debug)]
#[command(name = "lode", version, about = "lode asset build pipeline")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a custom `lode.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the full build pipeline.
    Build(BuildArgs),
    /// Print the resolved module graph and chunk plan without building.
    Graph(GraphArgs),
}

/// Arguments for the `lode build` subcommand.
#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// Override the configured build mode.
    #[arg(long, value_enum)]
    pub mode: Option<CliMode>,

    /// Number of worker threads (default: one per logical CPU).
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Disable the incremental cache for this build.
    #[arg(long)]
    pub no_cache: bool,

    /// Output format for failure reports.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Arguments for the `lode graph` subcommand.
#[derive(Parser, Debug)]
pub struct GraphArgs {
    /// Output format for failure reports.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Build mode override from the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum CliMode {
    /// Development build.
    Dev,
    /// Production build.
    Prod,
}

/// Failure report output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose information.
    pub verbose: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
    };

    let result = match cli.command {
        Command::Build(ref args) => build::run(args, &global),
        Command::Graph(ref args) => graph::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
