//! The depsum command-line interface: skip expensive build steps when nothing they depend on changed.
//!
//! Provides `depsum check` to classify an entry file as changed or unchanged
//! against the registry, `depsum hash` to print the aggregate digest of its
//! dependency graph, and `depsum deps` to list the modules that graph contains.

#![warn(missing_docs)]

mod check;
mod deps;
mod hash;
mod logger;
mod options;

use std::process;

use clap::{Parser, Subcommand, ValueEnum};

/// Content-hash change detection for JavaScript dependency graphs.
#[derive(Parser, Debug)]
#[command(name = "depsum", version, about = "Dependency graph change detection")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a custom `depsum.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Report whether the sources behind an entry file changed since the last run.
    Check(CheckArgs),
    /// Print the aggregate digest of an entry file's dependency graph.
    Hash(HashArgs),
    /// List the modules reachable from an entry file.
    Deps(DepsArgs),
}

/// Arguments for the `depsum check` subcommand.
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Entry file of the dependency graph.
    pub entry: String,

    /// Registry file (overrides `registry.path`).
    #[arg(long)]
    pub hash_file: Option<String>,

    /// Module specifiers not traversed (e.g., `--exclude lodash react`).
    #[arg(short, long, num_args = 1..)]
    pub exclude: Vec<String>,

    /// Extra files that participate in the digest.
    #[arg(short, long, num_args = 1..)]
    pub include: Vec<String>,

    /// Upper bound on hashing (e.g., "500ms", "30s", "2m").
    #[arg(long)]
    pub timeout: Option<String>,

    /// Report a missing entry file as unchanged instead of failing.
    #[arg(long)]
    pub skip_missing: bool,

    /// Output format for the result.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Arguments for the `depsum hash` subcommand.
#[derive(Parser, Debug)]
pub struct HashArgs {
    /// Entry file of the dependency graph.
    pub entry: String,

    /// Module specifiers not traversed.
    #[arg(short, long, num_args = 1..)]
    pub exclude: Vec<String>,

    /// Extra files that participate in the digest.
    #[arg(short, long, num_args = 1..)]
    pub include: Vec<String>,

    /// Upper bound on hashing.
    #[arg(long)]
    pub timeout: Option<String>,

    /// Also print the digest of every module.
    #[arg(long)]
    pub snapshot: bool,

    /// Output format for the result.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Arguments for the `depsum deps` subcommand.
#[derive(Parser, Debug)]
pub struct DepsArgs {
    /// Entry file of the dependency graph.
    pub entry: String,

    /// Module specifiers not traversed.
    #[arg(short, long, num_args = 1..)]
    pub exclude: Vec<String>,

    /// Output format for the module list.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Result output format.
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
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logger::init_logger(cli.verbose, cli.quiet);

    let global = GlobalArgs {
        quiet: cli.quiet,
        config: cli.config,
    };

    let result = match cli.command {
        Command::Check(ref args) => check::run(args, &global).await,
        Command::Hash(ref args) => hash::run(args, &global).await,
        Command::Deps(ref args) => deps::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
