//! # CLI Support
//!
//! `eqprobe list | generate | run | history | fields`. Command output goes to stdout;
//! logs go to stderr.

pub mod handlers;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::environment::parse_assignment;
use crate::http::client::DEFAULT_TIMEOUT_MS;

#[derive(Debug, Parser)]
#[command(
    name = "eqprobe",
    version,
    about = "Equivalence-class black-box tests for a REST API"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the scenarios of a collection
    List(CollectionArgs),
    /// Print every generated case of one scenario without sending anything
    Generate(GenerateArgs),
    /// Send every generated case and check the status codes
    Run(RunArgs),
    /// Show recorded runs
    History(HistoryArgs),
    /// Print the valid/invalid partitions of the field table
    Fields,
}

#[derive(Debug, Clone, Args)]
pub struct CollectionArgs {
    /// JSON collection file; the built-in catalog is used when omitted
    #[arg(long)]
    pub collection: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    pub scenario: String,

    #[command(flatten)]
    pub collection: CollectionArgs,

    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    #[arg(long, env = "EQPROBE_BASE_URL")]
    pub base_url: String,

    /// Scenario to run; repeat for several. Runs all when omitted.
    #[arg(long = "scenario")]
    pub scenarios: Vec<String>,

    #[command(flatten)]
    pub collection: CollectionArgs,

    /// JSON object of variables used to fill `{{placeholders}}`
    #[arg(long)]
    pub vars: Option<PathBuf>,

    /// KEY=VALUE, overrides the variables file
    #[arg(long = "var", value_parser = parse_assignment)]
    pub overrides: Vec<(String, String)>,

    #[arg(long, env = "EQPROBE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Per-request timeout; 0 disables it
    #[arg(long, env = "EQPROBE_TIMEOUT_MS", default_value_t = DEFAULT_TIMEOUT_MS)]
    pub timeout_ms: u64,

    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,

    /// Write the JSON report here
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Record the run in this SQLite file
    #[arg(long)]
    pub history: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct HistoryArgs {
    #[arg(long)]
    pub db: PathBuf,

    #[arg(long, default_value_t = 20)]
    pub limit: usize,

    /// Print the full report of one run
    #[arg(long)]
    pub show: Option<i64>,
}

/// Output format for command output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}
