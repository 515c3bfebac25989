//! CLI command definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tally_domain::{StrategyKind, TieBreakPolicy};

/// Output format for round results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Decision, tally and every vote
    Full,
    /// Decision and tally only
    Summary,
    /// JSON output
    Json,
}

impl From<OutputFormat> for tally_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Full => tally_domain::OutputFormat::Full,
            OutputFormat::Summary => tally_domain::OutputFormat::Summary,
            OutputFormat::Json => tally_domain::OutputFormat::Json,
        }
    }
}

/// CLI arguments for tally
#[derive(Parser, Debug)]
#[command(name = "tally")]
#[command(author, version, about = "Multi-agent voting for critical operations")]
#[command(long_about = r#"
Tally runs N independent workers on the same task and aggregates their
categorical answers into one decision.

Strategies:
  majority              Most frequent category after every worker reports
  unanimous             Decision only if every non-abstain vote agrees
  first_to_ahead_by_k   Stops as soon as one category leads by k votes
  weighted              Majority by per-worker weight

Configuration files are loaded from (in priority order):
1. TALLY_* environment variables
2. --config <path>     Explicit config file
3. ./tally.toml        Project-level config (or tally.yaml)
4. ~/.config/tally/config.toml   Global config

Exit codes: 0 decision, 1 no decision, 2 configuration or runtime error.

Example:
  tally run deploy_gate --context '{"diff": "..."}'
  tally aggregate --votes '["approve","approve","reject"]' --strategy unanimous
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(long, value_enum, global = true)]
    pub format: Option<OutputFormat>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Directory for JSONL round logs and the diagnostic log file
    #[arg(long, value_name = "DIR", global = true)]
    pub log_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a voting round for a configured operation
    Run(RunArgs),

    /// Aggregate an already-collected vote sequence
    Aggregate(AggregateArgs),

    /// Show configuration file locations and configured operations
    ShowConfig,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Operation name from the [operations] table
    pub operation: String,

    /// Task context as a JSON string, forwarded to every worker
    #[arg(long, value_name = "JSON", conflicts_with = "context_file")]
    pub context: Option<String>,

    /// Read the task context from a JSON file
    #[arg(long, value_name = "PATH")]
    pub context_file: Option<PathBuf>,

    /// Also write the result as JSON to this file
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct AggregateArgs {
    /// Votes in arrival order as a JSON array, e.g. '["approve","reject"]'
    #[arg(long, value_name = "JSON")]
    pub votes: String,

    /// Aggregation strategy
    #[arg(long, value_parser = parse_strategy, default_value = "majority")]
    pub strategy: StrategyKind,

    /// Required margin for first_to_ahead_by_k
    #[arg(short, long, default_value_t = 2)]
    pub k: usize,

    /// Tie-break policy
    #[arg(long, value_parser = parse_tie_break, default_value = "reject")]
    pub tie_break: TieBreakPolicy,

    /// Per-vote weights as a JSON array (weighted strategy)
    #[arg(long, value_name = "JSON")]
    pub weights: Option<String>,

    /// Also write the result as JSON to this file
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

fn parse_strategy(s: &str) -> Result<StrategyKind, String> {
    s.parse().map_err(|e: tally_domain::ConfigError| e.to_string())
}

fn parse_tie_break(s: &str) -> Result<TieBreakPolicy, String> {
    s.parse().map_err(|e: tally_domain::ConfigError| e.to_string())
}
