use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use lottocover_rs::{Backend, CacheOptions};

#[derive(Parser, Debug)]
#[command(
    name = "lottocover",
    about = "Coverage analysis and verification for lottery covering designs"
)]
pub struct Cli {
    /// Optional log file; log lines are appended in addition to stdout.
    #[arg(long = "log-file", global = true, value_hint = clap::ValueHint::FilePath)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the derived counts of a lottery problem
    Info(ProblemArgs),
    /// Verify that a set of tickets covers every possible draw
    Verify(VerifyArgs),
}

#[derive(Parser, Debug)]
pub struct ProblemArgs {
    /// Total count of numbers in the lottery (n)
    #[arg(long = "numbers", short = 'n')]
    pub total_num_count: usize,

    /// Numbers picked per ticket (k)
    #[arg(long = "ticket-size", short = 'k')]
    pub num_count_in_ticket: usize,

    /// Numbers selected per draw (p)
    #[arg(long = "draw-size", short = 'p')]
    pub num_count_in_draw: usize,

    /// Minimum matches for a ticket to win (t)
    #[arg(long = "min-matches", short = 't')]
    pub min_matched_num_count: usize,
}

#[derive(Parser, Debug)]
pub struct VerifyArgs {
    #[command(flatten)]
    pub problem: ProblemArgs,

    /// File with one ticket per line, numbers separated by commas or spaces
    #[arg(long = "tickets", value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    pub tickets_path: PathBuf,

    /// Storage strategy for draw sets
    #[arg(long, default_value = "sparse")]
    pub backend: BackendValue,

    /// Precompute the covered-draw set of every ticket before verifying
    #[arg(long = "cache-covered-draws", default_value_t = false)]
    pub cache_covered_draws: bool,

    /// JSON run configuration supplying the backend and cache choices,
    /// replacing the individual flags
    #[arg(
        long = "config",
        value_name = "FILE",
        value_hint = clap::ValueHint::FilePath,
        conflicts_with_all = ["backend", "cache_covered_draws"]
    )]
    pub config_path: Option<PathBuf>,

    /// Report per-ticket redundancy after verification
    #[arg(long, default_value_t = false)]
    pub redundancy: bool,

    /// Report the pairwise ticket overlap histogram after verification
    #[arg(long, default_value_t = false)]
    pub overlap: bool,

    /// Report the draw cover-frequency distribution after verification
    #[arg(long, default_value_t = false)]
    pub distribution: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum BackendValue {
    Sparse,
    Dense,
}

impl From<BackendValue> for Backend {
    fn from(value: BackendValue) -> Self {
        match value {
            BackendValue::Sparse => Backend::Sparse,
            BackendValue::Dense => Backend::Dense,
        }
    }
}

/// Effective `verify` run configuration: either assembled from the
/// individual flags or deserialized whole from a `--config` JSON file.
/// Every field falls back to its default when omitted from the file.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub backend: Backend,
    #[serde(default)]
    pub caches: CacheOptions,
}
