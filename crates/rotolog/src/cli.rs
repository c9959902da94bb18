//! CLI argument definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rotolog")]
#[command(version, about = "Pipe log output into rotating files (daily or size-capped)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output in JSON format instead of tables
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Copy stdin into rotating log files
    Pipe(PipeArgs),

    /// Run one cleanup pass and report what was removed
    Cleanup(RotatorArgs),

    /// List the files under management
    Files(RotatorArgs),

    /// Show the last lines across the managed files
    Tail(TailArgs),
}

/// Where the rotator lives and which policy it uses.
///
/// Without `--config` and without any policy flag, a `rotolog.*` file in the
/// current directory is used.
#[derive(Args, Debug, Clone, Default)]
pub struct RotatorArgs {
    /// Config file (.toml, .yaml, .yml or .json)
    #[arg(short, long, env = "ROTOLOG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log folder (overrides the config file's folder)
    #[arg(short, long, env = "ROTOLOG_FOLDER")]
    pub folder: Option<PathBuf>,

    /// One file per day, deleted after N days
    #[arg(long, conflicts_with_all = ["size_mb", "size_bytes"])]
    pub days: Option<u32>,

    /// Two alternating files within N megabytes (1 MB = 1,000,000 bytes)
    #[arg(long, conflicts_with = "size_bytes")]
    pub size_mb: Option<u64>,

    /// Two alternating files within N bytes
    #[arg(long)]
    pub size_bytes: Option<u64>,

    /// strftime pattern for daily file names (default: %Y-%m-%d)
    #[arg(long, requires = "days")]
    pub format: Option<String>,

    /// One file per hour instead of per day
    #[arg(long, requires = "days", conflicts_with = "format")]
    pub hourly: bool,

    /// Rotate only when the day-of-month number changes
    #[arg(long, requires = "days")]
    pub legacy_day_of_month: bool,

    /// File name prefix for size rotation (default: half-)
    #[arg(long)]
    pub prefix: Option<String>,

    /// File suffix (default: .log)
    #[arg(long)]
    pub suffix: Option<String>,
}

impl RotatorArgs {
    pub fn has_policy_flags(&self) -> bool {
        self.days.is_some() || self.size_mb.is_some() || self.size_bytes.is_some()
    }
}

#[derive(Args)]
pub struct PipeArgs {
    #[command(flatten)]
    pub rotator: RotatorArgs,

    /// Also copy the input to stdout
    #[arg(long)]
    pub tee: bool,
}

#[derive(Args)]
pub struct TailArgs {
    #[command(flatten)]
    pub rotator: RotatorArgs,

    /// Number of lines to show
    #[arg(short = 'n', long, default_value = "20")]
    pub lines: usize,

    /// Only show lines matching this regex
    #[arg(short, long)]
    pub grep: Option<String>,
}
