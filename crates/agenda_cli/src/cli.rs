use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "agenda", about = "People, activities, and overlap merging", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log level: trace|debug|info|warn|error. Defaults by build mode.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Absolute directory for rolling log files. Logging is off when unset.
    #[arg(long, global = true)]
    pub log_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print core linkage and version
    Ping,
    /// Collapse overlapping activities linked to one person
    Merge(MergeArgs),
}

#[derive(Args)]
pub struct MergeArgs {
    /// SQLite database file
    #[arg(long)]
    pub db: PathBuf,

    /// Person whose activities are merged
    #[arg(long)]
    pub person: Uuid,

    /// End time a candidate is compared against while scanning a run
    #[arg(long, value_enum, default_value_t = RuleArg::LastMember)]
    pub rule: RuleArg,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum RuleArg {
    LastMember,
    RunningMax,
}
