//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Tripcheck - classify and run trip data checks
#[derive(Parser, Debug)]
#[command(name = "tripcheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory searched for tripcheck.yml
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Override database path (`:memory:` for a scratch database)
    #[arg(short, long, global = true, env = "TRIPCHECK_DATABASE")]
    pub database: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage the check catalog
    Catalog(CatalogArgs),

    /// Register trips
    Trip(TripArgs),

    /// Classify the catalog for on-device executability
    Classify(ClassifyArgs),

    /// Run every runnable check against one trip
    Run(RunArgs),

    /// Show the issues of a trip's latest completed run
    Issues(IssuesArgs),

    /// One-line check summary for a trip
    Summary(SummaryArgs),

    /// Show or change a trip's sync status
    Status(StatusArgs),

    /// List every tracked trip with its sync status
    SyncList(SyncListArgs),
}

/// Arguments for the catalog command
#[derive(Args, Debug)]
pub struct CatalogArgs {
    #[command(subcommand)]
    pub command: CatalogCommands,
}

#[derive(Subcommand, Debug)]
pub enum CatalogCommands {
    /// Replace the catalog with the checks in a JSON file
    Load {
        /// JSON array of {id, message, sql, debriefer_only?}
        path: String,
    },
}

/// Arguments for the trip command
#[derive(Args, Debug)]
pub struct TripArgs {
    #[command(subcommand)]
    pub command: TripCommands,
}

#[derive(Subcommand, Debug)]
pub enum TripCommands {
    /// Register a trip so checks can run against it
    Add {
        trip_id: i64,

        /// Observer who created the trip
        #[arg(short, long)]
        user: Option<i64>,
    },
}

/// Arguments for the classify command
#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Reclassify even when the cache is current
    #[arg(short, long)]
    pub force: bool,
}

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Trip to check
    pub trip_id: i64,

    /// Observer running the checks
    #[arg(short, long)]
    pub user: i64,

    /// Hide the progress bar
    #[arg(short, long)]
    pub quiet: bool,
}

/// Arguments for the issues command
#[derive(Args, Debug)]
pub struct IssuesArgs {
    pub trip_id: i64,

    /// Include issues from debriefer-only checks
    #[arg(long)]
    pub debriefer: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: OutputFormat,
}

/// Arguments for the summary command
#[derive(Args, Debug)]
pub struct SummaryArgs {
    pub trip_id: i64,

    /// Also print issue counts per haul
    #[arg(long)]
    pub hauls: bool,
}

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    pub trip_id: i64,

    /// Change to apply; prints the current status when omitted
    #[arg(value_enum)]
    pub action: Option<StatusAction>,
}

/// Sync status changes
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusAction {
    /// Mark the trip ready to upload
    Ready,
    /// Return the trip to data entry
    InProgress,
    /// Advance one step around the manual cycle
    Cycle,
    /// Record a failed upload
    Failed,
    /// Record a successful upload
    Completed,
}

/// Arguments for the sync-list command
#[derive(Args, Debug)]
pub struct SyncListArgs {
    /// Start tracking every registered trip first
    #[arg(long)]
    pub track_all: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: OutputFormat,
}

/// Output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON output
    Json,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
