//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Sherpa - check a workspace of sherpa.json manifests
#[derive(Parser)]
#[command(name = "sherpa")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate every manifest in a workspace and its dependency graph
    Check(CheckArgs),

    /// List the manifest files in a workspace
    Scan(ScanArgs),

    /// Print the internal dependency edges of a workspace
    Graph(GraphArgs),
}

/// Options shared by every command.
#[derive(Args)]
pub struct WorkspaceArgs {
    /// Workspace root (defaults to the current directory)
    pub path: Option<PathBuf>,

    /// Manifest file name to look for
    #[arg(long, env = "SHERPA_TARGET")]
    pub target: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Diagnostics for a terminal
    Human,
    /// Pretty-printed JSON report
    Json,
}

#[derive(Args)]
pub struct CheckArgs {
    #[command(flatten)]
    pub workspace: WorkspaceArgs,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,

    /// Number of worker threads
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Give up on discovery after this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Fail when no manifest is found
    #[arg(long)]
    pub require_manifests: bool,
}

#[derive(Args)]
pub struct ScanArgs {
    #[command(flatten)]
    pub workspace: WorkspaceArgs,
}

#[derive(Args)]
pub struct GraphArgs {
    #[command(flatten)]
    pub workspace: WorkspaceArgs,
}
