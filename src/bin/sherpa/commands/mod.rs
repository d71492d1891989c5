//! Command implementations

pub mod check;
pub mod graph;
pub mod scan;

use std::path::PathBuf;

use anyhow::anyhow;
use miette::Diagnostic as _;

use sherpa::ops::{CheckError, CheckOptions, ScanError};
use sherpa::util::diagnostic::suggestions;
use sherpa::util::fs::absolute_path;
use sherpa::util::GlobalContext;

use crate::cli::WorkspaceArgs;

/// Resolve the workspace root and the options from config plus flags.
fn workspace_options(args: &WorkspaceArgs, ctx: &GlobalContext) -> (PathBuf, CheckOptions) {
    let root = absolute_path(&ctx.workspace_root(args.path.as_deref()));
    let config = ctx.load_config(&root);

    let mut opts = CheckOptions::from_config(&config);
    if let Some(target) = &args.target {
        opts = opts.with_target(target.clone());
    }

    (root, opts)
}

/// Turn a scan failure into an error message with its help line.
fn describe_scan_error(err: ScanError) -> anyhow::Error {
    let help = err.help().map(|h| h.to_string());
    match help {
        Some(help) => anyhow!("{}\nhelp: {}", err, help),
        None => anyhow!(err),
    }
}

/// Turn a run failure into an error message with its help line.
fn describe_check_error(err: CheckError) -> anyhow::Error {
    match err {
        CheckError::Scan(scan) => describe_scan_error(scan),
        err @ CheckError::NoManifests { .. } => {
            anyhow!("{}\nhelp: {}", err, suggestions::NO_MANIFESTS)
        }
        other => anyhow!(other),
    }
}
