//! `sherpa scan` command

use std::path::Path;

use anyhow::Result;

use crate::cli::ScanArgs;
use sherpa::ops::{ManifestScanner, ScanStrategy};
use sherpa::util::diagnostic::{emit, Diagnostic};
use sherpa::util::fs::relative_path;
use sherpa::util::GlobalContext;

use super::{describe_scan_error, workspace_options};

pub fn execute(args: ScanArgs, ctx: &GlobalContext) -> Result<()> {
    let (root, opts) = workspace_options(&args.workspace, ctx);

    let mut cancel = opts.cancel.clone();
    if let Some(timeout) = opts.timeout {
        cancel = cancel.with_timeout(timeout);
    }

    let scanner = ManifestScanner::new()
        .with_exclude(&opts.exclude)
        .map_err(describe_scan_error)?
        .with_cancel(cancel);

    // Print each manifest as soon as it is found
    let mut strategy = ScanStrategy::new(opts.target.clone(), |path: &Path| {
        println!("{}", relative_path(&root, path).display());
    });

    let outcome = scanner
        .scan_with(&root, &mut strategy)
        .map_err(describe_scan_error)?;

    for warning in &outcome.warnings {
        emit(
            &Diagnostic::warning(format!("skipped: {}", warning.message))
                .with_location(relative_path(&root, &warning.path)),
            ctx.color(),
        );
    }

    tracing::debug!("Found {} manifest(s)", outcome.paths.len());
    Ok(())
}
