//! `sherpa check` command

use std::time::Duration;

use anyhow::Result;

use crate::cli::{CheckArgs, OutputFormat};
use sherpa::ops::check_workspace;
use sherpa::util::GlobalContext;

use super::{describe_check_error, workspace_options};

pub fn execute(args: CheckArgs, ctx: &GlobalContext) -> Result<()> {
    let (root, mut opts) = workspace_options(&args.workspace, ctx);

    if let Some(jobs) = args.jobs {
        opts = opts.with_jobs(jobs);
    }
    if let Some(secs) = args.timeout {
        opts = opts.with_timeout(Duration::from_secs(secs));
    }
    if args.require_manifests {
        opts.require_manifests = true;
    }

    let report = check_workspace(&root, &opts).map_err(describe_check_error)?;

    match args.format {
        OutputFormat::Human => print!("{}", report.render_human(ctx.color())),
        OutputFormat::Json => println!("{}", report.to_json()?),
    }

    // Exit with error code if any manifest has problems
    if !report.is_clean() {
        std::process::exit(1);
    }

    Ok(())
}
