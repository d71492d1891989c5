//! `sherpa graph` command

use anyhow::Result;

use crate::cli::GraphArgs;
use sherpa::ops::{load_workspace, DependencyGraph};
use sherpa::util::diagnostic::{emit, Diagnostic};
use sherpa::util::fs::relative_path;
use sherpa::util::GlobalContext;

use super::{describe_check_error, workspace_options};

pub fn execute(args: GraphArgs, ctx: &GlobalContext) -> Result<()> {
    let (root, opts) = workspace_options(&args.workspace, ctx);

    let workspace = load_workspace(&root, &opts).map_err(describe_check_error)?;
    let graph = DependencyGraph::build(&workspace.map, &opts.internal_types);

    for (from, to) in graph.edges() {
        println!("{} -> {}", from, to);
    }

    for failure in &workspace.load_failures {
        emit(
            &Diagnostic::warning(format!("not in graph: {}", failure.error.message))
                .with_location(relative_path(&root, &failure.path)),
            ctx.color(),
        );
    }
    for dangling in graph.dangling() {
        emit(&Diagnostic::warning(dangling.to_string()), ctx.color());
    }

    tracing::debug!(
        "{} manifest(s), {} edge(s)",
        graph.node_count(),
        graph.edge_count()
    );
    Ok(())
}
