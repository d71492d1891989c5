//! Sherpa CLI - check a workspace of package manifests

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use sherpa::util::GlobalContext;

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("sherpa=debug")
    } else {
        EnvFilter::new("sherpa=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let mut ctx = GlobalContext::new()?;
    ctx.set_color(!cli.no_color);

    // Execute command
    match cli.command {
        Commands::Check(args) => commands::check::execute(args, &ctx),
        Commands::Scan(args) => commands::scan::execute(args, &ctx),
        Commands::Graph(args) => commands::graph::execute(args, &ctx),
    }
}
