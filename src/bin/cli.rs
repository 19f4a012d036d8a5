//! callmap CLI - static call graphs for Python projects.

use anyhow::Context;
use callmap::cli::{run, Cli};
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = try_main(&cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn try_main(cli: &Cli) -> anyhow::Result<()> {
    run(cli).with_context(|| format!("failed to analyse {}", cli.root.display()))
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("callmap=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
