//! pakfs binary entry point.
//!
//! Thin wrapper around the pakfs library that:
//! 1. Parses command-line arguments
//! 2. Initializes logging (stderr, so `cat` output stays clean)
//! 3. Builds the resolver configuration
//! 4. Runs the requested subcommand

use anyhow::Result;
use clap::Parser;
use pakfs::{DirectoryLayer, PathResolver};

mod args;
mod commands;

use args::Cli;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = cli.resolver.to_config()?;
    config.validate()?;

    tracing::debug!(
        "Configuration loaded: mode={}, mod_dir={:?}, basedir={:?}, games={:?}, search_dirs={:?}",
        config.mode,
        config.mod_dir(),
        config.basedir(),
        config.games,
        cli.resolver.search_dirs
    );

    let layer = DirectoryLayer::new(&cli.resolver.search_dirs);
    let resolver = PathResolver::with_layer(config, layer);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    commands::run(&resolver, &cli.command, &mut out)
}
