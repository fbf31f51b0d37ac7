//! Command-line arguments.
//!
//! Resolver settings come from, in increasing precedence: defaults, a JSON
//! snapshot (`--config`), environment variables (`PAKFS_*`) and flags.

use clap::{Args, Parser, Subcommand};
use pakfs::{ResolutionMode, ResolverConfig};
use std::path::PathBuf;

/// Top-level command line.
#[derive(Debug, Parser)]
#[command(
    name = "pakfs",
    about = "Resolve game UI assets through mod, game and pak search layers",
    version
)]
pub struct Cli {
    /// Resolver settings
    #[command(flatten)]
    pub resolver: ResolverArgs,

    /// Action to perform
    #[command(subcommand)]
    pub command: Command,
}

/// Resolver settings shared by every subcommand.
#[derive(Debug, Default, Args)]
pub struct ResolverArgs {
    /// JSON configuration snapshot; the flags below override its fields
    #[arg(long, env = "PAKFS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Search order: `archive-aware` or `direct`
    #[arg(long, env = "PAKFS_MODE", value_name = "MODE")]
    pub mode: Option<ResolutionMode>,

    /// Mod directory (direct mode)
    #[arg(long, env = "PAKFS_MOD_DIR")]
    pub mod_dir: Option<PathBuf>,

    /// Base directory
    #[arg(long, env = "PAKFS_BASEDIR")]
    pub basedir: Option<PathBuf>,

    /// Semicolon-separated active games, highest priority first (direct mode)
    #[arg(long, env = "PAKFS_GAMES")]
    pub games: Option<String>,

    /// Directory searched by the layered root, highest priority first
    /// (archive-aware mode, repeatable)
    #[arg(long = "search-dir", value_name = "DIR")]
    pub search_dirs: Vec<PathBuf>,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Write an asset's bytes to stdout
    Cat {
        /// Logical asset path, e.g. ui/menu/main.rml
        path: String,
    },
    /// Show where an asset resolves and its handle bookkeeping
    Stat {
        /// Logical asset path
        path: String,
    },
    /// List the candidates tried for a path and mark the winner
    Explain {
        /// Logical asset path
        path: String,
    },
}

impl ResolverArgs {
    /// Build the configuration snapshot these arguments describe.
    pub fn to_config(&self) -> pakfs::Result<ResolverConfig> {
        let mut config = match &self.config {
            Some(path) => ResolverConfig::from_json_file(path)?,
            None => ResolverConfig::default(),
        };

        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(mod_dir) = &self.mod_dir {
            config.mod_dir = Some(mod_dir.clone());
        }
        if let Some(basedir) = &self.basedir {
            config.basedir = Some(basedir.clone());
        }
        if let Some(games) = &self.games {
            config.games.clone_from(games);
        }

        Ok(config)
    }
}
