//! Configuration snapshot for the resolver
//!
//! The resolver never reads process-wide state. The host copies its mod
//! directory, base directory and active game list into a [`ResolverConfig`]
//! and hands it over at construction time.

use crate::{Result, ResolverError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::warn;

/// Which search order the resolver applies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolutionMode {
    /// Layered root first, then `basedir/<path>`.
    #[default]
    ArchiveAware,
    /// Mod dir, each game dir, basedir, then the bare path.
    Direct,
}

impl fmt::Display for ResolutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ArchiveAware => f.write_str("archive-aware"),
            Self::Direct => f.write_str("direct"),
        }
    }
}

impl FromStr for ResolutionMode {
    type Err = ResolverError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "archive-aware" => Ok(Self::ArchiveAware),
            "direct" => Ok(Self::Direct),
            other => Err(ResolverError::Config(format!(
                "unknown resolution mode '{other}' (expected 'archive-aware' or 'direct')"
            ))),
        }
    }
}

/// Configuration for the resolver
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Search order to apply
    pub mode: ResolutionMode,

    /// Mod directory consulted first in direct mode
    pub mod_dir: Option<PathBuf>,

    /// Base directory holding game directories and loose UI files
    pub basedir: Option<PathBuf>,

    /// Semicolon-separated active game names, highest priority first
    pub games: String,
}

impl ResolverConfig {
    /// Create a configuration using the given search order
    pub fn new(mode: ResolutionMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    /// Load a configuration snapshot from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ResolverError::ConfigLoad {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Set the search order
    #[must_use]
    pub const fn with_mode(mut self, mode: ResolutionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the mod directory
    #[must_use]
    pub fn with_mod_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.mod_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the base directory
    #[must_use]
    pub fn with_basedir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.basedir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the semicolon-separated game list
    #[must_use]
    pub fn with_games(mut self, games: impl Into<String>) -> Self {
        self.games = games.into();
        self
    }

    /// Effective mod directory. An empty path counts as unset.
    pub fn mod_dir(&self) -> Option<&Path> {
        non_empty(self.mod_dir.as_deref())
    }

    /// Effective base directory. An empty path counts as unset.
    pub fn basedir(&self) -> Option<&Path> {
        non_empty(self.basedir.as_deref())
    }

    /// Active game names in priority order.
    ///
    /// Entries are trimmed and empty entries skipped, so `"id1;;hipnotic;"`
    /// yields `id1` and `hipnotic`.
    pub fn game_names(&self) -> impl Iterator<Item = &str> {
        self.games
            .split(';')
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    /// Validate configuration.
    ///
    /// # Errors
    ///
    /// Returns `ResolverError::Config` if a game name would point outside
    /// the base directory.
    pub fn validate(&self) -> Result<()> {
        for name in self.game_names() {
            if name == ".." || name == "." || name.contains(['/', '\\']) {
                return Err(ResolverError::Config(format!(
                    "game name '{name}' must be a single directory name"
                )));
            }
        }

        if self.mode == ResolutionMode::Direct
            && self.basedir().is_none()
            && self.game_names().next().is_some()
        {
            warn!(
                "Game list '{}' is ignored without a base directory",
                self.games
            );
        }

        if let Some(basedir) = self.basedir()
            && !basedir.is_dir()
        {
            warn!("Base directory does not exist: {}", basedir.display());
        }

        Ok(())
    }
}

fn non_empty(path: Option<&Path>) -> Option<&Path> {
    path.filter(|p| !p.as_os_str().is_empty())
}
