//! Path resolution pipeline
//!
//! Resolves logical asset paths to open handles by walking the search roots
//! of the configured [`ResolutionMode`] and taking the first hit.

use crate::handle::{FileHandle, Released};
use crate::layer::{LayeredRoot, NoLayer, Probe};
use crate::{LogicalPath, ResolutionMode, ResolverConfig, Result, ResolverError};
use std::fmt;
use std::fs::File;
use std::io::{Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tracing::debug;

/// One candidate source for an asset, in priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchRoot {
    /// The archive-aware layer
    Layered,
    /// A filesystem prefix joined with the logical path. An empty prefix
    /// means the logical path itself, relative to the working directory.
    Plain(PathBuf),
}

impl fmt::Display for SearchRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Layered => f.write_str("<layered>"),
            Self::Plain(prefix) if prefix.as_os_str().is_empty() => f.write_str("<cwd>"),
            Self::Plain(prefix) => write!(f, "{}", prefix.display()),
        }
    }
}

/// A search root applied to a specific logical path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidate {
    /// Ask the layered root for the logical path
    Layered(LogicalPath),
    /// Open this file directly
    Plain(PathBuf),
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Layered(path) => write!(f, "layered:{path}"),
            Self::Plain(path) => write!(f, "file:{}", path.display()),
        }
    }
}

/// Resolves logical paths to [`FileHandle`]s.
///
/// The search roots are derived once from the configuration snapshot:
///
/// - [`ResolutionMode::ArchiveAware`]: the layered root, then `basedir`.
/// - [`ResolutionMode::Direct`]: `mod_dir`, `basedir/<game>` for each active
///   game in order, `basedir`, then the bare logical path.
///
/// Roots that are not configured are left out.
pub struct PathResolver<L: LayeredRoot = NoLayer> {
    config: ResolverConfig,
    layer: L,
    roots: Vec<SearchRoot>,
}

impl PathResolver<NoLayer> {
    /// Create a resolver without an archive-aware layer.
    ///
    /// In archive-aware mode the layered root then never hits and only the
    /// basedir fallback remains.
    pub fn new(config: ResolverConfig) -> Self {
        Self::with_layer(config, NoLayer)
    }
}

impl<L: LayeredRoot> PathResolver<L> {
    /// Create a resolver backed by the given layer
    pub fn with_layer(config: ResolverConfig, layer: L) -> Self {
        let roots = search_roots(&config);
        debug!(
            "Resolver created in {} mode with {} search roots",
            config.mode,
            roots.len()
        );
        Self {
            config,
            layer,
            roots,
        }
    }

    /// Configuration snapshot in use
    pub const fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Archive-aware layer in use
    pub const fn layer(&self) -> &L {
        &self.layer
    }

    /// Search roots in priority order
    pub fn roots(&self) -> &[SearchRoot] {
        &self.roots
    }

    /// Candidates that [`open`](Self::open) would try for `path`, in order.
    pub fn candidates(&self, path: &LogicalPath) -> Vec<Candidate> {
        self.roots
            .iter()
            .map(|root| match root {
                SearchRoot::Layered => Candidate::Layered(path.clone()),
                SearchRoot::Plain(prefix) => Candidate::Plain(prefix.join(path.as_str())),
            })
            .collect()
    }

    /// Open the highest-priority copy of `path`.
    ///
    /// Returns `None` when no search root provides the asset. A miss leaves
    /// no resources behind.
    pub fn open(&self, path: &LogicalPath) -> Option<FileHandle<L::Stream>> {
        self.locate(path).map(|(_, handle)| handle)
    }

    /// Like [`open`](Self::open), but also reports which candidate won.
    pub fn locate(&self, path: &LogicalPath) -> Option<(Candidate, FileHandle<L::Stream>)> {
        for candidate in self.candidates(path) {
            let handle = match &candidate {
                Candidate::Layered(path) => self.open_layered(path),
                Candidate::Plain(full) => open_plain(full),
            };
            if let Some(handle) = handle {
                debug!("Resolved {path} via {candidate} ({} bytes)", handle.length());
                return Some((candidate, handle));
            }
        }

        debug!("Asset not found: {path}");
        None
    }

    /// Like [`open`](Self::open), but reports a miss as an error.
    pub fn try_open(&self, path: &LogicalPath) -> Result<FileHandle<L::Stream>> {
        self.open(path).ok_or_else(|| ResolverError::NotFound {
            path: path.to_string(),
            tried: self.roots.len(),
        })
    }

    /// Close a handle, returning its stream to wherever it came from.
    pub fn close(&self, handle: FileHandle<L::Stream>) {
        match handle.into_released() {
            Released::Plain(file) => drop(file),
            Released::Archived(stream) => self.layer.release(stream),
        }
    }

    fn open_layered(&self, path: &LogicalPath) -> Option<FileHandle<L::Stream>> {
        let Probe {
            mut stream,
            length,
            from_container,
        } = self.layer.probe(path)?;

        // The start offset must be taken before anything else moves the
        // stream; containers share one file between many assets.
        let start = match stream.stream_position() {
            Ok(start) => start,
            Err(e) => {
                debug!("Discarding layered hit for {path}: position unavailable: {e}");
                self.layer.release(stream);
                return None;
            }
        };
        if start.checked_add(length).is_none() {
            debug!("Discarding layered hit for {path}: range {start}+{length} overflows");
            self.layer.release(stream);
            return None;
        }

        Some(FileHandle::archived(stream, start, length, from_container))
    }
}

impl<L: LayeredRoot + fmt::Debug> fmt::Debug for PathResolver<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathResolver")
            .field("config", &self.config)
            .field("layer", &self.layer)
            .field("roots", &self.roots)
            .finish()
    }
}

fn search_roots(config: &ResolverConfig) -> Vec<SearchRoot> {
    let mut roots = Vec::new();

    match config.mode {
        ResolutionMode::ArchiveAware => {
            roots.push(SearchRoot::Layered);
            if let Some(basedir) = config.basedir() {
                roots.push(SearchRoot::Plain(basedir.to_path_buf()));
            }
        }
        ResolutionMode::Direct => {
            if let Some(mod_dir) = config.mod_dir() {
                roots.push(SearchRoot::Plain(mod_dir.to_path_buf()));
            }
            if let Some(basedir) = config.basedir() {
                roots.extend(
                    config
                        .game_names()
                        .map(|game| SearchRoot::Plain(basedir.join(game))),
                );
                roots.push(SearchRoot::Plain(basedir.to_path_buf()));
            }
            roots.push(SearchRoot::Plain(PathBuf::new()));
        }
    }

    roots
}

fn open_plain<S>(full: &Path) -> Option<FileHandle<S>>
where
    S: std::io::Read + Seek,
{
    let mut file = match File::open(full) {
        Ok(file) => file,
        Err(e) => {
            debug!("Miss {}: {e}", full.display());
            return None;
        }
    };

    if !file.metadata().is_ok_and(|meta| meta.is_file()) {
        debug!("Skip {}: not a regular file", full.display());
        return None;
    }

    let length = file
        .seek(SeekFrom::End(0))
        .and_then(|length| file.seek(SeekFrom::Start(0)).map(|_| length));
    match length {
        Ok(length) => Some(FileHandle::plain(file, length)),
        Err(e) => {
            debug!("Skip {}: cannot determine length: {e}", full.display());
            None
        }
    }
}
