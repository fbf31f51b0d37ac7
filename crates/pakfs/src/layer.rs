//! Archive-aware search layer.
//!
//! The host engine usually owns a virtual filesystem that already knows about
//! mod directories and pak containers. [`LayeredRoot`] is the seam through
//! which the resolver asks it for an asset. The resolver treats the layer as
//! opaque: a probe either yields a positioned stream or it does not.

use crate::LogicalPath;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Successful result of [`LayeredRoot::probe`].
///
/// The stream must be positioned at the first byte of the asset. For assets
/// embedded in a container this is somewhere inside the container file; the
/// resolver captures that position as the handle's start offset.
#[derive(Debug)]
pub struct Probe<S> {
    /// Stream positioned at the first byte of the asset
    pub stream: S,
    /// Asset length in bytes
    pub length: u64,
    /// Whether the bytes live inside a container file
    pub from_container: bool,
}

/// Archive-aware capability consulted by the resolver in archive-aware mode.
///
/// Implementations resolve their own override order (mod directories before
/// paks, later paks before earlier ones, and so on).
pub trait LayeredRoot {
    /// Stream type handed out by the layer.
    type Stream: Read + Seek;

    /// Look up an asset. `None` means the layer does not provide it.
    fn probe(&self, path: &LogicalPath) -> Option<Probe<Self::Stream>>;

    /// Give a stream back to the layer.
    ///
    /// Called exactly once per successful probe, either when the handle is
    /// closed or when the resolver abandons the probe. The default simply
    /// drops the stream.
    fn release(&self, stream: Self::Stream) {
        drop(stream);
    }
}

/// Layer that never provides anything.
///
/// Used by resolvers running without an engine filesystem, e.g. in direct
/// mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLayer;

impl LayeredRoot for NoLayer {
    type Stream = File;

    fn probe(&self, _path: &LogicalPath) -> Option<Probe<File>> {
        None
    }
}

/// Layer searching an ordered list of directories for loose files.
///
/// Earlier directories shadow later ones. There is no container support;
/// every probe reports `from_container = false`.
#[derive(Debug, Clone, Default)]
pub struct DirectoryLayer {
    dirs: Vec<PathBuf>,
}

impl DirectoryLayer {
    /// Create a layer over the given directories, highest priority first
    pub fn new<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        Self {
            dirs: dirs.into_iter().map(|d| d.as_ref().to_path_buf()).collect(),
        }
    }

    /// Append a directory with the lowest priority so far
    #[must_use]
    pub fn with_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.dirs.push(dir.as_ref().to_path_buf());
        self
    }

    /// Directories in search order
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }
}

impl LayeredRoot for DirectoryLayer {
    type Stream = File;

    fn probe(&self, path: &LogicalPath) -> Option<Probe<File>> {
        for dir in &self.dirs {
            let full = dir.join(path.as_str());
            let file = match File::open(&full) {
                Ok(file) => file,
                Err(e) => {
                    debug!("Layer miss {}: {e}", full.display());
                    continue;
                }
            };

            match file.metadata() {
                Ok(meta) if meta.is_file() => {
                    debug!("Layer hit {} ({} bytes)", full.display(), meta.len());
                    return Some(Probe {
                        stream: file,
                        length: meta.len(),
                        from_container: false,
                    });
                }
                Ok(_) => debug!("Layer skip {}: not a regular file", full.display()),
                Err(e) => debug!("Layer skip {}: {e}", full.display()),
            }
        }
        None
    }
}
