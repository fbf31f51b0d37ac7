//! Shared fixtures for resolver integration tests.
#![allow(dead_code, clippy::expect_used, clippy::unwrap_used)]

use pakfs::{LayeredRoot, LogicalPath, Probe};
use std::cell::Cell;
use std::collections::HashMap;
use std::fs::File;
use std::io::{Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Write `contents` to `root/relative`, creating parent directories.
pub fn write_file(root: &Path, relative: &str, contents: &[u8]) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent");
    }
    std::fs::write(path, contents).expect("write fixture");
}

pub fn logical(path: &str) -> LogicalPath {
    LogicalPath::new(path).expect("valid logical path")
}

/// Deterministic filler so that reads from a wrong offset are detectable.
pub fn pattern(len: usize, seed: u8) -> Vec<u8> {
    (0..len)
        .map(|i| (i % 251) as u8 ^ seed)
        .collect()
}

/// A flat container file: assets stored back to back at recorded offsets.
///
/// Stands in for the engine's pak layer. Each probe opens the container
/// fresh and leaves the cursor at the first byte of the asset.
pub struct ContainerLayer {
    path: PathBuf,
    entries: HashMap<String, (u64, u64)>,
    live: Rc<Cell<usize>>,
    released: Rc<Cell<usize>>,
}

impl ContainerLayer {
    /// Build a container of `total` bytes of filler at `path` and place each
    /// asset at its requested offset.
    pub fn build(path: &Path, total: usize, assets: &[(&str, u64, &[u8])]) -> Self {
        let mut data = pattern(total, 0x5A);
        let mut entries = HashMap::new();
        for (name, offset, bytes) in assets {
            let start = usize::try_from(*offset).expect("offset fits");
            let end = start + bytes.len();
            if data.len() < end {
                data.resize(end, 0);
            }
            data[start..end].copy_from_slice(bytes);
            entries.insert((*name).to_string(), (*offset, bytes.len() as u64));
        }
        std::fs::write(path, &data).expect("write container");

        Self {
            path: path.to_path_buf(),
            entries,
            live: Rc::new(Cell::new(0)),
            released: Rc::new(Cell::new(0)),
        }
    }

    /// Streams handed out and not yet released
    pub fn live_streams(&self) -> Rc<Cell<usize>> {
        Rc::clone(&self.live)
    }

    /// Streams given back through `release`
    pub fn released_streams(&self) -> Rc<Cell<usize>> {
        Rc::clone(&self.released)
    }
}

impl LayeredRoot for ContainerLayer {
    type Stream = File;

    fn probe(&self, path: &LogicalPath) -> Option<Probe<File>> {
        let &(offset, length) = self.entries.get(path.as_str())?;
        let mut file = File::open(&self.path).ok()?;
        file.seek(SeekFrom::Start(offset)).ok()?;
        self.live.set(self.live.get() + 1);
        Some(Probe {
            stream: file,
            length,
            from_container: true,
        })
    }

    fn release(&self, stream: File) {
        self.live.set(self.live.get() - 1);
        self.released.set(self.released.get() + 1);
        drop(stream);
    }
}
