//! Open asset handles.
//!
//! A [`FileHandle`] presents one asset as a bounded byte range `[0, length)`
//! regardless of where the bytes physically live. Plain handles own a loose
//! file; archived handles own a stream from the layered root whose asset
//! bytes begin at some `start` offset, possibly inside a larger container.
//!
//! Positions are tracked by the handle itself. The underlying stream's
//! cursor is only trusted for the duration of a single operation: archived
//! reads reposition to `start + pos` before touching the stream.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use tracing::{debug, trace};

/// Reference point for [`FileHandle::seek`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekOrigin {
    /// Offset from the first byte of the asset
    Start,
    /// Offset from the current position
    Current,
    /// Offset from the end of the asset
    End,
}

/// Where the bytes behind a handle came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleOrigin {
    /// A loose file opened directly from a plain root
    Plain,
    /// A stream handed out by the layered root
    Archived,
}

/// Snapshot of a handle's bookkeeping, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandleInfo {
    /// Origin kind
    pub origin: HandleOrigin,
    /// Physical offset of the first asset byte in the underlying stream
    pub start: u64,
    /// Logical position
    pub pos: u64,
    /// Logical length
    pub length: u64,
    /// Whether the layered root reported the bytes as container-embedded
    pub from_container: bool,
}

enum Source<S> {
    Plain(File),
    Archived {
        stream: S,
        start: u64,
        from_container: bool,
    },
}

/// Underlying stream recovered from a handle being closed.
pub(crate) enum Released<S> {
    Plain(File),
    Archived(S),
}

/// An open asset.
///
/// Created by [`PathResolver::open`](crate::PathResolver::open) and
/// destroyed by [`PathResolver::close`](crate::PathResolver::close). The
/// handle exclusively owns its stream.
pub struct FileHandle<S = File> {
    source: Source<S>,
    pos: u64,
    length: u64,
}

impl<S: Read + Seek> FileHandle<S> {
    pub(crate) const fn plain(file: File, length: u64) -> Self {
        Self {
            source: Source::Plain(file),
            pos: 0,
            length,
        }
    }

    pub(crate) const fn archived(stream: S, start: u64, length: u64, from_container: bool) -> Self {
        Self {
            source: Source::Archived {
                stream,
                start,
                from_container,
            },
            pos: 0,
            length,
        }
    }

    pub(crate) fn into_released(self) -> Released<S> {
        match self.source {
            Source::Plain(file) => Released::Plain(file),
            Source::Archived { stream, .. } => Released::Archived(stream),
        }
    }

    /// Origin kind of this handle
    pub const fn origin(&self) -> HandleOrigin {
        match self.source {
            Source::Plain(_) => HandleOrigin::Plain,
            Source::Archived { .. } => HandleOrigin::Archived,
        }
    }

    /// Bookkeeping snapshot
    pub const fn info(&self) -> HandleInfo {
        let (start, from_container) = match self.source {
            Source::Plain(_) => (0, false),
            Source::Archived {
                start,
                from_container,
                ..
            } => (start, from_container),
        };
        HandleInfo {
            origin: self.origin(),
            start,
            pos: self.pos,
            length: self.length,
            from_container,
        }
    }

    /// Current logical position.
    pub const fn tell(&self) -> u64 {
        self.pos
    }

    /// Total logical length, fixed when the handle was opened.
    pub const fn length(&self) -> u64 {
        self.length
    }

    /// Bytes left between the current position and the end.
    pub const fn remaining(&self) -> u64 {
        self.length - self.pos
    }

    /// Read up to `buf.len()` bytes from the current position.
    ///
    /// Never reads past the logical end. Returns the number of bytes copied
    /// into `buf`; zero means end of asset. Failures of the underlying
    /// stream show up as a short count.
    pub fn read(&mut self, buf: &mut [u8]) -> usize {
        let want = usize::try_from(self.remaining()).map_or(buf.len(), |r| r.min(buf.len()));
        if want == 0 {
            return 0;
        }
        let buf = &mut buf[..want];

        let copied = match &mut self.source {
            Source::Plain(file) => fill(file, buf),
            Source::Archived { stream, start, .. } => match start.checked_add(self.pos) {
                Some(physical) if seek_exact(stream, physical) => fill(stream, buf),
                _ => 0,
            },
        };

        self.pos += copied as u64;
        copied
    }

    /// Read everything from the current position to the end.
    pub fn read_to_end(&mut self) -> Vec<u8> {
        let mut data = vec![0u8; usize::try_from(self.remaining()).unwrap_or(0)];
        let mut filled = 0;
        while filled < data.len() {
            let n = self.read(&mut data[filled..]);
            if n == 0 {
                break;
            }
            filled += n;
        }
        data.truncate(filled);
        data
    }

    /// Move the logical position.
    ///
    /// Returns `false` and leaves the position unchanged when the target
    /// falls outside `[0, length]` or the underlying stream refuses to move.
    pub fn seek(&mut self, offset: i64, origin: SeekOrigin) -> bool {
        let base = match origin {
            SeekOrigin::Start => 0,
            SeekOrigin::Current => self.pos,
            SeekOrigin::End => self.length,
        };
        let Some(target) = base
            .checked_add_signed(offset)
            .filter(|&target| target <= self.length)
        else {
            trace!(
                "Seek {offset} from {origin:?} out of range (pos {}, length {})",
                self.pos, self.length
            );
            return false;
        };

        let moved = match &mut self.source {
            Source::Plain(file) => seek_exact(file, target),
            Source::Archived { stream, start, .. } => {
                start.checked_add(target).is_some_and(|physical| seek_exact(stream, physical))
            }
        };

        if moved {
            self.pos = target;
        }
        moved
    }
}

/// Copy from `reader` until `buf` is full, the reader is exhausted or fails.
fn fill<R: Read>(reader: &mut R, buf: &mut [u8]) -> usize {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => {
                debug!("Short read after {filled} of {} bytes: {e}", buf.len());
                break;
            }
        }
    }
    filled
}

fn seek_exact<T: Seek>(stream: &mut T, physical: u64) -> bool {
    match stream.seek(SeekFrom::Start(physical)) {
        Ok(actual) if actual == physical => true,
        Ok(actual) => {
            debug!("Underlying seek to {physical} landed at {actual}");
            false
        }
        Err(e) => {
            debug!("Underlying seek to {physical} failed: {e}");
            false
        }
    }
}

impl<S: Read + Seek> Read for FileHandle<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(Self::read(self, buf))
    }
}

impl<S: Read + Seek> Seek for FileHandle<S> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let (offset, origin) = match pos {
            SeekFrom::Start(n) => (
                i64::try_from(n).map_err(|_| out_of_range())?,
                SeekOrigin::Start,
            ),
            SeekFrom::Current(n) => (n, SeekOrigin::Current),
            SeekFrom::End(n) => (n, SeekOrigin::End),
        };

        if Self::seek(self, offset, origin) {
            Ok(self.pos)
        } else {
            Err(out_of_range())
        }
    }

    fn stream_position(&mut self) -> io::Result<u64> {
        Ok(self.pos)
    }
}

fn out_of_range() -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, "seek outside asset bounds")
}

impl<S> std::fmt::Debug for FileHandle<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let origin = match self.source {
            Source::Plain(_) => "plain",
            Source::Archived { .. } => "archived",
        };
        f.debug_struct("FileHandle")
            .field("origin", &origin)
            .field("pos", &self.pos)
            .field("length", &self.length)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::{Cursor, Write};

    fn container(prefix: usize, asset: &[u8], suffix: usize) -> Cursor<Vec<u8>> {
        let mut data = vec![0xEEu8; prefix];
        data.extend_from_slice(asset);
        data.extend(std::iter::repeat_n(0xFFu8, suffix));
        let mut cursor = Cursor::new(data);
        cursor.set_position(prefix as u64);
        cursor
    }

    fn archived(prefix: usize, asset: &[u8], suffix: usize) -> FileHandle<Cursor<Vec<u8>>> {
        FileHandle::archived(container(prefix, asset, suffix), prefix as u64, asset.len() as u64, true)
    }

    /// Container stream that refuses absolute seeks.
    struct Pinned(Cursor<Vec<u8>>);

    impl Read for Pinned {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.0.read(buf)
        }
    }

    impl Seek for Pinned {
        fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
            match pos {
                SeekFrom::Start(_) => Err(io::Error::other("absolute seek refused")),
                other => self.0.seek(other),
            }
        }
    }

    /// Container stream that silently stops short of positions past `limit`.
    struct Clamped {
        inner: Cursor<Vec<u8>>,
        limit: u64,
    }

    impl Read for Clamped {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.inner.read(buf)
        }
    }

    impl Seek for Clamped {
        fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
            match pos {
                SeekFrom::Start(n) => self.inner.seek(SeekFrom::Start(n.min(self.limit))),
                other => self.inner.seek(other),
            }
        }
    }

    fn plain(contents: &[u8]) -> (tempfile::NamedTempFile, FileHandle<Cursor<Vec<u8>>>) {
        let mut tmp = tempfile::NamedTempFile::new().expect("tempfile");
        tmp.write_all(contents).expect("write");
        let file = File::open(tmp.path()).expect("open");
        (tmp, FileHandle::plain(file, contents.len() as u64))
    }

    #[test]
    fn test_archived_read_stops_at_length() {
        let mut handle = archived(16, b"hello", 16);
        let mut buf = [0u8; 64];
        assert_eq!(handle.read(&mut buf), 5);
        assert_eq!(&buf[..5], b"hello");
        assert_eq!(handle.read(&mut buf), 0);
        assert_eq!(handle.tell(), 5);
    }

    #[test]
    fn test_archived_read_ignores_foreign_cursor_moves() {
        let mut handle = archived(8, b"abcdef", 8);
        let mut buf = [0u8; 3];
        assert_eq!(handle.read(&mut buf), 3);

        // Something else sharing the container moves the cursor.
        if let Source::Archived { stream, .. } = &mut handle.source {
            stream.set_position(0);
        }

        assert_eq!(handle.read(&mut buf), 3);
        assert_eq!(&buf, b"def");
    }

    #[test]
    fn test_seek_origins() {
        let mut handle = archived(4, b"0123456789", 4);
        assert!(handle.seek(3, SeekOrigin::Start));
        assert_eq!(handle.tell(), 3);
        assert!(handle.seek(2, SeekOrigin::Current));
        assert_eq!(handle.tell(), 5);
        assert!(handle.seek(-1, SeekOrigin::End));
        assert_eq!(handle.tell(), 9);

        let mut buf = [0u8; 4];
        assert_eq!(handle.read(&mut buf), 1);
        assert_eq!(buf[0], b'9');

        assert!(handle.seek(0, SeekOrigin::End));
        assert_eq!(handle.read(&mut buf), 0);
    }

    #[test]
    fn test_seek_out_of_range_keeps_position() {
        let mut handle = archived(4, b"0123456789", 4);
        assert!(handle.seek(4, SeekOrigin::Start));

        assert!(!handle.seek(11, SeekOrigin::Start));
        assert!(!handle.seek(-1, SeekOrigin::Start));
        assert!(!handle.seek(-5, SeekOrigin::Current));
        assert!(!handle.seek(1, SeekOrigin::End));
        assert!(!handle.seek(i64::MIN, SeekOrigin::End));
        assert_eq!(handle.tell(), 4);
    }

    #[test]
    fn test_failed_underlying_seek_keeps_position() {
        let stream = Pinned(container(8, b"0123456789", 8));
        let mut handle = FileHandle::archived(stream, 8, 10, true);

        assert!(!handle.seek(5, SeekOrigin::Start));
        assert_eq!(handle.tell(), 0);
        assert!(!handle.seek(-2, SeekOrigin::End));
        assert_eq!(handle.tell(), 0);

        let mut buf = [0u8; 4];
        assert_eq!(handle.read(&mut buf), 0);
        assert_eq!(handle.tell(), 0);
    }

    #[test]
    fn test_clamped_underlying_seek_is_not_trusted() {
        let stream = Clamped {
            inner: container(4, b"0123456789", 4),
            limit: 6,
        };
        let mut handle = FileHandle::archived(stream, 4, 10, true);

        let mut buf = [0u8; 2];
        assert_eq!(handle.read(&mut buf), 2);
        assert_eq!(&buf, b"01");
        assert_eq!(handle.read(&mut buf), 2);
        assert_eq!(&buf, b"23");

        // Physical offset 8 is past the clamp; no bytes from offset 6 leak out.
        assert_eq!(handle.read(&mut buf), 0);
        assert_eq!(handle.tell(), 4);
        assert!(!handle.seek(7, SeekOrigin::Start));
        assert_eq!(handle.tell(), 4);
    }

    #[test]
    fn test_plain_handle() {
        let (_tmp, mut handle) = plain(b"loose file");
        assert_eq!(handle.origin(), HandleOrigin::Plain);
        assert_eq!(handle.length(), 10);
        assert!(handle.seek(6, SeekOrigin::Start));
        assert_eq!(handle.read_to_end(), b"file");
        assert_eq!(handle.remaining(), 0);
    }

    #[test]
    fn test_info() {
        let handle = archived(4096, &[7u8; 128], 0);
        assert_eq!(
            handle.info(),
            HandleInfo {
                origin: HandleOrigin::Archived,
                start: 4096,
                pos: 0,
                length: 128,
                from_container: true,
            }
        );

        let (_tmp, handle) = plain(b"x");
        let info = handle.info();
        assert_eq!(info.origin, HandleOrigin::Plain);
        assert_eq!(info.start, 0);
        assert!(!info.from_container);
    }

    #[test]
    fn test_std_io_traits() {
        let mut handle = archived(2, b"standard io", 2);
        assert_eq!(Seek::seek(&mut handle, SeekFrom::Start(9)).unwrap(), 9);
        let mut rest = String::new();
        Read::read_to_string(&mut handle, &mut rest).unwrap();
        assert_eq!(rest, "io");

        let err = Seek::seek(&mut handle, SeekFrom::Current(1)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert_eq!(handle.stream_position().unwrap(), 11);

        let err = Seek::seek(&mut handle, SeekFrom::Start(u64::MAX)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
