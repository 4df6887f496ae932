//! Sequential reader over a segmented stream.
//!
//! The reader presents the segment files as one continuous byte stream:
//! when the current segment is exhausted it opens the next index and keeps
//! going, including mid-line for `readline`. Running out of segments is an
//! expected terminal condition, not an error.

use crate::error::{Error, Result};
use crate::naming::SegmentNamer;
use crate::size::SizeSpec;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// Outcome of attempting to move to the next segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Advance {
    Opened,
    EndOfStream,
}

#[derive(Debug)]
enum ReaderState {
    Open {
        file: BufReader<File>,
        /// Index of the open segment; `None` for the single plain-file
        /// fast path, which never advances.
        index: Option<u64>,
    },
    /// No higher-indexed segment exists; all reads return empty. The
    /// last file handle has already been released.
    Exhausted,
    Closed,
}

/// Reads a segmented stream in index order as one logical byte sequence.
///
/// Exactly one segment file handle is held at a time; crossing a boundary
/// closes the old handle before opening the next.
#[derive(Debug)]
pub struct SegmentReader {
    namer: SegmentNamer,
    buffer_size: usize,
    state: ReaderState,
}

impl SegmentReader {
    /// Opens a reader bound to `base`, starting at the lowest existing
    /// segment index.
    ///
    /// # Arguments
    /// * `base` - directory plus filename prefix, e.g. `/var/data/log`
    /// * `buffer_size` - default read size for [`read_chunk`], e.g. `"128k"`
    ///
    /// # Errors
    /// [`Error::NotFound`] when no segment matches the prefix.
    ///
    /// [`read_chunk`]: SegmentReader::read_chunk
    pub fn open(base: impl AsRef<Path>, buffer_size: impl Into<SizeSpec>) -> Result<Self> {
        let base = base.as_ref();
        let namer = SegmentNamer::new(base)?;
        let buffer_size = buffer_size.into().parse()? as usize;

        let first = namer
            .scan_min_index()?
            .ok_or_else(|| Error::NotFound(base.to_path_buf()))?;

        let file = BufReader::new(File::open(namer.resolve(first))?);
        tracing::debug!(prefix = namer.prefix(), index = first, "opened first segment");

        Ok(Self {
            namer,
            buffer_size,
            state: ReaderState::Open {
                file,
                index: Some(first),
            },
        })
    }

    /// Opens a reader over a single plain (non-segmented) file.
    ///
    /// Used by the [`open`](crate::open) dispatcher when the exact path
    /// exists as a regular file; the reader never looks for further
    /// segments.
    pub fn open_plain(path: impl AsRef<Path>, buffer_size: impl Into<SizeSpec>) -> Result<Self> {
        let path = path.as_ref();
        let namer = SegmentNamer::new(path)?;
        let buffer_size = buffer_size.into().parse()? as usize;
        let file = BufReader::new(File::open(path)?);

        Ok(Self {
            namer,
            buffer_size,
            state: ReaderState::Open { file, index: None },
        })
    }

    /// Reads up to `size` bytes, transparently crossing segment
    /// boundaries.
    ///
    /// Returns fewer than `size` bytes only at true end-of-stream, and an
    /// empty vector when the stream is already exhausted or `size == 0`.
    ///
    /// # Errors
    /// [`Error::Closed`] after `close()`; I/O errors other than the
    /// internal "no next segment" signal propagate.
    pub fn read(&mut self, size: usize) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        while out.len() < size {
            let need = (size - out.len()) as u64;
            let consumed = match &mut self.state {
                ReaderState::Open { file, .. } => {
                    file.by_ref().take(need).read_to_end(&mut out)?
                }
                ReaderState::Exhausted => break,
                ReaderState::Closed => return Err(Error::Closed),
            };

            if consumed == 0 && self.advance()? == Advance::EndOfStream {
                break;
            }
        }
        if self.closed() {
            // size == 0 skips the loop entirely; closed still wins
            return Err(Error::Closed);
        }
        Ok(out)
    }

    /// Reads up to the configured default buffer size.
    pub fn read_chunk(&mut self) -> Result<Vec<u8>> {
        self.read(self.buffer_size)
    }

    /// Reads one logical line, terminated by `\n`.
    ///
    /// A line may physically straddle a segment boundary; fragments are
    /// concatenated until a newline is consumed or the stream ends. The
    /// trailing newline is included when present; at true end-of-stream
    /// the remaining bytes come back without one.
    pub fn readline(&mut self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        loop {
            let done = match &mut self.state {
                ReaderState::Open { file, .. } => {
                    file.read_until(b'\n', &mut out)? > 0 && out.ends_with(b"\n")
                }
                ReaderState::Exhausted => break,
                ReaderState::Closed => return Err(Error::Closed),
            };

            if done {
                break;
            }
            if self.advance()? == Advance::EndOfStream {
                break;
            }
        }
        Ok(out)
    }

    /// Closes the reader. Idempotent; further reads fail with
    /// [`Error::Closed`].
    pub fn close(&mut self) -> Result<()> {
        self.state = ReaderState::Closed;
        Ok(())
    }

    /// Whether the reader has been closed.
    pub fn closed(&self) -> bool {
        matches!(self.state, ReaderState::Closed)
    }

    /// Index of the segment currently open, when open and segmented.
    pub fn current_index(&self) -> Option<u64> {
        match &self.state {
            ReaderState::Open { index, .. } => *index,
            _ => None,
        }
    }

    /// The default read size in bytes.
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Moves to the next segment, releasing the old handle first.
    ///
    /// A missing next file means the stream is exhausted; that is reported
    /// as [`Advance::EndOfStream`] rather than an error so the read loops
    /// can stop cleanly. Any other I/O failure propagates.
    fn advance(&mut self) -> Result<Advance> {
        if self.closed() {
            return Err(Error::Closed);
        }

        let next = match std::mem::replace(&mut self.state, ReaderState::Exhausted) {
            ReaderState::Open {
                file,
                index: Some(current),
            } => {
                drop(file);
                current + 1
            }
            // Plain single file: nothing follows.
            ReaderState::Open { index: None, .. } | ReaderState::Exhausted => {
                return Ok(Advance::EndOfStream)
            }
            ReaderState::Closed => unreachable!("checked above"),
        };

        match File::open(self.namer.resolve(next)) {
            Ok(opened) => {
                self.state = ReaderState::Open {
                    file: BufReader::new(opened),
                    index: Some(next),
                };
                tracing::trace!(
                    prefix = self.namer.prefix(),
                    index = next,
                    "advanced to next segment"
                );
                Ok(Advance::Opened)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(prefix = self.namer.prefix(), "end of stream reached");
                Ok(Advance::EndOfStream)
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// Plugs the segmented stream into the stdlib I/O ecosystem; returns
/// `Ok(0)` at end-of-stream like any other reader.
impl Read for SegmentReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        loop {
            let consumed = match &mut self.state {
                ReaderState::Open { file, .. } => file.read(buf)?,
                ReaderState::Exhausted => return Ok(0),
                ReaderState::Closed => {
                    return Err(std::io::Error::new(
                        std::io::ErrorKind::Other,
                        Error::Closed,
                    ))
                }
            };

            if consumed > 0 || buf.is_empty() {
                return Ok(consumed);
            }

            let advanced = self
                .advance()
                .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err))?;
            if advanced == Advance::EndOfStream {
                return Ok(0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed(dir: &Path, segments: &[&[u8]]) {
        for (idx, content) in segments.iter().enumerate() {
            std::fs::write(dir.join(format!("log{}", idx)), content).unwrap();
        }
    }

    #[test]
    fn test_open_without_segments_fails() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(matches!(
            SegmentReader::open(tmp.path().join("log"), "128k"),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_open_starts_at_minimum_index() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("log4"), b"later").unwrap();
        std::fs::write(tmp.path().join("log2"), b"first").unwrap();

        let mut reader = SegmentReader::open(tmp.path().join("log"), "128k").unwrap();
        assert_eq!(reader.current_index(), Some(2));
        assert_eq!(reader.read(5).unwrap(), b"first");
    }

    #[test]
    fn test_read_crosses_segment_boundary() {
        let tmp = tempfile::tempdir().unwrap();
        seed(tmp.path(), &[b"abc", b"123"]);

        let mut reader = SegmentReader::open(tmp.path().join("log"), "128k").unwrap();
        assert_eq!(reader.read(10).unwrap(), b"abc123");
        // Exhausted: all further reads are empty
        assert_eq!(reader.read(10).unwrap(), b"");
    }

    #[test]
    fn test_read_zero_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        seed(tmp.path(), &[b"abc"]);

        let mut reader = SegmentReader::open(tmp.path().join("log"), "128k").unwrap();
        assert_eq!(reader.read(0).unwrap(), b"");
        assert_eq!(reader.read(3).unwrap(), b"abc");
    }

    #[test]
    fn test_read_chunk_uses_buffer_size() {
        let tmp = tempfile::tempdir().unwrap();
        seed(tmp.path(), &[b"abc", b"123"]);

        let mut reader = SegmentReader::open(tmp.path().join("log"), 2u64).unwrap();
        assert_eq!(reader.read_chunk().unwrap(), b"ab");
        assert_eq!(reader.read_chunk().unwrap(), b"c1");
        assert_eq!(reader.read_chunk().unwrap(), b"23");
        assert_eq!(reader.read_chunk().unwrap(), b"");
    }

    #[test]
    fn test_readline_splices_across_boundary() {
        let tmp = tempfile::tempdir().unwrap();
        seed(tmp.path(), &[b"abc", b"123\n456\n"]);

        let mut reader = SegmentReader::open(tmp.path().join("log"), "128k").unwrap();
        assert_eq!(reader.readline().unwrap(), b"abc123\n");
        assert_eq!(reader.readline().unwrap(), b"456\n");
        assert_eq!(reader.readline().unwrap(), b"");
    }

    #[test]
    fn test_readline_without_trailing_newline() {
        let tmp = tempfile::tempdir().unwrap();
        seed(tmp.path(), &[b"no newline"]);

        let mut reader = SegmentReader::open(tmp.path().join("log"), "128k").unwrap();
        assert_eq!(reader.readline().unwrap(), b"no newline");
        assert_eq!(reader.readline().unwrap(), b"");
    }

    #[test]
    fn test_empty_segment_in_the_middle() {
        let tmp = tempfile::tempdir().unwrap();
        seed(tmp.path(), &[b"abc", b"", b"def"]);

        let mut reader = SegmentReader::open(tmp.path().join("log"), "128k").unwrap();
        assert_eq!(reader.read(6).unwrap(), b"abcdef");
    }

    #[test]
    fn test_gap_truncates_stream() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("log0"), b"abc").unwrap();
        std::fs::write(tmp.path().join("log2"), b"unreachable").unwrap();

        let mut reader = SegmentReader::open(tmp.path().join("log"), "128k").unwrap();
        assert_eq!(reader.read(100).unwrap(), b"abc");
    }

    #[test]
    fn test_plain_file_fast_path() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("log");
        std::fs::write(&path, b"direct").unwrap();
        // A rotated sibling must not be picked up in plain mode
        std::fs::write(tmp.path().join("log0"), b"rotated").unwrap();

        let mut reader = SegmentReader::open_plain(&path, "128k").unwrap();
        assert_eq!(reader.read(100).unwrap(), b"direct");
        assert_eq!(reader.read(100).unwrap(), b"");
    }

    #[test]
    fn test_closed_reader_rejects_operations() {
        let tmp = tempfile::tempdir().unwrap();
        seed(tmp.path(), &[b"abc"]);

        let mut reader = SegmentReader::open(tmp.path().join("log"), "128k").unwrap();
        reader.close().unwrap();
        assert!(reader.closed());
        assert!(matches!(reader.read(1), Err(Error::Closed)));
        assert!(matches!(reader.read(0), Err(Error::Closed)));
        assert!(matches!(reader.readline(), Err(Error::Closed)));
        reader.close().unwrap();
    }

    #[test]
    fn test_io_read_trait_crosses_boundaries() {
        let tmp = tempfile::tempdir().unwrap();
        seed(tmp.path(), &[b"abc", b"123"]);

        let mut reader = SegmentReader::open(tmp.path().join("log"), "128k").unwrap();
        let mut all = Vec::new();
        std::io::Read::read_to_end(&mut reader, &mut all).unwrap();
        assert_eq!(all, b"abc123");
    }
}
