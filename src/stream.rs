//! Combined open entry point over readers and writers.
//!
//! `open` resolves a base path and a mode into either a [`SegmentReader`]
//! or a [`SegmentWriter`]. In read mode, a plain file sitting at the exact
//! path bypasses segment discovery entirely and is read directly.

use crate::error::{Error, Result};
use crate::reader::SegmentReader;
use crate::size::SizeSpec;
use crate::writer::SegmentWriter;
use std::path::Path;
use std::str::FromStr;

/// Direction a stream is opened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Sequential reading across segments.
    Read,
    /// Size-bounded appending.
    Write,
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "r" => Ok(Mode::Read),
            "w" => Ok(Mode::Write),
            other => Err(Error::InvalidArgument(format!(
                "mode must be \"r\" or \"w\", got {:?}",
                other
            ))),
        }
    }
}

/// Tuning knobs for [`open_with`].
///
/// `roll_size` applies to write mode, `buffer_size` to read mode; the
/// irrelevant one is ignored.
#[derive(Debug, Clone)]
pub struct Options {
    /// Maximum segment size before the writer rolls. Default `"1G"`.
    pub roll_size: SizeSpec,
    /// Default read size for the reader. Default `"128k"`.
    pub buffer_size: SizeSpec,
}

impl Options {
    /// Replaces the roll size.
    pub fn roll_size(mut self, spec: impl Into<SizeSpec>) -> Self {
        self.roll_size = spec.into();
        self
    }

    /// Replaces the read buffer size.
    pub fn buffer_size(mut self, spec: impl Into<SizeSpec>) -> Self {
        self.buffer_size = spec.into();
        self
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            roll_size: SizeSpec::from("1G"),
            buffer_size: SizeSpec::from("128k"),
        }
    }
}

/// A stream opened through the [`open`] dispatcher.
#[derive(Debug)]
pub enum Stream {
    /// Read mode.
    Read(SegmentReader),
    /// Write mode.
    Write(SegmentWriter),
}

impl Stream {
    /// Reads up to `size` bytes.
    ///
    /// # Errors
    /// [`Error::InvalidArgument`] on a write-mode stream.
    pub fn read(&mut self, size: usize) -> Result<Vec<u8>> {
        match self {
            Stream::Read(reader) => reader.read(size),
            Stream::Write(_) => Err(Error::InvalidArgument(
                "stream not open for reading".to_string(),
            )),
        }
    }

    /// Reads up to the default buffer size.
    pub fn read_chunk(&mut self) -> Result<Vec<u8>> {
        match self {
            Stream::Read(reader) => reader.read_chunk(),
            Stream::Write(_) => Err(Error::InvalidArgument(
                "stream not open for reading".to_string(),
            )),
        }
    }

    /// Reads one logical line.
    pub fn readline(&mut self) -> Result<Vec<u8>> {
        match self {
            Stream::Read(reader) => reader.readline(),
            Stream::Write(_) => Err(Error::InvalidArgument(
                "stream not open for reading".to_string(),
            )),
        }
    }

    /// Appends bytes.
    ///
    /// # Errors
    /// [`Error::InvalidArgument`] on a read-mode stream.
    pub fn write(&mut self, data: &[u8]) -> Result<()> {
        match self {
            Stream::Write(writer) => writer.write(data),
            Stream::Read(_) => Err(Error::InvalidArgument(
                "stream not open for writing".to_string(),
            )),
        }
    }

    /// Forces pending writes to durable storage.
    pub fn flush(&mut self) -> Result<()> {
        match self {
            Stream::Write(writer) => writer.flush(),
            Stream::Read(_) => Err(Error::InvalidArgument(
                "stream not open for writing".to_string(),
            )),
        }
    }

    /// Closes the stream. Idempotent.
    pub fn close(&mut self) -> Result<()> {
        match self {
            Stream::Read(reader) => reader.close(),
            Stream::Write(writer) => writer.close(),
        }
    }

    /// Whether the stream has been closed.
    pub fn closed(&self) -> bool {
        match self {
            Stream::Read(reader) => reader.closed(),
            Stream::Write(writer) => writer.closed(),
        }
    }

    /// Unwraps the reader, if this is a read stream.
    pub fn into_reader(self) -> Option<SegmentReader> {
        match self {
            Stream::Read(reader) => Some(reader),
            Stream::Write(_) => None,
        }
    }

    /// Unwraps the writer, if this is a write stream.
    pub fn into_writer(self) -> Option<SegmentWriter> {
        match self {
            Stream::Write(writer) => Some(writer),
            Stream::Read(_) => None,
        }
    }
}

/// Opens a stream with default options (`roll_size = "1G"`,
/// `buffer_size = "128k"`).
pub fn open(path: impl AsRef<Path>, mode: Mode) -> Result<Stream> {
    open_with(path, mode, Options::default())
}

/// Opens a stream with explicit options.
///
/// In read mode, a plain file at the exact path takes the single-file
/// fast path; otherwise the lowest-indexed segment is opened. In write
/// mode the writer resumes from the highest-indexed segment.
pub fn open_with(path: impl AsRef<Path>, mode: Mode, options: Options) -> Result<Stream> {
    let path = path.as_ref();
    match mode {
        Mode::Read => {
            if path.is_file() {
                Ok(Stream::Read(SegmentReader::open_plain(
                    path,
                    options.buffer_size,
                )?))
            } else {
                Ok(Stream::Read(SegmentReader::open(path, options.buffer_size)?))
            }
        }
        Mode::Write => Ok(Stream::Write(SegmentWriter::open(path, options.roll_size)?)),
    }
}
