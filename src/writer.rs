//! Size-bounded segment writer.
//!
//! The writer owns one open segment file at a time and tracks how many
//! bytes the segment holds. A write that would push the segment past the
//! roll size is split at exact byte boundaries, rolling to the next index
//! as many times as needed, so no segment ever exceeds the roll size.

use crate::error::{Error, Result};
use crate::naming::SegmentNamer;
use crate::size::SizeSpec;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

/// The currently open segment and its byte accounting.
#[derive(Debug)]
struct Cursor {
    file: File,
    index: u64,
    size: u64,
}

#[derive(Debug)]
enum WriterState {
    Open(Cursor),
    Closed,
}

/// Appends bytes to a segmented stream, rolling to a new segment once the
/// configured size would be exceeded.
///
/// On open, the writer resumes from the highest existing index: a segment
/// with spare capacity is reopened for append, a full one is treated as
/// immutable and the next index is started instead.
///
/// Single writer assumed; concurrent writers to the same base path will
/// corrupt the in-memory size accounting.
#[derive(Debug)]
pub struct SegmentWriter {
    namer: SegmentNamer,
    roll_size: u64,
    state: WriterState,
}

impl SegmentWriter {
    /// Opens a writer bound to `base`, creating the directory when missing.
    ///
    /// # Arguments
    /// * `base` - directory plus filename prefix, e.g. `/var/data/log`
    /// * `roll_size` - maximum segment size, e.g. `"1G"` or a byte count
    pub fn open(base: impl AsRef<Path>, roll_size: impl Into<SizeSpec>) -> Result<Self> {
        let namer = SegmentNamer::new(base.as_ref())?;
        let roll_size = roll_size.into().parse()?;

        std::fs::create_dir_all(namer.dir())?;

        let index = match namer.scan_max_index()? {
            Some(max) => {
                let on_disk = std::fs::metadata(namer.resolve(max))?.len();
                if on_disk >= roll_size {
                    // Full segments are immutable; continue past them.
                    max + 1
                } else {
                    max
                }
            }
            None => 0,
        };

        let cursor = open_segment(&namer, index)?;
        tracing::debug!(
            prefix = namer.prefix(),
            index,
            size = cursor.size,
            "opened segment for append"
        );

        Ok(Self {
            namer,
            roll_size,
            state: WriterState::Open(cursor),
        })
    }

    /// Appends `data` to the logical stream.
    ///
    /// A single call may span several segments: the current segment is
    /// filled to exactly the roll size, closed, and the remainder continues
    /// in freshly opened higher-indexed segments.
    ///
    /// # Errors
    /// [`Error::Closed`] after `close()`; I/O errors propagate. Bytes
    /// written before a failure are not rolled back and the tracked size
    /// stays consistent with what reached the filesystem.
    pub fn write(&mut self, data: &[u8]) -> Result<()> {
        let mut data = data;
        loop {
            let cursor = match &mut self.state {
                WriterState::Open(cursor) => cursor,
                WriterState::Closed => return Err(Error::Closed),
            };

            let remaining = self.roll_size - cursor.size;
            if data.len() as u64 <= remaining {
                cursor.file.write_all(data)?;
                cursor.size += data.len() as u64;
                return Ok(());
            }

            if remaining > 0 {
                let (head, tail) = data.split_at(remaining as usize);
                cursor.file.write_all(head)?;
                cursor.size = self.roll_size;
                data = tail;
            }

            self.roll_over()?;
        }
    }

    /// Appends `data` and forces it to durable storage in one call.
    pub fn write_and_flush(&mut self, data: &[u8]) -> Result<()> {
        self.write(data)?;
        self.flush()
    }

    /// Forces pending writes to durable storage without closing.
    ///
    /// # Errors
    /// [`Error::Closed`] after `close()`.
    pub fn flush(&mut self) -> Result<()> {
        match &mut self.state {
            WriterState::Open(cursor) => {
                cursor.file.sync_all()?;
                Ok(())
            }
            WriterState::Closed => Err(Error::Closed),
        }
    }

    /// Closes the writer. Idempotent; further writes fail with
    /// [`Error::Closed`].
    pub fn close(&mut self) -> Result<()> {
        if let WriterState::Open(cursor) = std::mem::replace(&mut self.state, WriterState::Closed)
        {
            cursor.file.sync_all()?;
        }
        Ok(())
    }

    /// Whether the writer has been closed.
    pub fn closed(&self) -> bool {
        matches!(self.state, WriterState::Closed)
    }

    /// Index of the segment currently open for append, when open.
    pub fn current_index(&self) -> Option<u64> {
        match &self.state {
            WriterState::Open(cursor) => Some(cursor.index),
            WriterState::Closed => None,
        }
    }

    /// Byte size of the segment currently open for append, when open.
    pub fn current_segment_size(&self) -> Option<u64> {
        match &self.state {
            WriterState::Open(cursor) => Some(cursor.size),
            WriterState::Closed => None,
        }
    }

    /// The configured roll size in bytes.
    pub fn roll_size(&self) -> u64 {
        self.roll_size
    }

    /// Closes the current segment and opens the next index fresh.
    fn roll_over(&mut self) -> Result<()> {
        let previous = match std::mem::replace(&mut self.state, WriterState::Closed) {
            WriterState::Open(cursor) => cursor,
            WriterState::Closed => return Err(Error::Closed),
        };
        let next = previous.index + 1;
        drop(previous);

        let cursor = open_segment(&self.namer, next)?;
        tracing::debug!(prefix = self.namer.prefix(), index = next, "rolled to next segment");
        self.state = WriterState::Open(cursor);
        Ok(())
    }
}

fn open_segment(namer: &SegmentNamer, index: u64) -> Result<Cursor> {
    let path = namer.resolve(index);
    let file = OpenOptions::new().append(true).create(true).open(&path)?;
    let size = file.metadata()?.len();
    Ok(Cursor { file, index, size })
}

impl Drop for SegmentWriter {
    fn drop(&mut self) {
        if let WriterState::Open(cursor) = &self.state {
            let _ = cursor.file.sync_all();
        }
    }
}
