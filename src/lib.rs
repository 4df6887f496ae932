//! Size-rotated segment file streams.
//!
//! A logical byte stream is stored as a numbered sequence of files sharing
//! a filename prefix (`log0`, `log1`, `log2`, …). [`SegmentWriter`] appends
//! to the current segment and rolls to the next index once the configured
//! roll size would be exceeded; [`SegmentReader`] walks the segments in
//! index order and presents them as one continuous stream, stitching
//! `read` and `readline` calls across boundaries.
//!
//! ```no_run
//! use rollfile::{open, Mode, Options, open_with};
//!
//! # fn main() -> rollfile::Result<()> {
//! let mut writer = open_with("data/log", Mode::Write, Options::default().roll_size("64m"))?;
//! writer.write(b"hello\n")?;
//! writer.close()?;
//!
//! let mut reader = open("data/log", Mode::Read)?;
//! let first_line = reader.readline()?;
//! assert!(first_line.ends_with(b"\n") || first_line.is_empty());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod naming;
pub mod reader;
pub mod size;
pub mod stream;
pub mod writer;

// Re-export common types for convenience
pub use error::{Error, Result};
pub use naming::SegmentNamer;
pub use reader::SegmentReader;
pub use size::{SizeSpec, MAX_FILE_SIZE};
pub use stream::{open, open_with, Mode, Options, Stream};
pub use writer::SegmentWriter;
