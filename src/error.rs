//! Crate-scoped error handling for rollfile.
//!
//! A single error type covers all public APIs. Filesystem failures are
//! wrapped rather than flattened so callers can still inspect the
//! underlying `std::io::Error`.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type exposed to users of the crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Structurally invalid input (empty final path component,
    /// unsupported open mode).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A size specification that could not be parsed as a number with
    /// an optional `k|m|g|t` suffix.
    #[error("invalid size specification: {0:?}")]
    InvalidSize(String),

    /// A size specification that parsed but resolved outside the
    /// allowed range `(0, MAX_FILE_SIZE]`.
    #[error("size {bytes} from {spec:?} is out of range")]
    OutOfRange {
        /// The original specification, for diagnostics.
        spec: String,
        /// The resolved byte count (may be negative for text specs).
        bytes: i128,
    },

    /// An operation was attempted after `close()`.
    #[error("I/O operation on closed stream")]
    Closed,

    /// No segment files exist for a read stream at open time.
    #[error("no segments found for {0}")]
    NotFound(PathBuf),

    /// Errors from the underlying filesystem.
    #[error("I/O error")]
    Io(#[from] std::io::Error),
}
