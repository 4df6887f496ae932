//! Segment naming and index discovery.
//!
//! A stream's identity is a `(directory, prefix)` pair derived once from a
//! caller-supplied base path. Segment `n` lives at `directory/prefix<n>`
//! with the index formatted as plain decimal, no padding.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Maps segment indexes to file paths for one stream.
///
/// Pure path arithmetic plus directory scans; never creates or removes
/// files itself.
#[derive(Debug, Clone)]
pub struct SegmentNamer {
    dir: PathBuf,
    prefix: String,
}

impl SegmentNamer {
    /// Derives the stream identity from a base path.
    ///
    /// The final path component becomes the segment prefix and its parent
    /// (made absolute against the current directory when relative) becomes
    /// the stream directory.
    ///
    /// # Errors
    /// [`Error::InvalidArgument`] when the final path component is empty.
    pub fn new(base: &Path) -> Result<Self> {
        let prefix = base
            .file_name()
            .and_then(|name| name.to_str())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| {
                Error::InvalidArgument(format!("empty final path component in {:?}", base))
            })?
            .to_string();

        let parent = base.parent().unwrap_or_else(|| Path::new(""));
        let dir = if parent.as_os_str().is_empty() {
            std::env::current_dir()?
        } else if parent.is_absolute() {
            parent.to_path_buf()
        } else {
            std::env::current_dir()?.join(parent)
        };

        Ok(Self { dir, prefix })
    }

    /// The stream's directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The segment filename prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Path of the segment with the given index.
    pub fn resolve(&self, index: u64) -> PathBuf {
        self.dir.join(format!("{}{}", self.prefix, index))
    }

    /// Extracts the segment index from a directory entry name.
    ///
    /// Accepts only `prefix` followed by canonical decimal digits: all
    /// digits, no leading zero other than the literal value `0`.
    pub fn parse_index(&self, file_name: &str) -> Option<u64> {
        let suffix = file_name.strip_prefix(&self.prefix)?;
        if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if suffix.len() > 1 && suffix.starts_with('0') {
            return None;
        }
        suffix.parse().ok()
    }

    /// Lowest existing segment index, or `None` when no segment matches.
    ///
    /// A missing directory counts as no segments.
    pub fn scan_min_index(&self) -> Result<Option<u64>> {
        self.scan(|best, idx| idx < best)
    }

    /// Highest existing segment index, or `None` when no segment matches.
    pub fn scan_max_index(&self) -> Result<Option<u64>> {
        self.scan(|best, idx| idx > best)
    }

    fn scan(&self, better: impl Fn(u64, u64) -> bool) -> Result<Option<u64>> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let mut found = None;
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if let Some(idx) = self.parse_index(name) {
                match found {
                    Some(best) if !better(best, idx) => {}
                    _ => found = Some(idx),
                }
            }
        }
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_appends_decimal_index() {
        let namer = SegmentNamer::new(Path::new("/var/data/log")).unwrap();
        assert_eq!(namer.resolve(0), Path::new("/var/data/log0"));
        assert_eq!(namer.resolve(7), Path::new("/var/data/log7"));
        assert_eq!(namer.resolve(1234), Path::new("/var/data/log1234"));
    }

    #[test]
    fn test_prefix_and_dir_split() {
        let namer = SegmentNamer::new(Path::new("/tmp/streams/events")).unwrap();
        assert_eq!(namer.prefix(), "events");
        assert_eq!(namer.dir(), Path::new("/tmp/streams"));
    }

    #[test]
    fn test_relative_base_resolves_against_cwd() {
        let namer = SegmentNamer::new(Path::new("events")).unwrap();
        assert!(namer.dir().is_absolute());
        assert_eq!(namer.prefix(), "events");
    }

    #[test]
    fn test_empty_final_component_rejected() {
        assert!(matches!(
            SegmentNamer::new(Path::new("/")),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_parse_index_canonical_decimal_only() {
        let namer = SegmentNamer::new(Path::new("/tmp/log")).unwrap();
        assert_eq!(namer.parse_index("log0"), Some(0));
        assert_eq!(namer.parse_index("log12"), Some(12));
        assert_eq!(namer.parse_index("log"), None);
        assert_eq!(namer.parse_index("log01"), None);
        assert_eq!(namer.parse_index("log1a"), None);
        assert_eq!(namer.parse_index("log-1"), None);
        assert_eq!(namer.parse_index("other3"), None);
    }

    #[test]
    fn test_scan_min_max() {
        let tmp = tempfile::tempdir().unwrap();
        for idx in [2u64, 5, 9] {
            std::fs::write(tmp.path().join(format!("log{}", idx)), b"x").unwrap();
        }
        // Unrelated entries sharing the prefix but not a canonical index
        std::fs::write(tmp.path().join("log01"), b"x").unwrap();
        std::fs::write(tmp.path().join("log.bak"), b"x").unwrap();

        let namer = SegmentNamer::new(&tmp.path().join("log")).unwrap();
        assert_eq!(namer.scan_min_index().unwrap(), Some(2));
        assert_eq!(namer.scan_max_index().unwrap(), Some(9));
    }

    #[test]
    fn test_scan_missing_directory_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let namer = SegmentNamer::new(&tmp.path().join("absent").join("log")).unwrap();
        assert_eq!(namer.scan_min_index().unwrap(), None);
        assert_eq!(namer.scan_max_index().unwrap(), None);
    }
}
