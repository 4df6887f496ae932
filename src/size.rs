//! Size specifications for roll sizes and read buffers.
//!
//! A size is either a raw byte count or a decimal string with an optional
//! one-character unit suffix (`k`, `m`, `g`, `t`, case-insensitive) meaning
//! powers of 1024. Fractional units like `"1.2k"` are legal and truncate
//! to whole bytes.

use crate::error::{Error, Result};

/// Largest byte count a size specification may resolve to (1 TiB).
pub const MAX_FILE_SIZE: u64 = 1024 * 1024 * 1024 * 1024;

const UNITS: [(char, u32); 4] = [('k', 1), ('m', 2), ('g', 3), ('t', 4)];

/// A size given either as an exact byte count or as text with an
/// optional unit suffix.
///
/// Accepting both forms through one enum keeps call sites flexible
/// without any runtime type inspection:
///
/// ```
/// use rollfile::SizeSpec;
///
/// assert_eq!(SizeSpec::from(100u64).parse().unwrap(), 100);
/// assert_eq!(SizeSpec::from("1k").parse().unwrap(), 1024);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SizeSpec {
    /// An exact byte count, used as-is.
    Bytes(u64),
    /// A decimal string, optionally suffixed with `k|m|g|t`.
    Text(String),
}

impl SizeSpec {
    /// Resolves the specification to a byte count.
    ///
    /// # Errors
    /// * [`Error::InvalidSize`] if the text form is not a number with an
    ///   optional unit suffix
    /// * [`Error::OutOfRange`] if the result is not in `(0, MAX_FILE_SIZE]`
    pub fn parse(&self) -> Result<u64> {
        match self {
            SizeSpec::Bytes(n) => check_range(format!("{}", n), *n as i128),
            SizeSpec::Text(text) => {
                let lowered = text.to_lowercase();
                let mut multiplier = 1u64;
                let mut number = lowered.as_str();
                if let Some(last) = lowered.chars().last() {
                    if let Some((_, exp)) = UNITS.iter().find(|(unit, _)| *unit == last) {
                        multiplier = 1024u64.pow(*exp);
                        number = &lowered[..lowered.len() - 1];
                    }
                }
                let value: f64 = number
                    .trim()
                    .parse()
                    .map_err(|_| Error::InvalidSize(text.clone()))?;
                if !value.is_finite() {
                    return Err(Error::InvalidSize(text.clone()));
                }
                check_range(text.clone(), (value * multiplier as f64) as i128)
            }
        }
    }
}

fn check_range(spec: String, bytes: i128) -> Result<u64> {
    if bytes <= 0 || bytes > MAX_FILE_SIZE as i128 {
        return Err(Error::OutOfRange { spec, bytes });
    }
    Ok(bytes as u64)
}

impl From<u64> for SizeSpec {
    fn from(bytes: u64) -> Self {
        SizeSpec::Bytes(bytes)
    }
}

impl From<&str> for SizeSpec {
    fn from(text: &str) -> Self {
        SizeSpec::Text(text.to_string())
    }
}

impl From<String> for SizeSpec {
    fn from(text: String) -> Self {
        SizeSpec::Text(text)
    }
}
