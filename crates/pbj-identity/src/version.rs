//! Schema version triple

use crate::{Error, Result};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Grammar for the canonical `major-minor-patch` form.
pub static VERSION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+)-([0-9]+)-([0-9]+)$").expect("valid version regex"));

/// An immutable major-minor-patch version with canonical form `"M-m-p"`.
///
/// Cheap value type; unlike the other identity objects it is not interned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SchemaVersion {
    major: u32,
    minor: u32,
    patch: u32,
}

impl SchemaVersion {
    /// Create a version from its components.
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse the canonical `"M-m-p"` form.
    pub fn parse(value: &str) -> Result<Self> {
        let caps = VERSION_PATTERN
            .captures(value)
            .ok_or_else(|| Error::invalid_version(value))?;

        // The regex admits digit runs that overflow u32; treat those as
        // grammar violations too.
        let part = |i: usize| -> Result<u32> {
            caps[i]
                .parse::<u32>()
                .map_err(|_| Error::invalid_version(value))
        };

        Ok(Self::new(part(1)?, part(2)?, part(3)?))
    }

    /// Major component.
    pub fn major(&self) -> u32 {
        self.major
    }

    /// Minor component.
    pub fn minor(&self) -> u32 {
        self.minor
    }

    /// Patch component.
    pub fn patch(&self) -> u32 {
        self.patch
    }
}

impl Default for SchemaVersion {
    /// The conventional first published version, `1-0-0`.
    fn default() -> Self {
        Self::new(1, 0, 0)
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.major, self.minor, self.patch)
    }
}

impl std::str::FromStr for SchemaVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let v = SchemaVersion::parse("1-2-3").unwrap();
        assert_eq!(v.major(), 1);
        assert_eq!(v.minor(), 2);
        assert_eq!(v.patch(), 3);
        assert_eq!(v.to_string(), "1-2-3");
    }

    #[test]
    fn test_parse_zero_components() {
        let v = SchemaVersion::parse("0-0-0").unwrap();
        assert_eq!(v, SchemaVersion::new(0, 0, 0));
    }

    #[test]
    fn test_parse_rejects_bad_grammar() {
        for bad in [
            "", "1", "1-2", "1-2-3-4", "1.2.3", "v1-2-3", "1-2-x", "-1-2-3", "1--2-3",
        ] {
            let err = SchemaVersion::parse(bad).unwrap_err();
            assert!(
                matches!(err, Error::InvalidSchemaVersion { .. }),
                "expected InvalidSchemaVersion for {:?}, got {:?}",
                bad,
                err
            );
        }
    }

    #[test]
    fn test_parse_rejects_overflow() {
        let err = SchemaVersion::parse("99999999999-0-0").unwrap_err();
        assert!(matches!(err, Error::InvalidSchemaVersion { .. }));
    }

    #[test]
    fn test_ordering() {
        let a = SchemaVersion::parse("1-0-0").unwrap();
        let b = SchemaVersion::parse("1-0-1").unwrap();
        let c = SchemaVersion::parse("2-0-0").unwrap();
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn test_default_is_first_release() {
        assert_eq!(SchemaVersion::default().to_string(), "1-0-0");
    }
}
