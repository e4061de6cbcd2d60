//! Tools-version directive parsing and gating.
//!
//! Every manifest may open with a directive declaring which schema rules it
//! targets:
//!
//! ```text
//! # capstan-tools-version:1.2
//! ```
//!
//! The directive must be resolvable from the first line alone, before any
//! evaluation happens. A manifest without a directive is treated as targeting
//! the minimum supported version so that old manifests keep loading.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// The directive marker expected after the leading `#`.
pub const DIRECTIVE_MARKER: &str = "capstan-tools-version";

/// Error resolving the tools-version of a manifest.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ToolsVersionError {
    #[error("malformed tools-version directive: `{line}`")]
    Malformed { line: String },

    #[error("manifest requires tools-version {requested}, but the maximum supported is {maximum}")]
    Unsupported {
        requested: ToolsVersion,
        maximum: ToolsVersion,
    },
}

/// A `(major, minor)` schema version declared by a manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ToolsVersion {
    major: u32,
    minor: u32,
}

impl ToolsVersion {
    /// Lowest schema version still accepted. Directive-less manifests
    /// default to this.
    pub const MINIMUM: ToolsVersion = ToolsVersion { major: 1, minor: 0 };

    /// Schema version written into newly scaffolded manifests, and the
    /// highest version the loader accepts.
    pub const CURRENT: ToolsVersion = ToolsVersion { major: 1, minor: 2 };

    /// Create a tools-version from its parts.
    pub const fn new(major: u32, minor: u32) -> Self {
        ToolsVersion { major, minor }
    }

    /// Major component.
    pub fn major(&self) -> u32 {
        self.major
    }

    /// Minor component.
    pub fn minor(&self) -> u32 {
        self.minor
    }

    /// Resolve the tools-version of a manifest from its leading bytes and
    /// reject versions newer than [`ToolsVersion::CURRENT`].
    ///
    /// Only the first line is inspected. An absent directive defaults to
    /// [`ToolsVersion::MINIMUM`]; a present but unparsable one is an error.
    pub fn resolve(source: &[u8]) -> Result<Self, ToolsVersionError> {
        let version = Self::parse_directive(source)?.unwrap_or(Self::MINIMUM);

        if version > Self::CURRENT {
            return Err(ToolsVersionError::Unsupported {
                requested: version,
                maximum: Self::CURRENT,
            });
        }

        Ok(version)
    }

    /// Parse the directive from the first line, if one is present.
    fn parse_directive(source: &[u8]) -> Result<Option<Self>, ToolsVersionError> {
        let first_line = match source.split(|&b| b == b'\n').next() {
            Some(line) => String::from_utf8_lossy(line),
            None => return Ok(None),
        };
        let line = first_line.trim();

        let Some(rest) = line.strip_prefix('#') else {
            return Ok(None);
        };
        let Some(spec) = rest.trim_start().strip_prefix(DIRECTIVE_MARKER) else {
            return Ok(None);
        };

        // From here on the directive is committed; any parse failure is an
        // error rather than a fallback to the default.
        let malformed = || ToolsVersionError::Malformed {
            line: line.to_string(),
        };

        let version = spec
            .trim_start()
            .strip_prefix(':')
            .ok_or_else(malformed)?
            .trim();

        version.parse().map(Some).map_err(|_| malformed())
    }

    /// Whether dependency requirements may be full semver ranges
    /// (`{"range": "..."}`) instead of major-version floors.
    pub fn supports_requirement_ranges(&self) -> bool {
        *self >= ToolsVersion::new(1, 1)
    }

    /// Whether the manifest may declare its own package version.
    pub fn supports_package_version(&self) -> bool {
        *self >= ToolsVersion::new(1, 2)
    }
}

impl fmt::Display for ToolsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for ToolsVersion {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (major, minor) = s.split_once('.').ok_or(())?;
        Ok(ToolsVersion {
            major: major.trim().parse().map_err(|_| ())?,
            minor: minor.trim().parse().map_err(|_| ())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_directive() {
        let src = b"# capstan-tools-version:1.1\n[package]\nname = \"x\"\n";
        assert_eq!(ToolsVersion::resolve(src).unwrap(), ToolsVersion::new(1, 1));
    }

    #[test]
    fn test_resolve_absent_defaults_to_minimum() {
        let src = b"[package]\nname = \"x\"\n";
        assert_eq!(ToolsVersion::resolve(src).unwrap(), ToolsVersion::MINIMUM);
    }

    #[test]
    fn test_resolve_plain_comment_is_not_a_directive() {
        let src = b"# just a comment\n[package]\nname = \"x\"\n";
        assert_eq!(ToolsVersion::resolve(src).unwrap(), ToolsVersion::MINIMUM);
    }

    #[test]
    fn test_resolve_malformed_directive() {
        let src = b"# capstan-tools-version:not.a.version\n";
        assert!(matches!(
            ToolsVersion::resolve(src),
            Err(ToolsVersionError::Malformed { .. })
        ));

        let src = b"# capstan-tools-version 1.0\n";
        assert!(matches!(
            ToolsVersion::resolve(src),
            Err(ToolsVersionError::Malformed { .. })
        ));
    }

    #[test]
    fn test_resolve_unsupported_version() {
        let src = b"# capstan-tools-version:9.9\n";
        let err = ToolsVersion::resolve(src).unwrap_err();
        assert_eq!(
            err,
            ToolsVersionError::Unsupported {
                requested: ToolsVersion::new(9, 9),
                maximum: ToolsVersion::CURRENT,
            }
        );
    }

    #[test]
    fn test_resolve_only_reads_first_line() {
        let src = b"[package]\n# capstan-tools-version:9.9\n";
        assert_eq!(ToolsVersion::resolve(src).unwrap(), ToolsVersion::MINIMUM);
    }

    #[test]
    fn test_ordering() {
        assert!(ToolsVersion::new(1, 0) < ToolsVersion::new(1, 1));
        assert!(ToolsVersion::new(1, 2) < ToolsVersion::new(2, 0));
        assert!(ToolsVersion::MINIMUM <= ToolsVersion::CURRENT);
    }

    #[test]
    fn test_feature_gates() {
        assert!(!ToolsVersion::new(1, 0).supports_requirement_ranges());
        assert!(ToolsVersion::new(1, 1).supports_requirement_ranges());
        assert!(!ToolsVersion::new(1, 1).supports_package_version());
        assert!(ToolsVersion::new(1, 2).supports_package_version());
    }

    #[test]
    fn test_display_roundtrip() {
        let v = ToolsVersion::new(1, 2);
        assert_eq!(v.to_string(), "1.2");
        assert_eq!("1.2".parse::<ToolsVersion>().unwrap(), v);
    }
}
