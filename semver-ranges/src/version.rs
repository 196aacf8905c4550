// SPDX-License-Identifier: MPL-2.0

//! Semantic versions reduced to their `major.minor.patch` triple.

use std::fmt::{self, Display};
use std::num::ParseIntError;
use std::str::FromStr;

use thiserror::Error;

/// Type for semantic versions: major.minor.patch.
///
/// Prerelease tags and build metadata are accepted by the parser but not kept,
/// so `1.2.3-beta.1+abc` and `1.2.3` are the same version.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SemanticVersion {
    /// Incremented on breaking changes.
    pub major: u64,
    /// Incremented on backwards compatible additions.
    pub minor: u64,
    /// Incremented on fixes.
    pub patch: u64,
}

impl SemanticVersion {
    /// Create a version with "major", "minor" and "patch" values.
    /// `version = major.minor.patch`
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Version 0.0.0.
    pub const fn zero() -> Self {
        Self::new(0, 0, 0)
    }

    /// Bump the patch number of a version.
    pub fn bump_patch(self) -> Self {
        Self::new(self.major, self.minor, self.patch.saturating_add(1))
    }

    /// Bump the minor number of a version, resetting the patch number.
    pub fn bump_minor(self) -> Self {
        Self::new(self.major, self.minor.saturating_add(1), 0)
    }

    /// Bump the major number of a version, resetting minor and patch.
    pub fn bump_major(self) -> Self {
        Self::new(self.major.saturating_add(1), 0, 0)
    }
}

impl From<(u64, u64, u64)> for SemanticVersion {
    fn from(tuple: (u64, u64, u64)) -> Self {
        let (major, minor, patch) = tuple;
        Self::new(major, minor, patch)
    }
}

impl Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Error creating [SemanticVersion] from [String].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionParseError {
    /// [SemanticVersion] must contain major, minor, patch versions.
    #[error("version {full_version} must contain 3 numbers separated by dot")]
    NotThreeParts {
        /// [SemanticVersion] that was being parsed.
        full_version: String,
    },
    /// Wrapper around [ParseIntError](core::num::ParseIntError).
    #[error("cannot parse '{version_part}' in '{full_version}' as u64: {parse_error}")]
    ParseIntError {
        /// [SemanticVersion] that was being parsed.
        full_version: String,
        /// A version part where parsing failed.
        version_part: String,
        /// A specific error resulted from parsing a part of the version as [u64].
        parse_error: ParseIntError,
    },
}

/// Strip a loose `=`/`v` prefix and everything from the first `-` or `+` on.
pub(crate) fn release_part(s: &str) -> &str {
    let s = s.trim();
    let s = s.strip_prefix('=').unwrap_or(s).trim_start();
    let s = s
        .strip_prefix('v')
        .or_else(|| s.strip_prefix('V'))
        .unwrap_or(s);
    let end = s.find(['-', '+']).unwrap_or(s.len());
    &s[..end]
}

impl FromStr for SemanticVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_u64 = |part: &str| {
            part.parse::<u64>()
                .map_err(|e| VersionParseError::ParseIntError {
                    full_version: s.to_string(),
                    version_part: part.to_string(),
                    parse_error: e,
                })
        };

        let mut parts = release_part(s).split('.');
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(major), Some(minor), Some(patch), None) => {
                let major = parse_u64(major)?;
                let minor = parse_u64(minor)?;
                let patch = parse_u64(patch)?;
                Ok(Self {
                    major,
                    minor,
                    patch,
                })
            }
            _ => Err(VersionParseError::NotThreeParts {
                full_version: s.to_string(),
            }),
        }
    }
}
