//! Version information and comparison

use semver::Version;
use serde::{Deserialize, Serialize};

/// Version reported by builds that were not stamped by the release pipeline
pub const DEV_VERSION: &str = "dev";

/// Build metadata for the running binary
///
/// Constructed once at process start and passed to the checker; never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildInfo {
    /// Version string (semver for release builds, `dev` otherwise)
    pub version: String,

    /// Git commit SHA (short)
    pub commit: String,

    /// Build date
    pub build_date: String,
}

impl BuildInfo {
    /// Create build info from explicit values
    pub fn new(
        version: impl Into<String>,
        commit: impl Into<String>,
        build_date: impl Into<String>,
    ) -> Self {
        Self {
            version: version.into(),
            commit: commit.into(),
            build_date: build_date.into(),
        }
    }

    /// Build info for a development build with unknown provenance
    pub fn dev() -> Self {
        Self::new(DEV_VERSION, "unknown", "unknown")
    }

    /// Parse semantic version
    pub fn semver(&self) -> Option<Version> {
        parse_version(&self.version)
    }

    /// Format as display string
    pub fn display(&self) -> String {
        format!(
            "CORE CLI v{}\nCommit: {}\nBuilt: {}",
            normalize_tag(&self.version),
            self.commit,
            self.build_date
        )
    }
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self::dev()
    }
}

impl std::fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// Outcome of comparing the running version against the latest release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Comparison {
    /// Latest strictly succeeds current, or current is not a semver
    pub update_available: bool,

    /// Both versions could be interpreted
    pub compatible: bool,
}

/// Strip a single leading `v` from a release tag
///
/// `v1.2.3` becomes `1.2.3`; anything else passes through unchanged.
pub fn normalize_tag(tag: &str) -> &str {
    tag.strip_prefix('v').unwrap_or(tag)
}

/// Parse a version string after tag normalization
pub fn parse_version(version: &str) -> Option<Version> {
    Version::parse(normalize_tag(version.trim())).ok()
}

/// Compare the running version with the latest published one
///
/// An unparseable latest version is never an update target, whatever the
/// running version. Otherwise an unparseable running version (e.g. `dev`)
/// is always out of date.
pub fn compare(current: &str, latest: &str) -> Comparison {
    let Some(latest) = parse_version(latest) else {
        return Comparison {
            update_available: false,
            compatible: false,
        };
    };

    let Some(current) = parse_version(current) else {
        return Comparison {
            update_available: true,
            compatible: true,
        };
    };

    Comparison {
        update_available: latest > current,
        compatible: true,
    }
}
