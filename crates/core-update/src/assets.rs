//! Platform asset selection
//!
//! Release assets are published as `{name}-{os}-{arch}` (optionally with an
//! `.exe`, `.tar.gz` or `.zip` suffix) next to a `checksums` manifest. OS and
//! architecture use the release pipeline's naming (`darwin`, `amd64`,
//! `arm64`), not Rust's target naming.

use tracing::debug;

use crate::releases::ReleaseAsset;

/// Marker substring identifying the checksum manifest asset
pub const CHECKSUMS_MARKER: &str = "checksums";

/// Suffixes appended to the base `{name}-{os}-{arch}` fragment, in order
const ASSET_SUFFIXES: &[&str] = &["", ".exe", ".tar.gz", ".zip"];

/// OS/architecture pair in release asset naming
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    /// Operating system (`linux`, `darwin`, `windows`, ...)
    pub os: String,

    /// Architecture (`amd64`, `arm64`, ...)
    pub arch: String,
}

impl Platform {
    /// Create a platform from release-style identifiers
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
        }
    }

    /// Platform of the running host
    pub fn current() -> Self {
        Self::from_rust(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Map Rust's `std::env::consts` identifiers to release naming
    pub fn from_rust(os: &str, arch: &str) -> Self {
        let os = match os {
            "macos" => "darwin",
            other => other,
        };
        let arch = match arch {
            "x86_64" => "amd64",
            "aarch64" => "arm64",
            "x86" => "386",
            other => other,
        };
        Self::new(os, arch)
    }

    /// Candidate name fragments for a binary on this platform, in order
    pub fn candidates(&self, binary_name: &str) -> Vec<String> {
        ASSET_SUFFIXES
            .iter()
            .map(|suffix| format!("{}-{}-{}{}", binary_name, self.os, self.arch, suffix))
            .collect()
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.os, self.arch)
    }
}

/// Download and checksum locations picked from a release
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetSelection {
    /// Platform artifact URL, empty when nothing matched
    pub download_url: String,

    /// Checksum manifest URL, empty when nothing matched
    pub checksum_url: String,
}

/// Pick the platform artifact and checksum manifest from an asset list
///
/// Assets are scanned in the order given and the last match wins for both
/// outputs. An asset may match both.
pub fn select(assets: &[ReleaseAsset], binary_name: &str, platform: &Platform) -> AssetSelection {
    let candidates = platform.candidates(binary_name);
    let mut selection = AssetSelection::default();

    for asset in assets {
        if candidates.iter().any(|c| asset.name.contains(c.as_str())) {
            debug!("Asset {} matches platform {}", asset.name, platform);
            selection.download_url = asset.browser_download_url.clone();
        }

        if asset.name.contains(CHECKSUMS_MARKER) {
            selection.checksum_url = asset.browser_download_url.clone();
        }
    }

    selection
}
