//! SHA-256 checksum verification against a release manifest
//!
//! The manifest is `sha256sum` output: one `<hex-digest>  <filename>` record
//! per line. Under the default lenient policy only an actual digest mismatch
//! is fatal; an unreachable manifest or a missing entry is logged and the
//! file passes unverified.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

use sha2::{Digest, Sha256};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{user_agent, ChecksumPolicy, DEFAULT_DOWNLOAD_TIMEOUT};
use crate::error::{Result, UpdateError};

/// Read buffer for hashing
const HASH_BUFFER_SIZE: usize = 8192;

/// Why verification did not take place
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// No manifest URL was configured
    NoManifest,

    /// The manifest could not be fetched or read
    ManifestUnavailable(String),

    /// The manifest has no record for the file
    NoEntry,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoManifest => write!(f, "no checksum manifest configured"),
            Self::ManifestUnavailable(reason) => {
                write!(f, "checksum manifest unavailable: {}", reason)
            }
            Self::NoEntry => write!(f, "no matching checksum entry"),
        }
    }
}

/// Result of a verification attempt that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    /// Digest matched the manifest
    Verified { digest: String },

    /// Verification was skipped
    Skipped(SkipReason),
}

impl Verification {
    /// Whether the digest was actually checked
    pub fn is_verified(&self) -> bool {
        matches!(self, Self::Verified { .. })
    }
}

/// Find the digest recorded for `filename` in a manifest
///
/// Records need at least two tokens; the first is the digest and the last
/// the (optionally path-prefixed) filename. The first matching record wins.
/// Returns an empty string when nothing matches.
pub fn lookup(manifest: &str, filename: &str) -> String {
    if filename.is_empty() {
        return String::new();
    }
    let suffix = format!("/{}", filename);

    manifest
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .find_map(|line| {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 2 {
                return None;
            }
            let name = parts[parts.len() - 1];
            (name == filename || name.ends_with(&suffix)).then(|| parts[0].to_string())
        })
        .unwrap_or_default()
}

/// Calculate the SHA-256 of a file as lowercase hex
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = File::open(path).map_err(|e| {
        UpdateError::io(
            format!("failed to open {} for checksum", path.display()),
            e,
        )
    })?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; HASH_BUFFER_SIZE];

    loop {
        let read = file.read(&mut buffer).map_err(|e| {
            UpdateError::io(
                format!("failed to read {} for checksum", path.display()),
                e,
            )
        })?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Verifies downloaded files against a checksum manifest
pub struct ChecksumVerifier {
    /// HTTP client
    client: reqwest::Client,

    /// Behavior when verification cannot happen
    policy: ChecksumPolicy,
}

impl ChecksumVerifier {
    /// Create a verifier with the default timeout
    pub fn new(policy: ChecksumPolicy) -> Result<Self> {
        Self::with_timeout(policy, DEFAULT_DOWNLOAD_TIMEOUT)
    }

    /// Create a verifier with an explicit per-request timeout
    pub fn with_timeout(policy: ChecksumPolicy, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent(env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| UpdateError::network("failed to create HTTP client", e))?;
        Ok(Self::from_client(client, policy))
    }

    /// Reuse an existing HTTP client
    pub fn from_client(client: reqwest::Client, policy: ChecksumPolicy) -> Self {
        Self { client, policy }
    }

    /// Get the checksum policy
    pub fn policy(&self) -> ChecksumPolicy {
        self.policy
    }

    /// Verify `file_path` against the manifest entry for `target_file_name`
    ///
    /// Cancellation while the manifest is being fetched is an error under
    /// either policy.
    pub async fn verify(
        &self,
        file_path: &Path,
        manifest_url: &str,
        target_file_name: &str,
        cancel: &CancellationToken,
    ) -> Result<Verification> {
        if manifest_url.trim().is_empty() {
            debug!("No checksum manifest configured, skipping verification");
            return Ok(Verification::Skipped(SkipReason::NoManifest));
        }

        let fetched = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("Checksum manifest fetch cancelled");
                return Err(UpdateError::Cancelled);
            }
            fetched = self.fetch_manifest(manifest_url) => fetched,
        };

        let manifest = match fetched {
            Ok(manifest) => manifest,
            Err(reason) => return self.skip(SkipReason::ManifestUnavailable(reason)),
        };

        let expected = lookup(&manifest, target_file_name);
        if expected.is_empty() {
            warn!(
                "Checksum manifest has no entry for {}",
                target_file_name
            );
            return self.skip(SkipReason::NoEntry);
        }

        let actual = sha256_file(file_path)?;
        if actual != expected {
            return Err(UpdateError::ChecksumMismatch { expected, actual });
        }

        info!("Checksum verified for {}", target_file_name);
        Ok(Verification::Verified { digest: actual })
    }

    /// Fetch the manifest text; failures come back as a reason string
    async fn fetch_manifest(&self, url: &str) -> std::result::Result<String, String> {
        debug!("Fetching checksum manifest from: {}", url);

        let response = self.client.get(url).send().await.map_err(|e| {
            warn!("Failed to download checksum manifest: {}", e);
            e.to_string()
        })?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            warn!("Checksum manifest returned status {}", status.as_u16());
            return Err(format!("HTTP {}", status.as_u16()));
        }

        response.text().await.map_err(|e| {
            warn!("Failed to read checksum manifest: {}", e);
            e.to_string()
        })
    }

    fn skip(&self, reason: SkipReason) -> Result<Verification> {
        if self.policy.is_strict() {
            return Err(UpdateError::ChecksumUnavailable {
                reason: reason.to_string(),
            });
        }
        warn!("Proceeding without checksum verification: {}", reason);
        Ok(Verification::Skipped(reason))
    }
}
