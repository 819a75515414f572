//! Checker and updater configuration
//!
//! Defaults are compiled in; a handful of environment variables override
//! them when the CLI builds its configuration with `from_env`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use crate::assets::Platform;
use crate::error::{Result, UpdateError};
use crate::releases::UpdateInfo;
use crate::version::BuildInfo;

/// Release metadata API used when no override is configured
pub const DEFAULT_API_BASE_URL: &str = "https://api-cli.coreofficialhq.com";

/// Repository owner publishing releases
pub const DEFAULT_REPO_OWNER: &str = "Tfc538";

/// Repository publishing releases
pub const DEFAULT_REPO_NAME: &str = "core-cli";

/// Binary name used as the asset name prefix
pub const DEFAULT_BINARY_NAME: &str = "core";

/// Per-request timeout for release metadata
pub const DEFAULT_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

/// Per-request timeout for artifact and manifest downloads
pub const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);

/// Environment variable overriding the metadata API base URL
pub const ENV_API_URL: &str = "CORE_UPDATE_API_URL";

/// Environment variable enabling strict checksum verification
pub const ENV_STRICT_CHECKSUMS: &str = "CORE_UPDATE_STRICT_CHECKSUMS";

/// Environment variables searched for a bearer token, in order
pub const TOKEN_ENV_VARS: &[&str] = &["CORE_GITHUB_TOKEN", "GH_TOKEN", "GITHUB_TOKEN"];

/// What to do when a checksum cannot be checked
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChecksumPolicy {
    /// Warn and proceed when the manifest is unreachable or lacks an entry
    #[default]
    Lenient,

    /// Fail unless the download was actually verified
    Strict,
}

impl ChecksumPolicy {
    /// Read the policy from `CORE_UPDATE_STRICT_CHECKSUMS`
    pub fn from_env() -> Self {
        match std::env::var(ENV_STRICT_CHECKSUMS) {
            Ok(value) if is_truthy(&value) => Self::Strict,
            _ => Self::Lenient,
        }
    }

    /// Whether missing verification is fatal
    pub fn is_strict(self) -> bool {
        matches!(self, Self::Strict)
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// First non-blank bearer token from the environment
pub fn token_from_env() -> Option<String> {
    TOKEN_ENV_VARS.iter().find_map(|var| {
        std::env::var(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    })
}

/// Configuration for the release checker
#[derive(Debug, Clone)]
pub struct CheckerConfig {
    /// Build metadata of the running binary
    pub build: BuildInfo,

    /// Base URL of the release metadata API
    pub api_base_url: String,

    /// Repository owner
    pub repo_owner: String,

    /// Repository name
    pub repo_name: String,

    /// Binary name used to match platform assets
    pub binary_name: String,

    /// Optional bearer token
    pub token: Option<String>,

    /// Per-request timeout
    pub timeout: Duration,

    /// Platform whose artifact should be selected
    pub platform: Platform,
}

impl CheckerConfig {
    /// Create a configuration with compiled-in defaults
    pub fn new(build: BuildInfo) -> Self {
        Self {
            build,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            repo_owner: DEFAULT_REPO_OWNER.to_string(),
            repo_name: DEFAULT_REPO_NAME.to_string(),
            binary_name: DEFAULT_BINARY_NAME.to_string(),
            token: None,
            timeout: DEFAULT_CHECK_TIMEOUT,
            platform: Platform::current(),
        }
    }

    /// Create a configuration and apply environment overrides
    pub fn from_env(build: BuildInfo) -> Self {
        let mut config = Self::new(build);

        if let Ok(url) = std::env::var(ENV_API_URL) {
            if !url.trim().is_empty() {
                debug!("Using release API override from {}", ENV_API_URL);
                config = config.with_api_base_url(url);
            }
        }

        if let Some(token) = token_from_env() {
            config = config.with_token(token);
        }

        config
    }

    /// Override the API base URL; blank values keep the default
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        if !url.trim().is_empty() {
            self.api_base_url = url.trim().to_string();
        }
        self
    }

    /// Set the repository to query
    pub fn with_repo(mut self, owner: impl Into<String>, name: impl Into<String>) -> Self {
        self.repo_owner = owner.into();
        self.repo_name = name.into();
        self
    }

    /// Set the binary name used for asset matching
    pub fn with_binary_name(mut self, name: impl Into<String>) -> Self {
        self.binary_name = name.into();
        self
    }

    /// Set the bearer token; blank tokens are ignored
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.token = if token.trim().is_empty() {
            None
        } else {
            Some(token.trim().to_string())
        };
        self
    }

    /// Set the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Select assets for a platform other than the host
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Endpoint returning the latest release
    pub fn latest_release_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/releases/latest",
            self.api_base_url.trim_end_matches('/'),
            self.repo_owner,
            self.repo_name
        )
    }
}

/// User agent sent with every request
pub fn user_agent(version: &str) -> String {
    format!(
        "core/{} ({}; {})",
        version,
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

/// Configuration for applying an update
#[derive(Debug, Clone)]
pub struct UpdaterConfig {
    /// Platform artifact URL
    pub download_url: String,

    /// Checksum manifest URL, empty to skip verification
    pub checksum_url: String,

    /// Binary to replace
    pub target_path: PathBuf,

    /// Manifest entry to verify against, defaults to the URL's file name
    pub asset_name: Option<String>,

    /// Behavior when verification cannot happen
    pub checksum_policy: ChecksumPolicy,

    /// Per-request timeout
    pub timeout: Duration,

    /// Directory for the downloaded artifact, OS temp dir when unset
    pub temp_dir: Option<PathBuf>,

    /// Version string for the user agent
    pub client_version: String,
}

impl UpdaterConfig {
    /// Create a configuration for downloading `download_url` over `target_path`
    pub fn new(download_url: impl Into<String>, target_path: impl Into<PathBuf>) -> Self {
        Self {
            download_url: download_url.into(),
            checksum_url: String::new(),
            target_path: target_path.into(),
            asset_name: None,
            checksum_policy: ChecksumPolicy::default(),
            timeout: DEFAULT_DOWNLOAD_TIMEOUT,
            temp_dir: None,
            client_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Build a configuration from a check result
    pub fn from_info(info: &UpdateInfo, target_path: impl Into<PathBuf>) -> Self {
        Self::new(info.download_url.clone(), target_path)
            .with_checksum_url(info.checksum_url.clone())
            .with_client_version(info.current_version.clone())
    }

    /// Set the checksum manifest URL
    pub fn with_checksum_url(mut self, url: impl Into<String>) -> Self {
        self.checksum_url = url.into();
        self
    }

    /// Set the manifest entry name explicitly
    pub fn with_asset_name(mut self, name: impl Into<String>) -> Self {
        self.asset_name = Some(name.into());
        self
    }

    /// Set the checksum policy
    pub fn with_checksum_policy(mut self, policy: ChecksumPolicy) -> Self {
        self.checksum_policy = policy;
        self
    }

    /// Set the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Download into a specific directory
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    /// Set the version advertised in the user agent
    pub fn with_client_version(mut self, version: impl Into<String>) -> Self {
        self.client_version = version.into();
        self
    }

    /// Name looked up in the checksum manifest
    pub fn resolved_asset_name(&self) -> String {
        if let Some(name) = self.asset_name.as_deref().filter(|n| !n.is_empty()) {
            return name.to_string();
        }
        asset_name_from_url(&self.download_url)
            .or_else(|| file_name(&self.target_path))
            .unwrap_or_default()
    }

    /// Check required fields before any I/O
    pub fn validate(&self) -> Result<()> {
        if self.download_url.trim().is_empty() {
            return Err(UpdateError::config("download URL not specified"));
        }
        if self.target_path.as_os_str().is_empty() {
            return Err(UpdateError::config("target path not specified"));
        }
        if self.checksum_policy.is_strict() && self.checksum_url.trim().is_empty() {
            return Err(UpdateError::config(
                "strict checksum verification requires a checksum URL",
            ));
        }
        Ok(())
    }
}

/// Last path segment of a URL, ignoring query and fragment
fn asset_name_from_url(url: &str) -> Option<String> {
    let without_query = url.split(['?', '#']).next().unwrap_or(url);
    without_query
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty() && !segment.contains(':'))
        .map(String::from)
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        std::env::remove_var(ENV_API_URL);
        std::env::remove_var(ENV_STRICT_CHECKSUMS);
        for var in TOKEN_ENV_VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_latest_release_url_trims_trailing_slash() {
        let config = CheckerConfig::new(BuildInfo::dev())
            .with_api_base_url("http://localhost:8080/")
            .with_repo("acme", "tool");
        assert_eq!(
            config.latest_release_url(),
            "http://localhost:8080/repos/acme/tool/releases/latest"
        );
    }

    #[test]
    fn test_blank_overrides_keep_defaults() {
        let config = CheckerConfig::new(BuildInfo::dev())
            .with_api_base_url("   ")
            .with_token("  ");
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert!(config.token.is_none());
        assert_eq!(config.timeout, DEFAULT_CHECK_TIMEOUT);
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        clear_env();
        std::env::set_var(ENV_API_URL, "http://mirror.local");
        std::env::set_var("GH_TOKEN", "gh-secret");
        std::env::set_var("GITHUB_TOKEN", "github-secret");

        let config = CheckerConfig::from_env(BuildInfo::dev());
        assert_eq!(config.api_base_url, "http://mirror.local");
        assert_eq!(config.token.as_deref(), Some("gh-secret"));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_token_precedence() {
        clear_env();
        std::env::set_var("CORE_GITHUB_TOKEN", "core-secret");
        std::env::set_var("GITHUB_TOKEN", "github-secret");
        assert_eq!(token_from_env().as_deref(), Some("core-secret"));

        std::env::set_var("CORE_GITHUB_TOKEN", "");
        assert_eq!(token_from_env().as_deref(), Some("github-secret"));

        clear_env();
        assert!(token_from_env().is_none());
    }

    #[test]
    #[serial]
    fn test_checksum_policy_from_env() {
        clear_env();
        assert_eq!(ChecksumPolicy::from_env(), ChecksumPolicy::Lenient);

        std::env::set_var(ENV_STRICT_CHECKSUMS, "true");
        assert_eq!(ChecksumPolicy::from_env(), ChecksumPolicy::Strict);

        std::env::set_var(ENV_STRICT_CHECKSUMS, "0");
        assert_eq!(ChecksumPolicy::from_env(), ChecksumPolicy::Lenient);

        clear_env();
    }

    #[test]
    fn test_updater_config_validation() {
        let missing_url = UpdaterConfig::new("", "/usr/local/bin/core");
        assert!(matches!(
            missing_url.validate(),
            Err(UpdateError::Config { .. })
        ));

        let missing_target = UpdaterConfig::new("https://example.com/core-linux-amd64", "");
        assert!(matches!(
            missing_target.validate(),
            Err(UpdateError::Config { .. })
        ));

        let strict_without_manifest =
            UpdaterConfig::new("https://example.com/core-linux-amd64", "/tmp/core")
                .with_checksum_policy(ChecksumPolicy::Strict);
        assert!(strict_without_manifest.validate().is_err());

        let ok = UpdaterConfig::new("https://example.com/core-linux-amd64", "/tmp/core");
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_resolved_asset_name() {
        let config = UpdaterConfig::new(
            "https://example.com/releases/download/v1.2.0/core-linux-amd64?raw=1",
            "/usr/local/bin/core",
        );
        assert_eq!(config.resolved_asset_name(), "core-linux-amd64");

        let explicit = config.clone().with_asset_name("core-darwin-arm64");
        assert_eq!(explicit.resolved_asset_name(), "core-darwin-arm64");

        let trailing = UpdaterConfig::new("https://example.com/", "/usr/local/bin/core");
        assert_eq!(trailing.resolved_asset_name(), "core");
    }

    #[test]
    fn test_user_agent() {
        let agent = user_agent("1.2.0");
        assert!(agent.starts_with("core/1.2.0 ("));
        assert!(agent.contains(std::env::consts::OS));
    }
}
