//! Release metadata checking

use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::assets::{self, AssetSelection};
use crate::config::{user_agent, CheckerConfig};
use crate::error::{Result, UpdateError};
use crate::version::{self, normalize_tag};

/// Release information
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Release {
    /// Release tag (e.g., "v1.2.0")
    pub tag_name: String,

    /// Release body (changelog)
    #[serde(default)]
    pub body: Option<String>,

    /// Release assets
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

/// Release asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseAsset {
    /// Asset name
    pub name: String,

    /// Download URL
    pub browser_download_url: String,
}

/// Summary of a release check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateInfo {
    pub current_version: String,
    pub latest_version: String,
    pub update_available: bool,
    pub compatible: bool,
    pub download_url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub checksum_url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub release_notes: String,
}

impl UpdateInfo {
    /// Build the summary for a fetched release
    pub fn from_release(
        current_version: &str,
        release: &Release,
        binary_name: &str,
        platform: &assets::Platform,
    ) -> Self {
        let latest_version = normalize_tag(&release.tag_name).to_string();
        let comparison = version::compare(current_version, &latest_version);
        let AssetSelection {
            download_url,
            checksum_url,
        } = assets::select(&release.assets, binary_name, platform);

        Self {
            current_version: current_version.to_string(),
            latest_version,
            update_available: comparison.update_available,
            compatible: comparison.compatible,
            download_url,
            checksum_url,
            release_notes: release.body.clone().unwrap_or_default(),
        }
    }

    /// Whether an artifact exists for this platform
    pub fn has_artifact(&self) -> bool {
        !self.download_url.is_empty()
    }
}

/// Checks the release host for a newer build
pub struct ReleaseChecker {
    /// HTTP client
    client: reqwest::Client,

    /// Checker configuration
    config: CheckerConfig,
}

impl ReleaseChecker {
    /// Create a new release checker
    pub fn new(config: CheckerConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent(&config.build.version))
            .timeout(config.timeout)
            .build()
            .map_err(|e| UpdateError::network("failed to create HTTP client", e))?;

        Ok(Self { client, config })
    }

    /// Get the checker configuration
    pub fn config(&self) -> &CheckerConfig {
        &self.config
    }

    /// Fetch the latest release
    pub async fn get_latest(&self) -> Result<Release> {
        let url = self.config.latest_release_url();
        debug!("Fetching latest release from: {}", url);

        let mut request = self.client.get(&url);
        if let Some(token) = &self.config.token {
            request = request
                .header(AUTHORIZATION, format!("Bearer {}", token))
                .header(ACCEPT, "application/vnd.github+json");
        }

        let response = request
            .send()
            .await
            .map_err(|e| UpdateError::network("failed to fetch release metadata", e))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(UpdateError::HttpStatus {
                url,
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| UpdateError::network("failed to read release metadata", e))?;

        serde_json::from_slice(&bytes).map_err(|e| UpdateError::parse(e.to_string()))
    }

    /// Check whether an update is available
    ///
    /// Either returns a fully populated summary or an error.
    pub async fn check(&self) -> Result<UpdateInfo> {
        let release = self.get_latest().await?;
        let info = UpdateInfo::from_release(
            &self.config.build.version,
            &release,
            &self.config.binary_name,
            &self.config.platform,
        );

        if info.update_available {
            info!(
                "Update available: {} -> {}",
                info.current_version, info.latest_version
            );
        } else {
            debug!("Already on latest version: {}", info.current_version);
        }

        if !info.has_artifact() {
            debug!(
                "No {} asset for platform {}",
                self.config.binary_name, self.config.platform
            );
        }

        Ok(info)
    }
}
