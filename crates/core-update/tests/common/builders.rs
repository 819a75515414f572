//! Builder patterns for test data construction
//!
//! Provides fluent APIs for constructing releases, both as typed values and
//! as the JSON the release host serves.

use core_update::releases::{Release, ReleaseAsset};
use serde_json::{json, Value};

use super::constants::*;

/// Builder for constructing Release objects with sensible test defaults
#[derive(Debug, Clone)]
pub struct ReleaseBuilder {
    tag_name: String,
    body: Option<String>,
    assets: Vec<ReleaseAsset>,
}

impl ReleaseBuilder {
    /// Create a new ReleaseBuilder with minimal defaults
    pub fn new() -> Self {
        Self {
            tag_name: TAG_V1_2_0.to_string(),
            body: None,
            assets: Vec::new(),
        }
    }

    /// Set the tag name
    pub fn tag(mut self, tag: &str) -> Self {
        self.tag_name = tag.to_string();
        self
    }

    /// Set the release body/changelog
    pub fn body(mut self, body: &str) -> Self {
        self.body = Some(body.to_string());
        self
    }

    /// Add a single asset
    pub fn asset(mut self, name: &str, url: &str) -> Self {
        self.assets.push(ReleaseAsset {
            name: name.to_string(),
            browser_download_url: url.to_string(),
        });
        self
    }

    /// Add platform binaries and a checksum manifest hosted under `base_url`
    pub fn with_standard_assets(self, base_url: &str) -> Self {
        self.asset(ASSET_DARWIN_ARM64, &format!("{}/download/{}", base_url, ASSET_DARWIN_ARM64))
            .asset(ASSET_WINDOWS_AMD64, &format!("{}/download/{}", base_url, ASSET_WINDOWS_AMD64))
            .asset(ASSET_LINUX_AMD64, &format!("{}{}", base_url, BINARY_PATH))
            .asset(ASSET_CHECKSUMS, &format!("{}{}", base_url, CHECKSUMS_PATH))
    }

    /// Build the Release
    pub fn build(self) -> Release {
        Release {
            tag_name: self.tag_name,
            body: self.body,
            assets: self.assets,
        }
    }

    /// Build the JSON document served by the release host
    pub fn to_json(&self) -> Value {
        let assets: Vec<Value> = self
            .assets
            .iter()
            .map(|a| json!({ "name": a.name, "browser_download_url": a.browser_download_url }))
            .collect();

        json!({
            "tag_name": self.tag_name,
            "body": self.body.clone().unwrap_or_default(),
            "assets": assets,
        })
    }
}

impl Default for ReleaseBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Manifest line for `content` as published by `sha256sum`
pub fn checksum_line(content: &[u8], name: &str) -> String {
    use sha2::{Digest, Sha256};
    format!("{}  {}\n", hex::encode(Sha256::digest(content)), name)
}
