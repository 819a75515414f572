//! Update orchestration: download, verify, atomically replace
//!
//! An [`Updater`] walks a small state machine:
//!
//! ```text
//! Idle -> Downloading -> Verifying -> Replacing -> Complete
//!              \              \            \
//!               +--------------+------------+--> Failed
//! ```
//!
//! `Verifying` is skipped when no checksum manifest is configured. Each
//! transition is reported to the progress observer, and a failure anywhere
//! produces exactly one `failed` event. The target binary is only touched in
//! `Replacing`, through a same-directory rename, so it is never left missing
//! or truncated.

use std::fs::{self, File};
use std::path::Path;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::checksum::{ChecksumVerifier, Verification};
use crate::config::{user_agent, UpdaterConfig};
use crate::download::Downloader;
use crate::error::{Result, UpdateError};
use crate::progress::{NoopObserver, ProgressObserver, UpdateProgress, UpdateStage};
use crate::releases::UpdateInfo;

/// Prefix of the staged replacement next to the target
const STAGING_PREFIX: &str = ".core-update-";

/// Lifecycle state of an [`Updater`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdaterState {
    Idle,
    Downloading,
    Verifying,
    Replacing,
    Complete,
    Failed,
}

impl UpdaterState {
    /// Whether the updater can no longer run
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Failed)
    }

    /// Progress stage reported for this state
    fn stage(self) -> Option<UpdateStage> {
        match self {
            Self::Idle => None,
            Self::Downloading => Some(UpdateStage::Downloading),
            Self::Verifying => Some(UpdateStage::Verifying),
            Self::Replacing => Some(UpdateStage::Replacing),
            Self::Complete => Some(UpdateStage::Complete),
            Self::Failed => Some(UpdateStage::Failed),
        }
    }
}

/// Applies a downloaded release over a target binary
pub struct Updater {
    /// Update configuration
    config: UpdaterConfig,

    /// Artifact downloader
    downloader: Downloader,

    /// Checksum verifier
    verifier: ChecksumVerifier,

    /// Progress observer
    observer: Box<dyn ProgressObserver>,

    /// Cancellation for the whole pipeline
    cancel: CancellationToken,

    /// Current state
    state: UpdaterState,

    /// Stage that was active when the update failed
    failed_stage: Option<UpdateStage>,
}

impl Updater {
    /// Create a new updater
    pub fn new(config: UpdaterConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent(&config.client_version))
            .timeout(config.timeout)
            .build()
            .map_err(|e| UpdateError::network("failed to create HTTP client", e))?;

        let mut downloader = Downloader::from_client(client.clone());
        if let Some(dir) = &config.temp_dir {
            downloader = downloader.with_temp_dir(dir);
        }
        let verifier = ChecksumVerifier::from_client(client, config.checksum_policy);

        debug!(
            "Updater initialized: target={:?}, checksums={}",
            config.target_path,
            !config.checksum_url.is_empty()
        );

        Ok(Self {
            config,
            downloader,
            verifier,
            observer: Box::new(NoopObserver),
            cancel: CancellationToken::new(),
            state: UpdaterState::Idle,
            failed_stage: None,
        })
    }

    /// Create an updater for a check result
    pub fn from_info(info: &UpdateInfo, target_path: impl Into<std::path::PathBuf>) -> Result<Self> {
        Self::new(UpdaterConfig::from_info(info, target_path))
    }

    /// Register the progress observer
    pub fn with_observer(mut self, observer: impl ProgressObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    /// Use an externally owned cancellation token
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token that cancels this updater when triggered
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Get the update configuration
    pub fn config(&self) -> &UpdaterConfig {
        &self.config
    }

    /// Current state
    pub fn state(&self) -> UpdaterState {
        self.state
    }

    /// Stage during which the update failed, if it did
    pub fn failed_stage(&self) -> Option<UpdateStage> {
        self.failed_stage
    }

    /// Download, verify and install the update
    ///
    /// Configuration is validated before any I/O. Any later failure emits a
    /// single `failed` event and is returned unchanged; nothing is retried.
    pub async fn apply(&mut self) -> Result<()> {
        if self.state != UpdaterState::Idle {
            return Err(UpdateError::config("updater has already been applied"));
        }
        self.config.validate()?;

        info!("Applying update from {}", self.config.download_url);

        match self.run().await {
            Ok(()) => Ok(()),
            Err(e) => {
                self.fail(&e);
                Err(e)
            }
        }
    }

    async fn run(&mut self) -> Result<()> {
        self.enter(UpdaterState::Downloading);
        self.observer.on_progress(&UpdateProgress::downloading(0, 0));

        // Dropped on every path out of this function, removing the temp file
        let downloaded = self
            .downloader
            .download(&self.config.download_url, &*self.observer, &self.cancel)
            .await?;

        if !self.config.checksum_url.trim().is_empty() {
            self.ensure_not_cancelled()?;
            self.enter(UpdaterState::Verifying);
            self.observer
                .on_progress(&UpdateProgress::stage(UpdateStage::Verifying));

            let asset_name = self.config.resolved_asset_name();
            let outcome = self
                .verifier
                .verify(
                    downloaded.path(),
                    &self.config.checksum_url,
                    &asset_name,
                    &self.cancel,
                )
                .await?;

            if let Verification::Skipped(reason) = outcome {
                warn!("Update not verified: {}", reason);
            }
        }

        self.ensure_not_cancelled()?;
        self.enter(UpdaterState::Replacing);
        self.observer
            .on_progress(&UpdateProgress::stage(UpdateStage::Replacing));
        replace_binary(downloaded.path(), &self.config.target_path)?;

        self.enter(UpdaterState::Complete);
        self.observer
            .on_progress(&UpdateProgress::stage(UpdateStage::Complete));

        info!("Update applied to {:?}", self.config.target_path);
        Ok(())
    }

    fn enter(&mut self, state: UpdaterState) {
        debug!("Updater state: {:?} -> {:?}", self.state, state);
        self.state = state;
    }

    fn ensure_not_cancelled(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(UpdateError::Cancelled);
        }
        Ok(())
    }

    fn fail(&mut self, e: &UpdateError) {
        self.failed_stage = self.state.stage();
        debug!(
            "Update failed while {}: {}",
            self.failed_stage.map_or("starting", UpdateStage::as_str),
            e
        );
        self.enter(UpdaterState::Failed);
        self.observer.on_progress(&UpdateProgress::failed(e));
    }
}

/// Atomically replace `target` with the contents of `new_binary`
///
/// The running executable is replaced through `self_replace`, which knows
/// how to deal with locked images on Windows. Any other target gets a
/// staged copy in its own directory that is renamed over it, keeping the
/// target's permission bits (0755 for a new file).
pub fn replace_binary(new_binary: &Path, target: &Path) -> Result<()> {
    if is_current_exe(target) {
        info!("Replacing running executable via self-replace");
        return self_replace::self_replace(new_binary).map_err(|e| UpdateError::replace(target, e));
    }

    let parent = target
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    debug!("Replacing binary: {:?} -> {:?}", new_binary, target);

    let mut staged = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempfile_in(parent)
        .map_err(|e| UpdateError::replace(target, e))?;

    let mut source = File::open(new_binary).map_err(|e| UpdateError::replace(target, e))?;
    std::io::copy(&mut source, &mut staged).map_err(|e| UpdateError::replace(target, e))?;
    staged
        .as_file()
        .sync_all()
        .map_err(|e| UpdateError::replace(target, e))?;

    let permissions = match fs::metadata(target) {
        Ok(metadata) => metadata.permissions(),
        Err(_) => new_file_permissions(new_binary).map_err(|e| UpdateError::replace(target, e))?,
    };
    fs::set_permissions(staged.path(), permissions).map_err(|e| UpdateError::replace(target, e))?;

    staged
        .persist(target)
        .map_err(|e| UpdateError::replace(target, e.error))?;

    info!("Binary replaced successfully");
    Ok(())
}

#[cfg(unix)]
fn new_file_permissions(_new_binary: &Path) -> std::io::Result<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Ok(fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn new_file_permissions(new_binary: &Path) -> std::io::Result<fs::Permissions> {
    Ok(fs::metadata(new_binary)?.permissions())
}

/// Whether `target` resolves to the running executable
fn is_current_exe(target: &Path) -> bool {
    let Ok(exe) = std::env::current_exe().and_then(|p| p.canonicalize()) else {
        return false;
    };
    target
        .canonicalize()
        .map(|resolved| resolved == exe)
        .unwrap_or(false)
}
