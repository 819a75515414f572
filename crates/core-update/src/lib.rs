//! Self-update engine for CORE CLI
//!
//! Provides:
//! - Version checking against the release metadata API
//! - Platform asset selection
//! - Artifact download with progress reporting
//! - SHA-256 verification against a checksum manifest
//! - Atomic replacement of the installed binary
//!
//! A caller checks first, then applies:
//!
//! ```no_run
//! use core_update::{BuildInfo, CheckerConfig, ReleaseChecker, Updater};
//!
//! # async fn run() -> core_update::Result<()> {
//! let checker = ReleaseChecker::new(CheckerConfig::from_env(BuildInfo::dev()))?;
//! let info = checker.check().await?;
//!
//! if info.update_available && info.has_artifact() {
//!     let target = std::env::current_exe().map_err(|e| core_update::UpdateError::io("current exe", e))?;
//!     Updater::from_info(&info, target)?.apply().await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod assets;
pub mod checksum;
pub mod config;
pub mod download;
pub mod error;
pub mod progress;
pub mod releases;
pub mod updater;
pub mod version;

pub use assets::{AssetSelection, Platform};
pub use checksum::{ChecksumVerifier, SkipReason, Verification};
pub use config::{ChecksumPolicy, CheckerConfig, UpdaterConfig};
pub use download::{DownloadedFile, Downloader};
pub use error::{Result, UpdateError};
pub use progress::{NoopObserver, ProgressObserver, TracingObserver, UpdateProgress, UpdateStage};
pub use releases::{Release, ReleaseAsset, ReleaseChecker, UpdateInfo};
pub use updater::{Updater, UpdaterState};
pub use version::{BuildInfo, Comparison};

/// Token accepted by [`Updater::with_cancellation`]
pub use tokio_util::sync::CancellationToken;
