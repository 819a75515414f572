//! Update progress events and observers
//!
//! Events are delivered synchronously from the task doing the I/O. An
//! observer that blocks stalls the pipeline.

use serde::Serialize;
use tracing::{debug, info, warn};

/// Pipeline stage reported in a progress event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateStage {
    Downloading,
    Verifying,
    Replacing,
    Complete,
    Failed,
}

impl UpdateStage {
    /// Lowercase stage name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Downloading => "downloading",
            Self::Verifying => "verifying",
            Self::Replacing => "replacing",
            Self::Complete => "complete",
            Self::Failed => "failed",
        }
    }

    /// Whether no further events follow this stage
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Failed)
    }
}

impl std::fmt::Display for UpdateStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single progress event emitted during `Updater::apply`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateProgress {
    /// Current stage
    pub stage: UpdateStage,

    /// Download percentage (0-100), only meaningful while downloading
    pub percent: u8,

    /// Bytes received so far
    pub bytes_done: u64,

    /// Expected size, 0 when unknown
    pub bytes_total: u64,

    /// Error text, only set for `Failed`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UpdateProgress {
    /// Event for a stage without byte counts
    pub fn stage(stage: UpdateStage) -> Self {
        Self {
            stage,
            percent: 0,
            bytes_done: 0,
            bytes_total: 0,
            error: None,
        }
    }

    /// Download event; percent is derived and never exceeds 100
    pub fn downloading(bytes_done: u64, bytes_total: u64) -> Self {
        // A server sending more than it advertised would break bytes_done <= bytes_total
        let bytes_total = if bytes_total > 0 {
            bytes_total.max(bytes_done)
        } else {
            0
        };

        Self {
            stage: UpdateStage::Downloading,
            percent: percent_of(bytes_done, bytes_total),
            bytes_done,
            bytes_total,
            error: None,
        }
    }

    /// Terminal failure event carrying the error text
    pub fn failed(error: &dyn std::error::Error) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::stage(UpdateStage::Failed)
        }
    }
}

/// `floor(done * 100 / total)`, 0 when the total is unknown
pub fn percent_of(done: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    let percent = u128::from(done) * 100 / u128::from(total);
    // Clamped above, so the narrowing cannot truncate
    percent.min(100) as u8
}

/// Receiver of progress events
pub trait ProgressObserver: Send + Sync {
    /// Called once per event, in stage order
    fn on_progress(&self, progress: &UpdateProgress);
}

impl<F> ProgressObserver for F
where
    F: Fn(&UpdateProgress) + Send + Sync,
{
    fn on_progress(&self, progress: &UpdateProgress) {
        self(progress)
    }
}

/// Observer that ignores every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ProgressObserver for NoopObserver {
    fn on_progress(&self, _progress: &UpdateProgress) {}
}

/// Observer that logs stage transitions with `tracing`
///
/// Download chunks are logged at DEBUG, other stages at INFO and failures
/// at WARN.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ProgressObserver for TracingObserver {
    fn on_progress(&self, progress: &UpdateProgress) {
        match progress.stage {
            UpdateStage::Downloading => debug!(
                "Downloading: {}/{} bytes ({}%)",
                progress.bytes_done, progress.bytes_total, progress.percent
            ),
            UpdateStage::Failed => warn!(
                "Update failed: {}",
                progress.error.as_deref().unwrap_or("unknown error")
            ),
            stage => info!("Update stage: {}", stage),
        }
    }
}
