//! Helpers for driving the updater in tests

use core_update::{ProgressObserver, UpdateProgress};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use super::constants::ORIGINAL_CONTENT;

/// Observer that records every event it receives
#[derive(Debug, Clone, Default)]
pub struct ProgressRecorder {
    events: Arc<Mutex<Vec<UpdateProgress>>>,
}

impl ProgressRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded events
    pub fn events(&self) -> Vec<UpdateProgress> {
        self.events.lock().unwrap().clone()
    }
}

impl ProgressObserver for ProgressRecorder {
    fn on_progress(&self, progress: &UpdateProgress) {
        self.events.lock().unwrap().push(progress.clone());
    }
}

/// Create an installed "core" binary holding the original content
pub fn create_fake_binary(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("core");
    fs::write(&path, ORIGINAL_CONTENT).unwrap();

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    path
}

/// Lowercase hex SHA-256 of `content`
pub fn sha256_hex(content: &[u8]) -> String {
    hex::encode(Sha256::digest(content))
}

/// Number of entries in a directory
pub fn entry_count(dir: &Path) -> usize {
    fs::read_dir(dir).unwrap().count()
}

/// Route engine logs to the test harness output
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("core_update=debug")
        .with_test_writer()
        .try_init();
}
