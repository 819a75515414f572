//! Artifact download with progress tracking
//!
//! The response body is streamed into a fresh temporary file. A progress
//! event is emitted after every chunk. The temporary file is removed on any
//! failure and, once returned, when the [`DownloadedFile`] is dropped.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use futures_util::StreamExt;
use tempfile::{NamedTempFile, TempPath};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::{user_agent, DEFAULT_DOWNLOAD_TIMEOUT};
use crate::error::{Result, UpdateError};
use crate::progress::{ProgressObserver, UpdateProgress};

/// Prefix of downloaded temp files
const TEMP_PREFIX: &str = "core-update-";

/// A downloaded artifact in a temporary file
///
/// The file is deleted when this value is dropped.
#[derive(Debug)]
pub struct DownloadedFile {
    /// Temporary path owning the file
    path: TempPath,

    /// Number of bytes written
    size: u64,
}

impl DownloadedFile {
    /// Path of the downloaded file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size of the downloaded file in bytes
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Keep the file on disk and return its path
    pub fn keep(self) -> Result<PathBuf> {
        self.path
            .keep()
            .map_err(|e| UpdateError::io("failed to keep downloaded file", e.error))
    }
}

/// Streams remote artifacts to local temporary files
pub struct Downloader {
    /// HTTP client
    client: reqwest::Client,

    /// Directory for temporary files, OS temp dir when unset
    temp_dir: Option<PathBuf>,
}

impl Downloader {
    /// Create a downloader with the default timeout
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_DOWNLOAD_TIMEOUT)
    }

    /// Create a downloader with an explicit per-request timeout
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent(env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| UpdateError::network("failed to create HTTP client", e))?;
        Ok(Self::from_client(client))
    }

    /// Reuse an existing HTTP client
    pub fn from_client(client: reqwest::Client) -> Self {
        Self {
            client,
            temp_dir: None,
        }
    }

    /// Place temporary files in `dir`
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    /// Download `url` into a temporary file
    ///
    /// Emits a `downloading` event after every chunk. When the server does
    /// not send a `Content-Length`, events carry `bytes_total = 0` and
    /// `percent = 0`.
    pub async fn download(
        &self,
        url: &str,
        observer: &dyn ProgressObserver,
        cancel: &CancellationToken,
    ) -> Result<DownloadedFile> {
        let mut file = self.create_temp_file()?;
        debug!("Downloading {} to {}", url, file.path().display());

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(UpdateError::Cancelled),
            response = self.client.get(url).send() => {
                response.map_err(|e| UpdateError::network("download request failed", e))?
            }
        };

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(UpdateError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let total = response.content_length().unwrap_or(0);
        let mut downloaded: u64 = 0;
        let mut stream = response.bytes_stream();

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("Download cancelled after {} bytes", downloaded);
                    return Err(UpdateError::Cancelled);
                }
                next = stream.next() => next,
            };

            let Some(chunk) = next else {
                break;
            };
            let chunk: bytes::Bytes =
                chunk.map_err(|e| UpdateError::network("download stream error", e))?;

            file.write_all(&chunk)
                .map_err(|e| UpdateError::io("failed to write download data", e))?;

            downloaded += chunk.len() as u64;
            observer.on_progress(&UpdateProgress::downloading(downloaded, total));
        }

        file.flush()
            .map_err(|e| UpdateError::io("failed to flush download file", e))?;
        file.as_file()
            .sync_all()
            .map_err(|e| UpdateError::io("failed to sync download file", e))?;

        make_executable(file.path())?;

        info!("Download complete: {} bytes", downloaded);
        Ok(DownloadedFile {
            path: file.into_temp_path(),
            size: downloaded,
        })
    }

    fn create_temp_file(&self) -> Result<NamedTempFile> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(TEMP_PREFIX);

        let file = match &self.temp_dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        };
        file.map_err(|e| UpdateError::io("failed to create temporary file", e))
    }
}

/// Set the owner-execute bit (mode 0755)
#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .map_err(|e| UpdateError::io("failed to make file executable", e))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}
