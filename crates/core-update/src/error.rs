//! Error types for core-update

use thiserror::Error;

/// Result type alias using core-update's error type
pub type Result<T> = std::result::Result<T, UpdateError>;

/// Errors raised by the update engine
///
/// Every operation returns one of these instead of recovering internally.
/// Nothing in the engine retries.
#[derive(Error, Debug)]
pub enum UpdateError {
    /// Required configuration missing, detected before any I/O
    #[error("Invalid update configuration: {message}")]
    Config { message: String },

    /// Transport-level failure (DNS, connect, timeout, broken stream)
    #[error("Network error: {context}: {source}")]
    Network {
        context: String,
        #[source]
        source: reqwest::Error,
    },

    /// Non-200 response from a remote endpoint
    #[error("{url} returned HTTP {status}: {body}")]
    HttpStatus {
        url: String,
        status: u16,
        body: String,
    },

    /// Malformed release metadata
    #[error("Failed to parse release metadata: {message}")]
    Parse { message: String },

    /// Downloaded file does not match the manifest digest
    #[error("Checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    /// Manifest missing or incomplete while strict checksums are enforced
    #[error("Checksum unavailable: {reason}")]
    ChecksumUnavailable { reason: String },

    /// Atomic swap of the target binary failed
    #[error("Failed to replace {path}: {source}")]
    Replace {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Local file I/O failure outside the replace step
    #[error("IO error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// The caller cancelled the operation
    #[error("Update cancelled")]
    Cancelled,
}

impl UpdateError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a network error
    pub fn network(context: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            context: context.into(),
            source,
        }
    }

    /// Create a parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a replace error for the given target
    pub fn replace(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Replace {
            path: path.display().to_string(),
            source,
        }
    }

    /// Whether this is the hard integrity failure
    pub fn is_checksum_mismatch(&self) -> bool {
        matches!(self, Self::ChecksumMismatch { .. })
    }

    /// HTTP status code carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}
