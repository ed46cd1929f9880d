//! Error types for Client Fetcher
//!
//! This module defines error types for all components of the application.
//! Errors are designed to be actionable and provide clear context for debugging and
//! user feedback.

use std::path::PathBuf;
use thiserror::Error;

/// Download and HTTP client errors
#[derive(Error, Debug)]
pub enum DownloadError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O error during file operations
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Download timeout
    #[error("Download timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    /// Invalid URL provided
    #[error("Invalid URL: {url} - {error}")]
    InvalidUrl { url: String, error: String },

    /// Server returned error status
    #[error("Server error: HTTP {status}")]
    ServerError { status: u16 },

    /// Resource does not exist on the server
    #[error("Not found (HTTP 404): {url}")]
    NotFound { url: String },

    /// Access to the resource was refused
    #[error("Forbidden (HTTP 403): {url}")]
    Forbidden { url: String },

    /// Rate limit exceeded
    #[error("Rate limit exceeded. Server responded with HTTP 429")]
    RateLimitExceeded,

    /// Server overloaded
    #[error("Server overloaded. Server responded with HTTP 503")]
    ServerOverloaded,

    /// Downloaded content does not match the expected digest
    #[error("File hash mismatch. Expected: {expected}, got: {actual}")]
    HashMismatch { expected: String, actual: String },

    /// Atomic file operation failed
    #[error("Atomic file operation failed: could not rename {temp_path} to {final_path}")]
    AtomicOperationFailed {
        temp_path: PathBuf,
        final_path: PathBuf,
    },

    /// Maximum retries exceeded
    #[error("Maximum retry attempts ({max_retries}) exceeded: {last_error}")]
    MaxRetriesExceeded { max_retries: u32, last_error: String },

    /// Native archive could not be unpacked after a successful fetch
    #[error("Native extraction failed for {path}")]
    ExtractionFailed { path: PathBuf },

    /// Invalid worker or client configuration
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

/// Manifest and asset index errors
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Manifest file not found
    #[error("Manifest file not found: {path}")]
    NotFound { path: PathBuf },

    /// Manifest or asset index could not be fetched
    #[error("Failed to fetch {what} from {url}: {source}")]
    Fetch {
        what: &'static str,
        url: String,
        #[source]
        source: DownloadError,
    },

    /// JSON parsing error (includes missing required keys)
    #[error("Malformed {what} at {path}: {source}")]
    Parse {
        what: &'static str,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// I/O error reading manifest
    #[error("I/O error reading manifest: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid hash format
    #[error("Invalid hash format: {hash}. Expected 40-character SHA-1 hex string")]
    InvalidHash { hash: String },
}

/// Native archive extraction errors
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// Archive is not a readable zip file
    #[error("Corrupt or unreadable archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// I/O or permission error while writing entries
    #[error("I/O error during extraction: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// Invalid configuration format
    #[error("Invalid configuration format: {0}")]
    InvalidFormat(#[from] toml::de::Error),

    /// Configuration could not be serialized
    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Invalid configuration value
    #[error("Invalid configuration value for {field}: {value}. {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    /// No platform directory could be determined
    #[error("Could not determine user config directory")]
    NoConfigDir,

    /// I/O error reading or writing configuration
    #[error("Configuration I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Orchestration errors surfaced by a download run
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Another run is already in progress
    #[error("A download run is already in progress")]
    Busy,

    /// The running platform has no entry in the platform table
    #[error("Unsupported platform: {os}")]
    UnsupportedPlatform { os: String },

    /// Manifest or asset index failure (fatal for the run)
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Invalid configuration handed to the orchestrator
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// Directory preparation or cleanup failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Top-level application error that can represent any error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Download error
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// Manifest error
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Extraction error
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Pipeline error
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// Generic I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Generic application error with context
    #[error("Application error: {message}")]
    Generic { message: String },
}

impl AppError {
    /// Create a generic application error with a message
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// Check if the error is recoverable (transient)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AppError::Download(DownloadError::Timeout { .. })
                | AppError::Download(DownloadError::RateLimitExceeded)
                | AppError::Download(DownloadError::ServerOverloaded)
                | AppError::Download(DownloadError::Http(_))
                | AppError::Pipeline(PipelineError::Busy)
        )
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Download(_) => "download",
            AppError::Manifest(_) => "manifest",
            AppError::Extraction(_) => "extraction",
            AppError::Config(_) => "config",
            AppError::Pipeline(_) => "pipeline",
            AppError::Io(_) => "io",
            AppError::Generic { .. } => "generic",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

/// Download result type alias
pub type DownloadResult<T> = std::result::Result<T, DownloadError>;

/// Manifest result type alias
pub type ManifestResult<T> = std::result::Result<T, ManifestError>;

/// Extraction result type alias
pub type ExtractionResult<T> = std::result::Result<T, ExtractionError>;

/// Configuration result type alias
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Pipeline result type alias
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
