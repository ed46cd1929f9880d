//! HTTP client for manifests, libraries and asset objects
//!
//! The module is organized into specialized components:
//! - `config`: HTTP client configuration and building
//! - `http`: Core HTTP operations with retry handling
//! - `download`: Streaming downloads with incremental hashing and atomic writes

use std::path::Path;

use url::Url;

use crate::app::hash::Sha1Hash;
use crate::errors::{DownloadError, DownloadResult};

pub mod config;
pub mod download;
pub mod http;

pub use config::ClientConfig;
pub use download::{temp_path_for, DownloadedFile};

use download::DownloadHandler;
use http::HttpHandler;

/// Shared HTTP client used by the manifest store and every fetch worker
#[derive(Debug, Clone)]
pub struct FetchClient {
    http_handler: HttpHandler,
}

impl FetchClient {
    /// Creates a client with default configuration
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if HTTP client creation fails
    pub fn new() -> DownloadResult<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Creates a client with custom configuration
    pub fn with_config(config: ClientConfig) -> DownloadResult<Self> {
        Ok(Self {
            http_handler: HttpHandler::new(&config)?,
        })
    }

    /// Stream `url` into `destination`, verifying against `expected` if given
    pub async fn download_to_file(
        &self,
        url: &str,
        destination: &Path,
        expected: Option<&Sha1Hash>,
    ) -> DownloadResult<DownloadedFile> {
        DownloadHandler::new(&self.http_handler)
            .download_to_file(url, destination, expected)
            .await
    }

    /// Fetch a small document into memory
    pub async fn fetch_bytes(&self, url: &str) -> DownloadResult<Vec<u8>> {
        let parsed = Url::parse(url).map_err(|e| DownloadError::InvalidUrl {
            url: url.to_string(),
            error: e.to_string(),
        })?;
        self.http_handler.get_bytes(&parsed).await
    }
}
