//! File download operations with atomic writes and streaming
//!
//! Bodies are streamed into `<destination>.part` while an incremental SHA-1
//! runs over the same bytes. Only content that matches the expected digest is
//! renamed into place; a mismatched temp file is deleted and an existing
//! destination is never overwritten with it.

use std::path::{Path, PathBuf};

use futures::StreamExt;
use sha1::{Digest, Sha1};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use url::Url;

use super::http::HttpHandler;
use crate::app::hash::Sha1Hash;
use crate::constants::files;
use crate::errors::{DownloadError, DownloadResult};

/// A file written to its destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadedFile {
    /// Bytes written
    pub bytes: u64,
    /// Digest of the written content
    pub digest: Sha1Hash,
}

/// Temp path used while a download is in flight
pub fn temp_path_for(destination: &Path) -> PathBuf {
    let mut name = destination
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(files::TEMP_FILE_SUFFIX);
    destination.with_file_name(name)
}

/// File download operations handler
pub struct DownloadHandler<'a> {
    http_handler: &'a HttpHandler,
}

impl<'a> DownloadHandler<'a> {
    /// Creates a new DownloadHandler with the given HTTP handler
    pub fn new(http_handler: &'a HttpHandler) -> Self {
        Self { http_handler }
    }

    /// Downloads a file to `destination`, verifying it when a digest is known
    ///
    /// Parent directories are created as needed.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if:
    /// - The URL is invalid or the request fails after retries
    /// - The server answers with a non-success status
    /// - The content does not match `expected` (`HashMismatch`)
    /// - Writing or renaming the file fails
    pub async fn download_to_file(
        &self,
        url: &str,
        destination: &Path,
        expected: Option<&Sha1Hash>,
    ) -> DownloadResult<DownloadedFile> {
        let parsed_url = Url::parse(url).map_err(|e| DownloadError::InvalidUrl {
            url: url.to_string(),
            error: e.to_string(),
        })?;

        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let temp_path = temp_path_for(destination);
        let written = match self.stream_to_temp(&parsed_url, &temp_path).await {
            Ok(written) => written,
            Err(e) => {
                remove_quietly(&temp_path).await;
                return Err(e);
            }
        };

        if let Some(expected) = expected {
            if written.digest != *expected {
                remove_quietly(&temp_path).await;
                warn!(
                    "Digest mismatch for {}: expected {}, got {}",
                    destination.display(),
                    expected,
                    written.digest
                );
                return Err(DownloadError::HashMismatch {
                    expected: expected.to_hex(),
                    actual: written.digest.to_hex(),
                });
            }
        }

        // Atomic move from temp file to final destination
        if let Err(e) = tokio::fs::rename(&temp_path, destination).await {
            debug!("Rename of {} failed: {}", temp_path.display(), e);
            remove_quietly(&temp_path).await;
            return Err(DownloadError::AtomicOperationFailed {
                temp_path,
                final_path: destination.to_path_buf(),
            });
        }

        debug!(
            "Downloaded {} ({} bytes)",
            destination.display(),
            written.bytes
        );
        Ok(written)
    }

    /// Streams the body into the temp file, hashing as it goes
    async fn stream_to_temp(&self, url: &Url, temp_path: &Path) -> DownloadResult<DownloadedFile> {
        let response = self.http_handler.get_response(url).await?;
        let response = HttpHandler::check_status(response, url)?;

        let mut file = File::create(temp_path).await?;
        let mut hasher = Sha1::new();
        let mut bytes: u64 = 0;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| self.http_handler.stream_error(e))?;
            hasher.update(&chunk);
            file.write_all(&chunk).await?;
            bytes += chunk.len() as u64;
        }

        file.flush().await?;
        file.sync_all().await?;

        Ok(DownloadedFile {
            bytes,
            digest: Sha1Hash::from_hasher(hasher),
        })
    }
}

async fn remove_quietly(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!("Failed to remove temp file {}: {}", path.display(), e);
        }
    }
}
