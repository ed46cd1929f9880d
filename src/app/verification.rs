//! File integrity verification
//!
//! Streams files through SHA-1 in fixed-size chunks so large archives are
//! never held in memory. Used both as the pre-check that skips redundant
//! downloads and by `verify` reporting.

use std::path::Path;

use sha1::{Digest, Sha1};
use tokio::fs::File;
use tokio::io::AsyncReadExt;
use tracing::{debug, warn};

use crate::app::hash::Sha1Hash;
use crate::constants::files;

/// Hash verification functionality
pub struct IntegrityVerifier;

impl IntegrityVerifier {
    /// Calculate the SHA-1 digest of a file by streaming it
    pub async fn calculate_file_hash(path: &Path) -> std::io::Result<Sha1Hash> {
        let mut file = File::open(path).await?;
        let mut hasher = Sha1::new();
        let mut buffer = vec![0u8; files::HASH_CHUNK_SIZE];

        loop {
            let read = file.read(&mut buffer).await?;
            if read == 0 {
                break;
            }
            hasher.update(&buffer[..read]);
        }

        Ok(Sha1Hash::from_hasher(hasher))
    }

    /// Verify that a file matches its expected digest
    ///
    /// Read errors are logged and reported as a failed verification.
    pub async fn verify(path: &Path, expected: &Sha1Hash) -> bool {
        match Self::calculate_file_hash(path).await {
            Ok(actual) if actual == *expected => true,
            Ok(actual) => {
                debug!(
                    "Digest mismatch for {}: expected {}, got {}",
                    path.display(),
                    expected,
                    actual
                );
                false
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
            Err(e) => {
                warn!("Failed to read {} for verification: {}", path.display(), e);
                false
            }
        }
    }

    /// Whether a destination can be reused without fetching
    ///
    /// With a known digest the file must verify; without one, existence is enough.
    pub async fn is_present_and_valid(path: &Path, expected: Option<&Sha1Hash>) -> bool {
        match expected {
            Some(hash) => Self::verify(path, hash).await,
            None => tokio::fs::metadata(path)
                .await
                .map(|m| m.is_file())
                .unwrap_or(false),
        }
    }
}
