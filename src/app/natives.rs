//! Native library extraction
//!
//! Native archives are zip files. Everything outside the `META-INF/` group is
//! unpacked into the natives directory with its relative structure. All
//! extractions in a run share one lock so two archives never write into the
//! directory at the same time.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::{debug, error, warn};

use crate::constants::files;
use crate::errors::ExtractionResult;

/// Unpacks native archives into a single directory
#[derive(Debug)]
pub struct NativeExtractor {
    natives_dir: PathBuf,
    lock: Mutex<()>,
}

impl NativeExtractor {
    pub fn new(natives_dir: impl Into<PathBuf>) -> Self {
        Self {
            natives_dir: natives_dir.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn natives_dir(&self) -> &Path {
        &self.natives_dir
    }

    /// Extract an archive, returning whether it succeeded
    ///
    /// Corrupt archives and I/O failures are logged, never propagated.
    pub fn extract(&self, archive: &Path) -> bool {
        // A panic in another extraction must not wedge the rest of the run
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        match self.extract_locked(archive) {
            Ok(count) => {
                debug!(
                    "Extracted {} entries from {} into {}",
                    count,
                    archive.display(),
                    self.natives_dir.display()
                );
                true
            }
            Err(e) => {
                error!("Failed to extract {}: {}", archive.display(), e);
                false
            }
        }
    }

    /// Run [`extract`](Self::extract) on the blocking pool
    pub async fn extract_blocking(self: &Arc<Self>, archive: PathBuf) -> bool {
        let extractor = Arc::clone(self);
        match tokio::task::spawn_blocking(move || extractor.extract(&archive)).await {
            Ok(extracted) => extracted,
            Err(e) => {
                error!("Extraction task failed to complete: {}", e);
                false
            }
        }
    }

    fn extract_locked(&self, archive: &Path) -> ExtractionResult<usize> {
        let file = File::open(archive)?;
        let mut zip = zip::ZipArchive::new(file)?;
        fs::create_dir_all(&self.natives_dir)?;

        let mut extracted = 0;
        for index in 0..zip.len() {
            let mut entry = zip.by_index(index)?;

            if entry.name().starts_with(files::ARCHIVE_METADATA_PREFIX) {
                continue;
            }

            let Some(relative) = entry.enclosed_name().map(|p| p.to_path_buf()) else {
                warn!(
                    "Skipping unsafe entry {} in {}",
                    entry.name(),
                    archive.display()
                );
                continue;
            };
            let target = self.natives_dir.join(relative);

            if entry.is_dir() {
                fs::create_dir_all(&target)?;
                continue;
            }

            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut output = File::create(&target)?;
            io::copy(&mut entry, &mut output)?;
            extracted += 1;
        }

        Ok(extracted)
    }
}
