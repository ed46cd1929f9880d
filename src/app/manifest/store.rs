//! Manifest and asset index loading with an on-disk cache
//!
//! The manifest is cached at `manifest/{version}.json` and re-read on later
//! runs; the asset index lives at `assets/indexes/{id}.json` and is fetched
//! again whenever it is missing or fails its declared digest.

use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::app::client::FetchClient;
use crate::app::hash::Sha1Hash;
use crate::app::layout::GameLayout;
use crate::app::models::{AssetIndex, AssetIndexRef, Manifest};
use crate::app::verification::IntegrityVerifier;
use crate::errors::{ManifestError, ManifestResult};

/// Loads the two descriptors that gate every run
#[derive(Debug, Clone)]
pub struct ManifestStore {
    client: FetchClient,
    layout: GameLayout,
    manifest_url: String,
    version_id: String,
}

impl ManifestStore {
    pub fn new(
        client: FetchClient,
        layout: GameLayout,
        manifest_url: impl Into<String>,
        version_id: impl Into<String>,
    ) -> Self {
        Self {
            client,
            layout,
            manifest_url: manifest_url.into(),
            version_id: version_id.into(),
        }
    }

    pub fn version_id(&self) -> &str {
        &self.version_id
    }

    /// Load the version manifest, fetching it when not cached
    ///
    /// # Errors
    ///
    /// `ManifestError::Fetch` when unreachable, `ManifestError::Parse` when
    /// required keys are missing or the JSON is malformed
    pub async fn load_manifest(&self) -> ManifestResult<Manifest> {
        let path = self.layout.manifest_path(&self.version_id);

        if path.exists() {
            debug!("Using cached manifest {}", path.display());
        } else {
            info!("Downloading manifest for version {}", self.version_id);
            self.fetch("manifest", &self.manifest_url, &path, None).await?;
        }

        read_json("manifest", &path).await
    }

    /// Load the asset index referenced by the manifest
    pub async fn load_asset_index(&self, reference: &AssetIndexRef) -> ManifestResult<AssetIndex> {
        let path = self.layout.asset_index_path(&reference.id);

        if IntegrityVerifier::is_present_and_valid(&path, reference.sha1.as_ref()).await {
            debug!("Using cached asset index {}", path.display());
        } else {
            info!("Downloading asset index {}", reference.id);
            self.fetch("asset index", &reference.url, &path, reference.sha1.as_ref())
                .await?;
        }

        read_json("asset index", &path).await
    }

    async fn fetch(
        &self,
        what: &'static str,
        url: &str,
        path: &Path,
        expected: Option<&Sha1Hash>,
    ) -> ManifestResult<()> {
        self.client
            .download_to_file(url, path, expected)
            .await
            .map(|_| ())
            .map_err(|source| ManifestError::Fetch {
                what,
                url: url.to_string(),
                source,
            })
    }
}

async fn read_json<T: DeserializeOwned>(what: &'static str, path: &Path) -> ManifestResult<T> {
    let content = tokio::fs::read(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ManifestError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            ManifestError::Io(e)
        }
    })?;

    serde_json::from_slice(&content).map_err(|source| ManifestError::Parse {
        what,
        path: path.to_path_buf(),
        source,
    })
}
