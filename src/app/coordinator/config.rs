//! Configuration structures for the download coordinator

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::app::client::ClientConfig;
use crate::app::models::GraphicsQuality;
use crate::app::worker::WorkerConfig;
use crate::constants::{layout, progress, sources};

/// Everything one orchestrated run needs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Directory containing the game directory
    pub base_dir: PathBuf,
    /// Remote version manifest
    pub manifest_url: String,
    /// Version id, used as the manifest cache key
    pub version_id: String,
    /// Base URL of the asset object store
    pub resources_base_url: String,
    /// Asset filter level
    pub graphics_quality: GraphicsQuality,
    /// Worker pool configuration
    pub worker_config: WorkerConfig,
    /// HTTP client configuration
    pub client_config: ClientConfig,
    /// Run the progress observer
    pub show_progress: bool,
    /// Observer polling cadence
    pub progress_interval: Duration,
    /// Bounded wait when joining the observer
    pub observer_join_timeout: Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from(layout::DEFAULT_BASE_DIR),
            manifest_url: sources::DEFAULT_MANIFEST_URL.to_string(),
            version_id: sources::DEFAULT_VERSION_ID.to_string(),
            resources_base_url: sources::RESOURCES_BASE_URL.to_string(),
            graphics_quality: GraphicsQuality::default(),
            worker_config: WorkerConfig::default(),
            client_config: ClientConfig::default(),
            show_progress: true,
            progress_interval: progress::POLL_INTERVAL,
            observer_join_timeout: progress::OBSERVER_JOIN_TIMEOUT,
        }
    }
}

impl CoordinatorConfig {
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = dir.into();
        self
    }

    /// Point the run at a manifest URL with its version id
    pub fn with_manifest(mut self, url: impl Into<String>, version_id: impl Into<String>) -> Self {
        self.manifest_url = url.into();
        self.version_id = version_id.into();
        self
    }

    pub fn with_resources_base_url(mut self, url: impl Into<String>) -> Self {
        self.resources_base_url = url.into();
        self
    }

    pub fn with_graphics_quality(mut self, quality: GraphicsQuality) -> Self {
        self.graphics_quality = quality;
        self
    }

    /// Set the parallelism bound
    pub fn with_worker_count(mut self, count: usize) -> Self {
        self.worker_config.worker_count = count;
        self
    }

    pub fn with_client_config(mut self, config: ClientConfig) -> Self {
        self.client_config = config;
        self
    }

    pub fn with_progress(mut self, enabled: bool) -> Self {
        self.show_progress = enabled;
        self
    }

    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        self.worker_config.validate().map_err(|e| e.to_string())?;

        if self.progress_interval.is_zero() {
            return Err("Progress interval cannot be zero".to_string());
        }

        if self.version_id.trim().is_empty() {
            return Err("Version id cannot be empty".to_string());
        }

        if url::Url::parse(&self.resources_base_url).is_err() {
            return Err(format!(
                "Invalid resources base URL: {}",
                self.resources_base_url
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = CoordinatorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.worker_config.worker_count, 10);
        assert_eq!(config.progress_interval, Duration::from_millis(100));
        assert_eq!(config.graphics_quality, GraphicsQuality::High);
    }

    #[test]
    fn test_builder_and_validation() {
        let config = CoordinatorConfig::default()
            .with_worker_count(5)
            .with_graphics_quality(GraphicsQuality::Low)
            .with_base_dir("/tmp/game");
        assert!(config.validate().is_ok());
        assert_eq!(config.base_dir, PathBuf::from("/tmp/game"));

        assert!(CoordinatorConfig::default()
            .with_worker_count(0)
            .validate()
            .is_err());
        assert!(CoordinatorConfig::default()
            .with_progress_interval(Duration::ZERO)
            .validate()
            .is_err());
        assert!(CoordinatorConfig::default()
            .with_resources_base_url("not a url")
            .validate()
            .is_err());
    }
}
