//! Configuration management for Client Fetcher
//!
//! This module provides unified configuration management with automatic
//! first-run initialization, multi-source loading, and zero-config defaults.
//! Precedence is defaults, then the config file, then CLI flags (applied by
//! the command handlers).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::app::{ClientConfig, CoordinatorConfig, GraphicsQuality, WorkerConfig};
use crate::constants::{http, layout, limits, logging, progress, sources, workers};
use crate::errors::{ConfigError, ConfigResult};

/// Project-local config file name
pub const LOCAL_CONFIG_FILE: &str = "client-fetcher.toml";

/// Directory below the user config dir
const CONFIG_DIR_NAME: &str = "client-fetcher";

/// Unified application configuration for TOML serialization
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Parallelism and asset filtering
    pub download: DownloadSection,
    /// Local directories
    pub paths: PathsSection,
    /// Remote endpoints
    pub sources: SourcesSection,
    /// HTTP client settings
    pub client: ClientSection,
    /// Progress display
    pub progress: ProgressSection,
    /// Logging configuration
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DownloadSection {
    /// Concurrent fetches, 3 to 20
    pub max_parallelism: usize,
    pub graphics_quality: GraphicsQuality,
}

impl Default for DownloadSection {
    fn default() -> Self {
        Self {
            max_parallelism: workers::DEFAULT_PARALLELISM,
            graphics_quality: GraphicsQuality::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PathsSection {
    /// Directory that will contain the game directory
    pub base_dir: PathBuf,
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from(layout::DEFAULT_BASE_DIR),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SourcesSection {
    pub manifest_url: String,
    /// Manifest cache key
    pub version_id: String,
    pub resources_base_url: String,
}

impl Default for SourcesSection {
    fn default() -> Self {
        Self {
            manifest_url: sources::DEFAULT_MANIFEST_URL.to_string(),
            version_id: sources::DEFAULT_VERSION_ID.to_string(),
            resources_base_url: sources::RESOURCES_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClientSection {
    /// Whole-request timeout, e.g. "5m"
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
    pub max_retries: u32,
    pub pool_max_per_host: usize,
}

impl Default for ClientSection {
    fn default() -> Self {
        Self {
            request_timeout: http::DEFAULT_TIMEOUT,
            connect_timeout: http::CONNECT_TIMEOUT,
            max_retries: limits::MAX_RETRIES,
            pool_max_per_host: http::POOL_MAX_PER_HOST,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProgressSection {
    pub enabled: bool,
    pub poll_interval_ms: u64,
}

impl Default for ProgressSection {
    fn default() -> Self {
        Self {
            enabled: true,
            poll_interval_ms: progress::POLL_INTERVAL.as_millis() as u64,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default log level for the application
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: logging::DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

fn invalid(field: &str, value: impl ToString, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

impl AppConfig {
    /// Load configuration from the first file found
    ///
    /// An explicit `config_file_override` must exist; the standard locations
    /// are optional and fall back to defaults.
    pub async fn load(config_file_override: Option<PathBuf>) -> ConfigResult<Self> {
        let config_path = match config_file_override {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound { path });
                }
                Some(path)
            }
            None => Self::find_config_file(),
        };

        let config = match config_path {
            Some(path) => Self::load_from_file(&path).await?,
            None => {
                debug!("No config file found, using defaults");
                Self::default()
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Check ranges that serde cannot express
    pub fn validate(&self) -> ConfigResult<()> {
        let parallelism = self.download.max_parallelism;
        if !(workers::MIN_PARALLELISM..=workers::MAX_PARALLELISM).contains(&parallelism) {
            return Err(invalid(
                "download.max_parallelism",
                parallelism,
                &format!(
                    "Must be between {} and {}",
                    workers::MIN_PARALLELISM,
                    workers::MAX_PARALLELISM
                ),
            ));
        }

        if self.progress.poll_interval_ms == 0 {
            return Err(invalid("progress.poll_interval_ms", 0, "Must be positive"));
        }

        if self.client.request_timeout.is_zero() {
            return Err(invalid(
                "client.request_timeout",
                format!("{:?}", self.client.request_timeout),
                "Must be positive",
            ));
        }

        if self.client.connect_timeout.is_zero() {
            return Err(invalid(
                "client.connect_timeout",
                format!("{:?}", self.client.connect_timeout),
                "Must be positive",
            ));
        }

        if self.sources.version_id.trim().is_empty() {
            return Err(invalid("sources.version_id", "", "Cannot be empty"));
        }

        for (field, value) in [
            ("sources.manifest_url", &self.sources.manifest_url),
            ("sources.resources_base_url", &self.sources.resources_base_url),
        ] {
            if let Err(e) = url::Url::parse(value) {
                return Err(invalid(field, value, &e.to_string()));
            }
        }

        Ok(())
    }

    /// Build the orchestrator configuration
    pub fn to_coordinator_config(&self) -> CoordinatorConfig {
        let client_config = ClientConfig {
            request_timeout: self.client.request_timeout,
            connect_timeout: self.client.connect_timeout,
            max_retries: self.client.max_retries,
            pool_max_per_host: self.client.pool_max_per_host,
            ..ClientConfig::default()
        };

        CoordinatorConfig {
            base_dir: self.paths.base_dir.clone(),
            manifest_url: self.sources.manifest_url.clone(),
            version_id: self.sources.version_id.clone(),
            resources_base_url: self.sources.resources_base_url.clone(),
            graphics_quality: self.download.graphics_quality,
            worker_config: WorkerConfig::default().with_worker_count(self.download.max_parallelism),
            client_config,
            show_progress: self.progress.enabled,
            progress_interval: Duration::from_millis(self.progress.poll_interval_ms),
            ..CoordinatorConfig::default()
        }
    }

    /// Render as TOML
    pub fn to_toml(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Initialize configuration on first run
    ///
    /// Creates a default config file if none exists and returns its path
    pub async fn initialize_first_run() -> ConfigResult<PathBuf> {
        let config_path = Self::default_config_path()?;
        Self::write_default_file(&config_path).await?;
        Ok(config_path)
    }

    /// Write the commented default file unless `path` already exists
    ///
    /// Returns whether a file was written.
    pub async fn write_default_file(path: &Path) -> ConfigResult<bool> {
        if path.exists() {
            debug!("Config file already exists: {}", path.display());
            return Ok(false);
        }

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(path, Self::generate_default_config_content()).await?;
        info!("Created default configuration file: {}", path.display());
        Ok(true)
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let mut search_paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
        if let Ok(user_path) = Self::default_config_path() {
            search_paths.push(user_path);
        }

        search_paths.into_iter().find(|path| {
            let found = path.exists();
            if found {
                debug!("Found config file: {}", path.display());
            }
            found
        })
    }

    /// Get the default config file path for the current user
    pub fn default_config_path() -> ConfigResult<PathBuf> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join(CONFIG_DIR_NAME).join("config.toml"))
    }

    /// Load configuration from a TOML file
    async fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: AppConfig = toml::from_str(&content)?;
        info!("Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Generate default configuration content with helpful comments
    fn generate_default_config_content() -> String {
        format!(
            r#"# Client Fetcher Configuration
# This file was automatically generated on first run.
# You can customize any of these settings to suit your needs.

[download]
# Concurrent fetches ({min} to {max})
max_parallelism = {parallelism}
# Asset filter: "low", "medium" or "high"
graphics_quality = "high"

[paths]
# The game directory is created below this directory
base_dir = "{base_dir}"

[sources]
manifest_url = "{manifest_url}"
version_id = "{version_id}"
resources_base_url = "{resources}"

[client]
request_timeout = "5m"
connect_timeout = "30s"
max_retries = {retries}
pool_max_per_host = {pool}

[progress]
enabled = true
poll_interval_ms = {poll}

[logging]
level = "info"  # error, warn, info, debug, trace
"#,
            min = workers::MIN_PARALLELISM,
            max = workers::MAX_PARALLELISM,
            parallelism = workers::DEFAULT_PARALLELISM,
            base_dir = layout::DEFAULT_BASE_DIR,
            manifest_url = sources::DEFAULT_MANIFEST_URL,
            version_id = sources::DEFAULT_VERSION_ID,
            resources = sources::RESOURCES_BASE_URL,
            retries = limits::MAX_RETRIES,
            pool = http::POOL_MAX_PER_HOST,
            poll = progress::POLL_INTERVAL.as_millis(),
        )
    }
}
