//! Download orchestration
//!
//! The coordinator sequences one run: manifest fetch, asset index fetch, task
//! collection, the parallel fetch phase (with native extraction inside the
//! workers) and finalization. It owns the run state machine and the shared
//! [`RunState`] that workers update and the progress observer reads.
//!
//! ```text
//! Idle -> FetchingManifest -> FetchingAssetIndex -> CollectingTasks
//!      -> FetchingParallel -> Finalizing -> Completed | Failed
//! ```
//!
//! A second run requested while one is in flight is rejected with
//! [`PipelineError::Busy`]; terminal states accept a new run.
//!
//! - [`config`] - Configuration structures and validation
//! - [`state`] - Shared counters, failure records and the completion flag
//! - [`progress`] - Progress observer and renderer trait
//! - [`stats`] - Session results
//!
//! # Examples
//!
//! ```rust,no_run
//! use client_fetcher::app::{Coordinator, CoordinatorConfig, GraphicsQuality};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CoordinatorConfig::default()
//!     .with_worker_count(8)
//!     .with_graphics_quality(GraphicsQuality::Medium);
//!
//! let coordinator = Coordinator::new(config)?;
//! let result = coordinator.run_download().await?;
//! println!("{}", result.summary_line());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod progress;
pub mod state;
pub mod stats;

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::app::client::FetchClient;
use crate::app::layout::GameLayout;
use crate::app::manifest::{CollectionReport, ManifestStore, TaskCollector};
use crate::app::natives::NativeExtractor;
use crate::app::platform::HostPlatform;
use crate::app::queue::WorkQueue;
use crate::app::worker::WorkerPool;
use crate::errors::{DownloadError, PipelineError, PipelineResult};

pub use config::CoordinatorConfig;
pub use progress::{NullRenderer, ProgressObserver, ProgressRenderer};
pub use state::{FailedTask, ProgressSnapshot, RunState};
pub use stats::{format_duration, RunStatus, SessionResult};

/// Phase of the run state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineState {
    Idle,
    FetchingManifest,
    FetchingAssetIndex,
    CollectingTasks,
    FetchingParallel,
    Finalizing,
    Completed,
    Failed,
    /// Removing the game directory
    Cleaning,
}

impl PipelineState {
    /// States from which a new run may start
    pub fn accepts_new_run(&self) -> bool {
        matches!(self, Self::Idle | Self::Completed | Self::Failed)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Holds the state machine for the duration of one operation
///
/// Dropping the guard without finishing (an early return or a cancelled
/// future) moves the machine to `Failed` so the next run is accepted.
struct RunGuard<'a> {
    state: &'a Mutex<PipelineState>,
    finished: bool,
}

impl RunGuard<'_> {
    fn transition(&self, next: PipelineState) {
        let mut state = lock_state(self.state);
        tracing::debug!("Pipeline state {} -> {}", *state, next);
        *state = next;
    }

    fn finish(mut self, terminal: PipelineState) {
        self.transition(terminal);
        self.finished = true;
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            *lock_state(self.state) = PipelineState::Failed;
        }
    }
}

fn lock_state(state: &Mutex<PipelineState>) -> MutexGuard<'_, PipelineState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Main coordinator for orchestrating downloads
pub struct Coordinator {
    config: CoordinatorConfig,
    layout: GameLayout,
    host: HostPlatform,
    client: Arc<FetchClient>,
    store: ManifestStore,
    run_state: Arc<RunState>,
    pipeline_state: Mutex<PipelineState>,
    renderer: Arc<dyn ProgressRenderer>,
}

impl fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coordinator")
            .field("config", &self.config)
            .field("host", &self.host)
            .field("state", &self.state())
            .finish()
    }
}

impl Coordinator {
    /// Create a coordinator for the running platform
    ///
    /// # Errors
    ///
    /// Returns `PipelineError` for an invalid configuration or an unsupported platform
    pub fn new(config: CoordinatorConfig) -> PipelineResult<Self> {
        Self::with_host(config, HostPlatform::current()?)
    }

    /// Create a coordinator for an explicit platform
    pub fn with_host(config: CoordinatorConfig, host: HostPlatform) -> PipelineResult<Self> {
        config
            .validate()
            .map_err(|e| PipelineError::Download(DownloadError::ConfigurationError(e)))?;

        let layout = GameLayout::new(&config.base_dir);
        let client = FetchClient::with_config(config.client_config.clone())?;
        let store = ManifestStore::new(
            client.clone(),
            layout.clone(),
            config.manifest_url.clone(),
            config.version_id.clone(),
        );

        Ok(Self {
            config,
            layout,
            host,
            client: Arc::new(client),
            store,
            run_state: Arc::new(RunState::new()),
            pipeline_state: Mutex::new(PipelineState::Idle),
            renderer: Arc::new(NullRenderer),
        })
    }

    /// Use `renderer` for progress display
    pub fn with_renderer(mut self, renderer: Arc<dyn ProgressRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    pub fn layout(&self) -> &GameLayout {
        &self.layout
    }

    pub fn host(&self) -> HostPlatform {
        self.host
    }

    /// Current state machine phase
    pub fn state(&self) -> PipelineState {
        *lock_state(&self.pipeline_state)
    }

    /// Snapshot of the progress counters
    pub fn progress(&self) -> ProgressSnapshot {
        self.run_state.snapshot()
    }

    /// Whether the last successful run left a complete installation
    pub fn is_download_complete(&self) -> bool {
        self.run_state.is_download_complete()
    }

    pub fn set_download_complete(&self, complete: bool) {
        self.run_state.set_download_complete(complete);
    }

    fn begin(&self, first: PipelineState) -> PipelineResult<RunGuard<'_>> {
        let mut state = lock_state(&self.pipeline_state);
        if !state.accepts_new_run() {
            warn!("Rejected request while pipeline is {}", *state);
            return Err(PipelineError::Busy);
        }
        *state = first;
        Ok(RunGuard {
            state: &self.pipeline_state,
            finished: false,
        })
    }

    /// Fetch both descriptors and collect tasks; fatal errors end here
    async fn collect(&self, guard: &RunGuard<'_>) -> PipelineResult<CollectionReport> {
        let manifest = self.store.load_manifest().await?;
        info!(
            "Manifest {} loaded: {} libraries",
            manifest.id,
            manifest.libraries.len()
        );

        guard.transition(PipelineState::FetchingAssetIndex);
        let asset_index = self.store.load_asset_index(&manifest.asset_index).await?;
        info!(
            "Asset index {} loaded: {} objects",
            manifest.asset_index.id,
            asset_index.objects.len()
        );

        guard.transition(PipelineState::CollectingTasks);
        let collector = TaskCollector::new(
            self.layout.clone(),
            self.host,
            self.config.graphics_quality,
            self.config.resources_base_url.clone(),
        );
        Ok(collector.collect(&manifest, &asset_index).await)
    }

    /// Collect tasks without downloading anything
    ///
    /// Manifest and asset index are still fetched (and cached) if missing.
    pub async fn plan(&self) -> PipelineResult<CollectionReport> {
        let guard = self.begin(PipelineState::FetchingManifest)?;
        match self.collect(&guard).await {
            Ok(report) => {
                guard.finish(PipelineState::Completed);
                Ok(report)
            }
            Err(e) => {
                error!("Planning failed: {}", e);
                guard.finish(PipelineState::Failed);
                Err(e)
            }
        }
    }

    /// Run the complete download pipeline
    ///
    /// Per-task failures never abort the run; they are reported in the
    /// returned [`SessionResult`].
    ///
    /// # Errors
    ///
    /// - `PipelineError::Busy` if another run is in progress
    /// - `PipelineError::Manifest` if the manifest or asset index cannot be
    ///   fetched or parsed (the state machine ends in `Failed`)
    pub async fn run_download(&self) -> PipelineResult<SessionResult> {
        let guard = self.begin(PipelineState::FetchingManifest)?;
        let started_at = Utc::now();
        let start = Instant::now();
        self.run_state.reset();

        info!(
            "Starting download of version {} for {} (quality: {}, workers: {})",
            self.config.version_id,
            self.host,
            self.config.graphics_quality,
            self.config.worker_config.worker_count
        );

        let report = match self.collect(&guard).await {
            Ok(report) => report,
            Err(e) => {
                error!("Download run failed: {}", e);
                guard.finish(PipelineState::Failed);
                return Err(e);
            }
        };

        guard.transition(PipelineState::FetchingParallel);
        self.run_state.set_total(report.total_tasks());
        let queue = Arc::new(WorkQueue::from_tasks(report.tasks.clone()));

        let observer = self.config.show_progress.then(|| {
            ProgressObserver::spawn(
                self.run_state.clone(),
                self.renderer.clone(),
                self.config.progress_interval,
            )
        });

        let pool = WorkerPool::new(
            self.config.worker_config.clone(),
            self.client.clone(),
            self.run_state.clone(),
            Arc::new(NativeExtractor::new(self.layout.natives_dir())),
            self.host,
        );
        let pool_result = pool.run(queue).await;

        if let Some(observer) = observer {
            observer.stop(self.config.observer_join_timeout).await;
        }

        let pool_stats = match pool_result {
            Ok(stats) => stats,
            Err(e) => {
                error!("Worker pool failed to start: {}", e);
                guard.finish(PipelineState::Failed);
                return Err(e.into());
            }
        };

        guard.transition(PipelineState::Finalizing);
        let result = SessionResult::from_run(
            &report,
            &self.run_state.snapshot(),
            self.run_state.failures(),
            pool_stats.bytes_downloaded,
            started_at,
            start.elapsed(),
        );

        self.run_state.set_download_complete(result.is_success());
        if result.is_success() {
            info!("{}", result.summary());
        } else {
            warn!("{}", result.summary());
        }

        guard.finish(PipelineState::Completed);
        Ok(result)
    }

    /// Remove the game directory and clear the completion flag
    ///
    /// Progress counters keep the last run's values until the next run starts.
    /// Returns whether anything was removed.
    pub async fn clean_install(&self) -> PipelineResult<bool> {
        let guard = self.begin(PipelineState::Cleaning)?;
        let game_dir = self.layout.game_dir().to_path_buf();

        let removed = match tokio::fs::remove_dir_all(&game_dir).await {
            Ok(()) => {
                info!("Removed {}", game_dir.display());
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => {
                error!("Failed to remove {}: {}", game_dir.display(), e);
                Err(PipelineError::Io(e))
            }
        };

        self.run_state.set_download_complete(false);
        guard.finish(PipelineState::Idle);
        removed
    }
}
