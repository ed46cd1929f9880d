//! Worker pool management
//!
//! The pool spawns `worker_count` tokio tasks over one shared queue and joins
//! them all. At most `worker_count` fetches are ever in flight.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info};

use super::config::WorkerConfig;
use super::core::DownloadWorkerBuilder;
use super::types::{WorkerPoolStats, WorkerSummary};
use crate::app::client::FetchClient;
use crate::app::coordinator::state::RunState;
use crate::app::natives::NativeExtractor;
use crate::app::platform::HostPlatform;
use crate::app::queue::WorkQueue;
use crate::errors::DownloadResult;

/// Pool of fetch workers sharing one queue
#[derive(Debug)]
pub struct WorkerPool {
    config: WorkerConfig,
    client: Arc<FetchClient>,
    state: Arc<RunState>,
    extractor: Arc<NativeExtractor>,
    host: HostPlatform,
}

impl WorkerPool {
    pub fn new(
        config: WorkerConfig,
        client: Arc<FetchClient>,
        state: Arc<RunState>,
        extractor: Arc<NativeExtractor>,
        host: HostPlatform,
    ) -> Self {
        Self {
            config,
            client,
            state,
            extractor,
            host,
        }
    }

    /// Run every task in `queue` to completion
    ///
    /// # Errors
    ///
    /// Returns `DownloadError::ConfigurationError` for an invalid configuration;
    /// individual task failures are recorded in the run state instead.
    pub async fn run(&self, queue: Arc<WorkQueue>) -> DownloadResult<WorkerPoolStats> {
        self.config.validate()?;

        // No point spawning idle workers for a short queue
        let worker_count = self.config.worker_count.min(queue.total()).max(1);
        info!(
            "Starting {} workers for {} tasks",
            worker_count,
            queue.total()
        );

        let mut handles: Vec<JoinHandle<WorkerSummary>> = Vec::with_capacity(worker_count);
        for worker_id in 0..worker_count {
            let worker = DownloadWorkerBuilder::new()
                .id(worker_id as u32)
                .queue(queue.clone())
                .client(self.client.clone())
                .state(self.state.clone())
                .extractor(self.extractor.clone())
                .host(self.host)
                .build()?;

            handles.push(tokio::spawn(worker.run()));
        }

        let mut stats = WorkerPoolStats::default();
        for handle in handles {
            match handle.await {
                Ok(summary) => stats.add(&summary),
                Err(e) => error!("Worker task panicked: {}", e),
            }
        }

        info!(
            "Worker pool finished: {} tasks, {} failed, {} bytes",
            stats.tasks_processed, stats.tasks_failed, stats.bytes_downloaded
        );
        Ok(stats)
    }
}
