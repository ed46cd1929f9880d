//! Core download worker implementation
//!
//! Each worker repeatedly claims the next task from the shared queue until it
//! drains. A task is pre-checked against the local file, fetched and verified
//! when needed, and extracted when it is a native archive for this machine.
//! Errors never leave the worker: every task ends as exactly one recorded
//! success or failure in the shared run state.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::{debug, info, warn};

use super::types::{TaskOutcome, WorkerSummary};
use crate::app::client::FetchClient;
use crate::app::coordinator::state::{FailedTask, RunState};
use crate::app::models::DownloadTask;
use crate::app::natives::NativeExtractor;
use crate::app::platform::HostPlatform;
use crate::app::queue::WorkQueue;
use crate::app::verification::IntegrityVerifier;
use crate::errors::{DownloadError, DownloadResult};

/// Individual download worker
#[derive(Debug)]
pub struct DownloadWorker {
    /// Unique worker identifier
    id: u32,
    /// Shared work queue
    queue: Arc<WorkQueue>,
    /// Shared HTTP client
    client: Arc<FetchClient>,
    /// Shared counters
    state: Arc<RunState>,
    /// Shared native extractor
    extractor: Arc<NativeExtractor>,
    host: HostPlatform,
}

impl DownloadWorker {
    /// Start the worker loop; returns once the queue is drained
    pub async fn run(self) -> WorkerSummary {
        debug!("Worker {} starting", self.id);
        let mut summary = WorkerSummary::new(self.id);

        while let Some(task) = self.queue.get_next_work().await {
            let outcome = guarded(self.process_task(&task)).await;

            match &outcome {
                TaskOutcome::Failed { reason } => {
                    warn!("Failed {}: {}", task.url, reason);
                    self.state.record_failure(FailedTask::new(&task, reason.clone()));
                }
                _ => self.state.record_success(),
            }
            summary.record(&outcome);
        }

        debug!(
            "Worker {} finished: {} tasks, {} failed",
            self.id, summary.tasks_processed, summary.tasks_failed
        );
        summary
    }

    /// Pre-check, fetch and extract a single task
    pub async fn process_task(&self, task: &DownloadTask) -> TaskOutcome {
        self.state.set_current_file(task.display_name());

        let outcome = if IntegrityVerifier::is_present_and_valid(
            &task.destination,
            task.expected.as_ref(),
        )
        .await
        {
            debug!("Worker {} found valid file: {}", self.id, task.display_name());
            TaskOutcome::AlreadyValid
        } else {
            match self
                .client
                .download_to_file(&task.url, &task.destination, task.expected.as_ref())
                .await
            {
                Ok(written) => TaskOutcome::Downloaded {
                    bytes: written.bytes,
                },
                Err(e) => {
                    return TaskOutcome::Failed {
                        reason: e.to_string(),
                    }
                }
            }
        };

        if task.is_native() && self.host.is_compatible_native(&task.destination) {
            info!("Extracting native library {}", task.display_name());
            if !self
                .extractor
                .extract_blocking(task.destination.clone())
                .await
            {
                return TaskOutcome::Failed {
                    reason: DownloadError::ExtractionFailed {
                        path: task.destination.clone(),
                    }
                    .to_string(),
                };
            }
        }

        outcome
    }
}

/// Turn a panic while processing a task into a failed outcome
///
/// The claimed task is still recorded, so `completed` reaches the total.
async fn guarded<F>(task: F) -> TaskOutcome
where
    F: Future<Output = TaskOutcome>,
{
    match AssertUnwindSafe(task).catch_unwind().await {
        Ok(outcome) => outcome,
        Err(payload) => TaskOutcome::Failed {
            reason: format!("Worker panicked: {}", panic_message(payload.as_ref())),
        },
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}

/// Builder for creating DownloadWorker instances with validation
#[derive(Debug, Default)]
pub struct DownloadWorkerBuilder {
    id: Option<u32>,
    queue: Option<Arc<WorkQueue>>,
    client: Option<Arc<FetchClient>>,
    state: Option<Arc<RunState>>,
    extractor: Option<Arc<NativeExtractor>>,
    host: Option<HostPlatform>,
}

impl DownloadWorkerBuilder {
    /// Create a new worker builder
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: u32) -> Self {
        self.id = Some(id);
        self
    }

    pub fn queue(mut self, queue: Arc<WorkQueue>) -> Self {
        self.queue = Some(queue);
        self
    }

    pub fn client(mut self, client: Arc<FetchClient>) -> Self {
        self.client = Some(client);
        self
    }

    pub fn state(mut self, state: Arc<RunState>) -> Self {
        self.state = Some(state);
        self
    }

    pub fn extractor(mut self, extractor: Arc<NativeExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    pub fn host(mut self, host: HostPlatform) -> Self {
        self.host = Some(host);
        self
    }

    /// Build the worker
    ///
    /// # Errors
    ///
    /// Returns `DownloadError::ConfigurationError` if a required component is missing
    pub fn build(self) -> DownloadResult<DownloadWorker> {
        let missing =
            |field: &str| DownloadError::ConfigurationError(format!("Worker {} is required", field));

        Ok(DownloadWorker {
            id: self.id.ok_or_else(|| missing("id"))?,
            queue: self.queue.ok_or_else(|| missing("queue"))?,
            client: self.client.ok_or_else(|| missing("client"))?,
            state: self.state.ok_or_else(|| missing("state"))?,
            extractor: self.extractor.ok_or_else(|| missing("extractor"))?,
            host: self.host.ok_or_else(|| missing("host"))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::client::ClientConfig;
    use crate::app::hash::Sha1Hash;
    use crate::app::models::TaskKind;
    use crate::app::platform::{Arch, Platform};
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct Fixture {
        dir: TempDir,
        state: Arc<RunState>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                dir: TempDir::new().unwrap(),
                state: Arc::new(RunState::new()),
            }
        }

        fn worker(&self, tasks: Vec<DownloadTask>) -> DownloadWorker {
            self.state.set_total(tasks.len());
            let client = FetchClient::with_config(ClientConfig::default().with_max_retries(0)).unwrap();
            DownloadWorkerBuilder::new()
                .id(1)
                .queue(Arc::new(WorkQueue::from_tasks(tasks)))
                .client(Arc::new(client))
                .state(self.state.clone())
                .extractor(Arc::new(NativeExtractor::new(self.dir.path().join("natives"))))
                .host(HostPlatform::new(Platform::Linux, Arch::X86_64))
                .build()
                .unwrap()
        }
    }

    /// Test DownloadWorkerBuilder validation
    ///
    /// Ensures missing components are reported instead of panicking.
    #[test]
    fn test_builder_requires_components() {
        let result = DownloadWorkerBuilder::new().id(1).build();
        assert!(matches!(result, Err(DownloadError::ConfigurationError(_))));
    }

    /// Test that a valid local file is not fetched
    ///
    /// The mock server has no routes, so any request would fail the task.
    #[tokio::test]
    async fn test_valid_file_skips_network() {
        let fixture = Fixture::new();
        let server = MockServer::start().await;
        let dest = fixture.dir.path().join("client.jar");
        tokio::fs::write(&dest, b"abc").await.unwrap();

        let task = DownloadTask::new(
            format!("{}/client.jar", server.uri()),
            &dest,
            Some(Sha1Hash::compute(b"abc")),
            TaskKind::Client,
        );
        let summary = fixture.worker(vec![task]).run().await;

        assert_eq!(summary.tasks_processed, 1);
        assert_eq!(summary.bytes_downloaded, 0);
        assert_eq!(fixture.state.snapshot().succeeded, 1);
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    /// Test partial failure tolerance
    ///
    /// A 404 fails its own task while the next task still succeeds.
    #[tokio::test]
    async fn test_failure_does_not_stop_worker() {
        let fixture = Fixture::new();
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ok.jar"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ok".to_vec()))
            .mount(&server)
            .await;

        let tasks = vec![
            DownloadTask::new(
                format!("{}/missing.jar", server.uri()),
                fixture.dir.path().join("missing.jar"),
                None,
                TaskKind::Library,
            ),
            DownloadTask::new(
                format!("{}/ok.jar", server.uri()),
                fixture.dir.path().join("ok.jar"),
                Some(Sha1Hash::compute(b"ok")),
                TaskKind::Library,
            ),
        ];
        let summary = fixture.worker(tasks).run().await;

        let snapshot = fixture.state.snapshot();
        assert_eq!(snapshot.completed, 2);
        assert_eq!(snapshot.failed, 1);
        assert_eq!(summary.bytes_downloaded, 2);
        assert!(fixture.state.failures()[0].reason.contains("404"));
    }

    async fn exploding_task() -> TaskOutcome {
        panic!("decoder blew up")
    }

    /// Test that a panic inside task processing is recorded as a failure
    #[tokio::test]
    async fn test_panicking_task_becomes_failure() {
        let outcome = guarded(exploding_task()).await;
        match outcome {
            TaskOutcome::Failed { reason } => assert!(reason.contains("decoder blew up")),
            other => panic!("expected failure, got {:?}", other),
        }

        let outcome = guarded(async { TaskOutcome::Downloaded { bytes: 4 } }).await;
        assert_eq!(outcome, TaskOutcome::Downloaded { bytes: 4 });
    }

    /// Test that a corrupt native archive fails only its own task
    #[tokio::test]
    async fn test_corrupt_native_is_failed_task() {
        let fixture = Fixture::new();
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/lwjgl-natives-linux.jar"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"not a zip".to_vec()))
            .mount(&server)
            .await;

        let task = DownloadTask::new(
            format!("{}/lwjgl-natives-linux.jar", server.uri()),
            fixture.dir.path().join("lwjgl-natives-linux.jar"),
            None,
            TaskKind::Native,
        );
        let worker = fixture.worker(vec![task.clone()]);
        let outcome = worker.process_task(&task).await;

        assert!(matches!(outcome, TaskOutcome::Failed { .. }));
    }
}
