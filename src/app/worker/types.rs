//! Worker type definitions

use serde::{Deserialize, Serialize};

/// Result of processing one task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskOutcome {
    /// Destination already valid; no network access
    AlreadyValid,
    /// Fetched (and extracted, for native archives)
    Downloaded { bytes: u64 },
    /// Fetch, verification or extraction failed
    Failed { reason: String },
}

impl TaskOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, TaskOutcome::Failed { .. })
    }
}

/// What one worker did over its lifetime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerSummary {
    pub worker_id: u32,
    pub tasks_processed: usize,
    pub tasks_failed: usize,
    pub bytes_downloaded: u64,
}

impl WorkerSummary {
    pub fn new(worker_id: u32) -> Self {
        Self {
            worker_id,
            ..Default::default()
        }
    }

    pub fn record(&mut self, outcome: &TaskOutcome) {
        self.tasks_processed += 1;
        match outcome {
            TaskOutcome::Downloaded { bytes } => self.bytes_downloaded += bytes,
            TaskOutcome::Failed { .. } => self.tasks_failed += 1,
            TaskOutcome::AlreadyValid => {}
        }
    }
}

/// Aggregate of every worker in a pool run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerPoolStats {
    pub workers: usize,
    pub tasks_processed: usize,
    pub tasks_failed: usize,
    pub bytes_downloaded: u64,
}

impl WorkerPoolStats {
    pub fn add(&mut self, summary: &WorkerSummary) {
        self.workers += 1;
        self.tasks_processed += summary.tasks_processed;
        self.tasks_failed += summary.tasks_failed;
        self.bytes_downloaded += summary.bytes_downloaded;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_accumulates_outcomes() {
        let mut summary = WorkerSummary::new(3);
        summary.record(&TaskOutcome::Downloaded { bytes: 10 });
        summary.record(&TaskOutcome::AlreadyValid);
        summary.record(&TaskOutcome::Failed {
            reason: "HTTP 500".into(),
        });

        assert_eq!(summary.tasks_processed, 3);
        assert_eq!(summary.tasks_failed, 1);
        assert_eq!(summary.bytes_downloaded, 10);

        let mut pool = WorkerPoolStats::default();
        pool.add(&summary);
        pool.add(&WorkerSummary::new(4));
        assert_eq!(pool.workers, 2);
        assert_eq!(pool.tasks_processed, 3);
    }
}
