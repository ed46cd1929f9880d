//! Shared run state
//!
//! One `RunState` is owned by the coordinator and shared by reference counting
//! with the worker pool and the progress observer. Counters live behind one
//! lock; the current file name has its own lock so display reads never
//! contend with counter updates. No lock is held across an await point.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::app::models::DownloadTask;

/// Point-in-time copy of the progress counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    /// Finished tasks (success or failure)
    pub completed: usize,
    /// Tasks in this run
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// File most recently picked up by a worker
    pub current_file: Option<String>,
}

impl ProgressSnapshot {
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            (self.completed as f64 / self.total as f64) * 100.0
        }
    }

    pub fn is_finished(&self) -> bool {
        self.completed >= self.total
    }
}

/// A task that did not complete successfully
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedTask {
    pub url: String,
    pub destination: String,
    pub reason: String,
}

impl FailedTask {
    pub fn new(task: &DownloadTask, reason: impl Into<String>) -> Self {
        Self {
            url: task.url.clone(),
            destination: task.destination.display().to_string(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Default)]
struct Counters {
    completed: usize,
    total: usize,
    succeeded: usize,
    failed: usize,
}

/// Counters, current file and completion flag for one run
#[derive(Debug, Default)]
pub struct RunState {
    counters: Mutex<Counters>,
    current_file: Mutex<Option<String>>,
    failures: Mutex<Vec<FailedTask>>,
    download_complete: AtomicBool,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero every per-run value; the completion flag is left alone
    pub fn reset(&self) {
        *lock(&self.counters) = Counters::default();
        *lock(&self.current_file) = None;
        lock(&self.failures).clear();
    }

    /// Fix the total for the run
    pub fn set_total(&self, total: usize) {
        lock(&self.counters).total = total;
    }

    pub fn set_current_file(&self, name: impl Into<String>) {
        *lock(&self.current_file) = Some(name.into());
    }

    /// Record a finished task; advances `completed` exactly once
    pub fn record_success(&self) {
        let mut counters = lock(&self.counters);
        counters.completed += 1;
        counters.succeeded += 1;
    }

    /// Record a failed task; advances `completed` exactly once
    pub fn record_failure(&self, failure: FailedTask) {
        {
            let mut counters = lock(&self.counters);
            counters.completed += 1;
            counters.failed += 1;
        }
        lock(&self.failures).push(failure);
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        let (completed, total, succeeded, failed) = {
            let c = lock(&self.counters);
            (c.completed, c.total, c.succeeded, c.failed)
        };
        ProgressSnapshot {
            completed,
            total,
            succeeded,
            failed,
            current_file: lock(&self.current_file).clone(),
        }
    }

    pub fn failures(&self) -> Vec<FailedTask> {
        lock(&self.failures).clone()
    }

    pub fn is_download_complete(&self) -> bool {
        self.download_complete.load(Ordering::SeqCst)
    }

    pub fn set_download_complete(&self, complete: bool) {
        self.download_complete.store(complete, Ordering::SeqCst);
    }
}

// Counter updates cannot leave the data half-written, so a poisoned lock is still usable
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
