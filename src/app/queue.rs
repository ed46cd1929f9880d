//! Sealed work queue shared by the fetch workers
//!
//! The queue is built from the collected task list and never grows afterwards,
//! so the run's total is fixed before the first worker starts. Workers claim
//! tasks one at a time; completion order is whatever order they finish in.

use std::collections::VecDeque;

use tokio::sync::Mutex;
use tracing::debug;

use crate::app::models::DownloadTask;

/// Work queue statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    /// Tasks the queue was built with
    pub total: usize,
    /// Tasks not yet claimed by a worker
    pub pending: usize,
}

/// FIFO of tasks for one run
#[derive(Debug)]
pub struct WorkQueue {
    total: usize,
    pending: Mutex<VecDeque<DownloadTask>>,
}

impl WorkQueue {
    /// Seal a task list into a queue
    pub fn from_tasks(tasks: Vec<DownloadTask>) -> Self {
        let total = tasks.len();
        debug!("Work queue sealed with {} tasks", total);
        Self {
            total,
            pending: Mutex::new(tasks.into()),
        }
    }

    /// Claim the next task, or `None` once drained
    pub async fn get_next_work(&self) -> Option<DownloadTask> {
        self.pending.lock().await.pop_front()
    }

    /// Number of tasks the queue was built with
    pub fn total(&self) -> usize {
        self.total
    }

    pub async fn stats(&self) -> QueueStats {
        QueueStats {
            total: self.total,
            pending: self.pending.lock().await.len(),
        }
    }

    pub async fn is_drained(&self) -> bool {
        self.pending.lock().await.is_empty()
    }
}
