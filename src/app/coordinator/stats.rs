//! Session results
//!
//! A run always ends with a `SessionResult` stating `succeeded/total`; it only
//! reports success when every collected task succeeded.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::state::{FailedTask, ProgressSnapshot};
use crate::app::manifest::{AssetCategory, CategoryStats, CollectionReport};

/// Overall outcome of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    /// Every task succeeded
    Completed,
    /// Parallel phase finished with some failed tasks
    Incomplete,
}

/// Final result of a download session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResult {
    pub status: RunStatus,
    /// Tasks in the run
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Failure records, in completion order
    pub failures: Vec<FailedTask>,
    /// Asset counts per category
    pub categories: BTreeMap<AssetCategory, CategoryStats>,
    pub excluded_libraries: usize,
    /// Files found valid during collection
    pub already_valid: usize,
    pub estimated_space_saved_bytes: u64,
    pub bytes_downloaded: u64,
    pub started_at: DateTime<Utc>,
    pub total_duration: Duration,
}

impl SessionResult {
    /// Build a result from the final counters of a run
    pub fn from_run(
        report: &CollectionReport,
        snapshot: &ProgressSnapshot,
        failures: Vec<FailedTask>,
        bytes_downloaded: u64,
        started_at: DateTime<Utc>,
        total_duration: Duration,
    ) -> Self {
        let status = if snapshot.completed == snapshot.total
            && snapshot.succeeded == snapshot.total
            && failures.is_empty()
        {
            RunStatus::Completed
        } else {
            RunStatus::Incomplete
        };

        Self {
            status,
            total: snapshot.total,
            succeeded: snapshot.succeeded,
            failed: snapshot.failed,
            failures,
            categories: report.categories.clone(),
            excluded_libraries: report.excluded_libraries,
            already_valid: report.already_valid,
            estimated_space_saved_bytes: report.estimated_space_saved_bytes(),
            bytes_downloaded,
            started_at,
            total_duration,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Completed
    }

    /// `"{succeeded}/{total} succeeded"`
    pub fn summary_line(&self) -> String {
        format!("{}/{} succeeded", self.succeeded, self.total)
    }

    /// Get a summary of the session result
    pub fn summary(&self) -> String {
        match self.status {
            RunStatus::Completed => format!(
                "Download complete: {} in {}",
                self.summary_line(),
                format_duration(self.total_duration)
            ),
            RunStatus::Incomplete => format!(
                "Download incomplete: {}, {} failed, in {}",
                self.summary_line(),
                self.failed,
                format_duration(self.total_duration)
            ),
        }
    }
}

/// Format a duration as human-readable string
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();

    if total_secs < 60 {
        format!("{}s", total_secs)
    } else if total_secs < 3600 {
        format!("{}m{}s", total_secs / 60, total_secs % 60)
    } else {
        format!("{}h{}m", total_secs / 3600, (total_secs % 3600) / 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(total: usize, succeeded: usize, failed: usize) -> ProgressSnapshot {
        ProgressSnapshot {
            completed: succeeded + failed,
            total,
            succeeded,
            failed,
            current_file: None,
        }
    }

    fn failure() -> FailedTask {
        FailedTask {
            url: "https://example.com/x".into(),
            destination: "/tmp/x".into(),
            reason: "HTTP 500".into(),
        }
    }

    /// Test that success requires every task to succeed
    ///
    /// Equal counters alone are not enough when a failure was recorded.
    #[test]
    fn test_status_requires_all_successes() {
        let report = CollectionReport::default();
        let now = Utc::now();

        let ok = SessionResult::from_run(&report, &snapshot(3, 3, 0), vec![], 0, now, Duration::ZERO);
        assert!(ok.is_success());
        assert_eq!(ok.summary_line(), "3/3 succeeded");

        let partial = SessionResult::from_run(
            &report,
            &snapshot(3, 2, 1),
            vec![failure()],
            0,
            now,
            Duration::ZERO,
        );
        assert_eq!(partial.status, RunStatus::Incomplete);
        assert_eq!(partial.summary_line(), "2/3 succeeded");
        assert!(partial.summary().contains("incomplete"));
    }

    #[test]
    fn test_empty_run_is_complete() {
        let result = SessionResult::from_run(
            &CollectionReport::default(),
            &snapshot(0, 0, 0),
            vec![],
            0,
            Utc::now(),
            Duration::from_secs(1),
        );
        assert!(result.is_success());
        assert_eq!(result.summary_line(), "0/0 succeeded");
    }

    /// Test duration formatting
    ///
    /// Ensures that durations are formatted in a human-readable
    /// format with appropriate units.
    #[test]
    fn test_duration_formatting() {
        assert_eq!(format_duration(Duration::from_secs(30)), "30s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m30s");
        assert_eq!(format_duration(Duration::from_secs(3665)), "1h1m");
    }
}
