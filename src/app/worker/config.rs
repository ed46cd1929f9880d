//! Worker configuration management

use serde::{Deserialize, Serialize};

use crate::constants::workers;
use crate::errors::{DownloadError, DownloadResult};

/// Configuration for the fetch worker pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Number of concurrent workers (the parallelism bound)
    pub worker_count: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            worker_count: workers::DEFAULT_PARALLELISM,
        }
    }
}

impl WorkerConfig {
    pub fn with_worker_count(mut self, count: usize) -> Self {
        self.worker_count = count;
        self
    }

    /// Validate configuration values
    ///
    /// The settings range is enforced by the application config; here only a
    /// pool that could never run or exceeds the hard maximum is rejected.
    pub fn validate(&self) -> DownloadResult<()> {
        if self.worker_count == 0 {
            return Err(DownloadError::ConfigurationError(
                "Worker count cannot be zero".to_string(),
            ));
        }

        if self.worker_count > workers::MAX_PARALLELISM {
            return Err(DownloadError::ConfigurationError(format!(
                "Worker count ({}) exceeds maximum ({})",
                self.worker_count,
                workers::MAX_PARALLELISM
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_worker_config_validation() {
        assert_ok!(WorkerConfig::default().validate());
        assert_err!(WorkerConfig::default().with_worker_count(0).validate());
        assert_err!(WorkerConfig::default().with_worker_count(21).validate());
        assert_ok!(WorkerConfig::default().with_worker_count(1).validate());
    }
}
