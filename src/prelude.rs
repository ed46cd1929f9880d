//! Prelude module for Client Fetcher Library
//!
//! This module re-exports the most commonly used items from the library,
//! providing a convenient way to import everything needed for typical usage
//! with a single `use client_fetcher::prelude::*;` statement.
//!
//! # Usage
//!
//! ```rust,no_run
//! use client_fetcher::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = CoordinatorConfig::default()
//!         .with_base_dir("llauncher")
//!         .with_graphics_quality(GraphicsQuality::Medium);
//!
//!     let coordinator = Coordinator::new(config)?;
//!     let result = coordinator.run_download().await?;
//!     println!("{}", result.summary_line());
//!     Ok(())
//! }
//! ```

// Core result types
pub use crate::errors::{AppError, Result};

// Essential app components that are used in most integrations
pub use crate::app::{
    ClientConfig,
    CollectionReport,
    // Core orchestration
    Coordinator,
    CoordinatorConfig,
    FetchClient,
    GameLayout,
    GraphicsQuality,
    HostPlatform,
    IntegrityVerifier,
    PipelineState,
    // Result and status types
    ProgressSnapshot,
    RunStatus,
    SessionResult,
    Sha1Hash,
    TaskKind,
};

pub use crate::config::AppConfig;

// Commonly used constants
pub use crate::constants::{DEFAULT_PARALLELISM, USER_AGENT};

// Standard library re-exports that are commonly needed
pub use std::path::{Path, PathBuf};
pub use std::sync::Arc;

pub use tokio;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prelude_imports() {
        let coordinator_config = CoordinatorConfig::default();
        let _client_config = ClientConfig::default();
        let _app_config = AppConfig::default();

        assert_eq!(coordinator_config.worker_config.worker_count, DEFAULT_PARALLELISM);
        assert!(USER_AGENT.contains("Client-Fetcher"));
    }
}
