//! Core application logic for Client Fetcher
//!
//! This module contains the main application components including the HTTP
//! client, descriptor models, task collection, the worker pool and the
//! orchestration logic.
//!
//! # Examples
//!
//! ```rust,no_run
//! use client_fetcher::app::{GameLayout, IntegrityVerifier, Sha1Hash};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let layout = GameLayout::new("llauncher");
//! let expected: Sha1Hash = "a9993e364706816aba3e25717850c26c9cd0d89d".parse()?;
//!
//! if IntegrityVerifier::verify(&layout.client_jar(), &expected).await {
//!     println!("Client binary is up to date");
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod coordinator;
pub mod hash;
pub mod layout;
pub mod manifest;
pub mod models;
pub mod natives;
pub mod platform;
pub mod queue;
pub mod verification;
pub mod worker;

// Re-export main public API
pub use client::{ClientConfig, FetchClient};
pub use coordinator::{
    Coordinator, CoordinatorConfig, FailedTask, PipelineState, ProgressRenderer,
    ProgressSnapshot, RunStatus, SessionResult,
};
pub use hash::Sha1Hash;
pub use layout::GameLayout;
pub use manifest::{AssetCategory, CollectionReport, ManifestStore, TaskCollector};
pub use models::{
    AssetIndex, DownloadTask, GraphicsQuality, Library, Manifest, Rule, RuleAction, TaskKind,
};
pub use natives::NativeExtractor;
pub use platform::{Arch, HostPlatform, Platform};
pub use queue::{QueueStats, WorkQueue};
pub use verification::IntegrityVerifier;
pub use worker::{WorkerConfig, WorkerPool};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_structure() {
        // Ensure public API is accessible
        let config = ClientConfig::default();
        assert!(config.tcp_nodelay);
        assert_eq!(CoordinatorConfig::default().graphics_quality, GraphicsQuality::High);
    }
}
