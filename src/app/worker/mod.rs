//! Fetch worker system for concurrent task execution
//!
//! Workers pull tasks from one sealed queue until it drains, so the number of
//! in-flight fetches never exceeds the pool size. Each worker pre-checks the
//! local file, streams and verifies the download, and extracts native
//! archives for the running platform.
//!
//! # Module Organization
//!
//! - [`config`] - Worker pool configuration with validation
//! - [`types`] - Task outcomes and per-worker summaries
//! - [`core`] - Individual worker implementation
//! - [`pool`] - Worker pool spawning and joining

pub mod config;
pub mod core;
pub mod pool;
pub mod types;

pub use config::WorkerConfig;
pub use core::{DownloadWorker, DownloadWorkerBuilder};
pub use pool::WorkerPool;
pub use types::{TaskOutcome, WorkerPoolStats, WorkerSummary};
