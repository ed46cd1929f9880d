//! Client Fetcher Library
//!
//! A Rust library for bootstrapping a game client installation: it fetches a
//! versioned manifest, verifies every listed file by SHA-1 digest, downloads
//! what is missing or stale with a bounded worker pool, and extracts the
//! native libraries for the running platform.

pub mod app;
pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;
pub mod prelude;

// Re-export commonly used types for convenience
pub use errors::{AppError, Result};
