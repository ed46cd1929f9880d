//! Manifest handling: loading, rule evaluation, asset filtering and task collection
//!
//! - [`store`] - Manifest and asset index loading with an on-disk cache
//! - [`rules`] - Platform rule evaluation for libraries
//! - [`assets`] - Asset categories and the quality predicate table
//! - [`collector`] - Turns descriptors into a deduplicated task list

pub mod assets;
pub mod collector;
pub mod rules;
pub mod store;

pub use assets::{include_predicate, should_download, AssetCategory, IncludePredicate};
pub use collector::{CategoryStats, CollectionReport, TaskCollector};
pub use rules::{library_included, rules_allow};
pub use store::ManifestStore;
