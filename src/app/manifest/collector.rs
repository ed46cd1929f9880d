//! Download task collection
//!
//! Walks a manifest and its asset index, applies platform rules and the
//! quality filter, and emits one task per destination that is missing or
//! fails verification. Collection against a complete, valid tree yields no
//! tasks.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::assets::{should_download, AssetCategory};
use super::rules::library_included;
use crate::app::hash::Sha1Hash;
use crate::app::layout::GameLayout;
use crate::app::models::{AssetIndex, DownloadTask, GraphicsQuality, Manifest, TaskKind};
use crate::app::platform::HostPlatform;
use crate::app::verification::IntegrityVerifier;
use crate::constants::{assets, files};

/// Per-category asset counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryStats {
    /// Assets in the index belonging to this category
    pub total: usize,
    /// Assets excluded by the quality filter
    pub skipped: usize,
    /// Assets that produced a download task
    pub queued: usize,
}

impl CategoryStats {
    pub fn skipped_percentage(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.skipped as f64 / self.total as f64) * 100.0
        }
    }
}

/// Result of task collection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectionReport {
    /// Tasks to execute, deduplicated by destination
    pub tasks: Vec<DownloadTask>,
    /// Asset counts per category
    pub categories: BTreeMap<AssetCategory, CategoryStats>,
    /// Libraries excluded by platform rules
    pub excluded_libraries: usize,
    /// Candidates already present and valid on disk
    pub already_valid: usize,
}

impl CollectionReport {
    pub fn total_tasks(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Assets excluded by the quality filter
    pub fn skipped_assets(&self) -> usize {
        self.categories.values().map(|s| s.skipped).sum()
    }

    /// Assets that produced a task
    pub fn queued_assets(&self) -> usize {
        self.categories.values().map(|s| s.queued).sum()
    }

    /// Heuristic disk space saved by skipped assets
    pub fn estimated_space_saved_bytes(&self) -> u64 {
        self.skipped_assets() as u64 * assets::AVERAGE_ASSET_SIZE_BYTES
    }

    /// Count of tasks of one kind
    pub fn count_kind(&self, kind: TaskKind) -> usize {
        self.tasks.iter().filter(|t| t.kind == kind).count()
    }

    fn log_summary(&self) {
        info!(
            "Assets to download: {}, skipped by quality filter: {}",
            self.queued_assets(),
            self.skipped_assets()
        );
        for (category, stats) in &self.categories {
            if stats.total > 0 {
                info!(
                    "  {}: {}/{} skipped ({:.1}%)",
                    category,
                    stats.skipped,
                    stats.total,
                    stats.skipped_percentage()
                );
            }
        }
        info!(
            "Estimated space saved: ~{:.1} MB",
            self.estimated_space_saved_bytes() as f64 / (1024.0 * 1024.0)
        );
    }
}

/// Builds the task list for one run
#[derive(Debug, Clone)]
pub struct TaskCollector {
    layout: GameLayout,
    host: HostPlatform,
    quality: GraphicsQuality,
    resources_base_url: String,
}

impl TaskCollector {
    pub fn new(
        layout: GameLayout,
        host: HostPlatform,
        quality: GraphicsQuality,
        resources_base_url: impl Into<String>,
    ) -> Self {
        Self {
            layout,
            host,
            quality,
            resources_base_url: resources_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Remote URL of an asset object
    pub fn asset_url(&self, hash: &Sha1Hash) -> String {
        format!("{}/{}/{}", self.resources_base_url, hash.prefix(), hash.to_hex())
    }

    /// Collect every task the manifest and asset index require
    pub async fn collect(&self, manifest: &Manifest, asset_index: &AssetIndex) -> CollectionReport {
        let mut report = CollectionReport::default();
        let mut seen: HashSet<PathBuf> = HashSet::new();
        let mut candidates: Vec<(DownloadTask, Option<AssetCategory>)> = Vec::new();

        let mut push = |task: DownloadTask, category: Option<AssetCategory>| {
            if seen.insert(task.destination.clone()) {
                candidates.push((task, category));
            }
        };

        let client = &manifest.downloads.client;
        push(
            DownloadTask::new(
                client.url.clone(),
                self.layout.client_jar(),
                client.sha1,
                TaskKind::Client,
            ),
            None,
        );

        let classifier_keys = self.host.classifier_preference();
        for library in &manifest.libraries {
            if !library_included(library, &self.host) {
                debug!("Library excluded by rules on {}: {}", self.host, library.name);
                report.excluded_libraries += 1;
                continue;
            }

            if let Some(artifact) = &library.downloads.artifact {
                // Newer manifests ship natives as plain artifacts gated by OS rules
                let kind = if self.host.is_compatible_native(Path::new(&artifact.path)) {
                    TaskKind::Native
                } else {
                    TaskKind::Library
                };
                push(
                    DownloadTask::new(
                        artifact.url.clone(),
                        self.layout.library_path(&artifact.path),
                        artifact.sha1,
                        kind,
                    ),
                    None,
                );
            }

            let native = classifier_keys
                .iter()
                .find_map(|key| library.downloads.classifiers.get(*key));
            if let Some(native) = native {
                push(
                    DownloadTask::new(
                        native.url.clone(),
                        self.layout.library_path(&native.path),
                        native.sha1,
                        TaskKind::Native,
                    ),
                    None,
                );
            }
        }

        if report.excluded_libraries > 0 {
            info!(
                "{} libraries excluded for platform {}",
                report.excluded_libraries, self.host
            );
        }

        for category in AssetCategory::ALL {
            report.categories.insert(category, CategoryStats::default());
        }

        for (name, object) in &asset_index.objects {
            let (category, include) = should_download(name, self.quality);
            let stats = report.categories.entry(category).or_default();
            stats.total += 1;

            if !include {
                stats.skipped += 1;
                debug!("Skipping asset [{}]: {}", category, name);
                continue;
            }

            push(
                DownloadTask::new(
                    self.asset_url(&object.hash),
                    self.layout.object_path(&object.hash),
                    Some(object.hash),
                    TaskKind::Asset,
                ),
                Some(category),
            );
        }

        // Pre-check every candidate against the local tree, preserving order
        let checked: Vec<_> = stream::iter(candidates)
            .map(|(task, category)| async move {
                let valid =
                    IntegrityVerifier::is_present_and_valid(&task.destination, task.expected.as_ref())
                        .await;
                (task, category, valid)
            })
            .buffered(files::PRECHECK_CONCURRENCY)
            .collect()
            .await;

        for (task, category, valid) in checked {
            if valid {
                report.already_valid += 1;
                continue;
            }
            if let Some(category) = category {
                report.categories.entry(category).or_default().queued += 1;
            }
            report.tasks.push(task);
        }

        report.log_summary();
        debug!(
            "Collected {} tasks ({} already valid)",
            report.total_tasks(),
            report.already_valid
        );
        report
    }
}
