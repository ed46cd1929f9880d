//! Data models for Client Fetcher
//!
//! This module defines the manifest and asset index structures as they appear
//! on the wire, plus the download task type produced by collection and
//! consumed by the worker pool.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::app::hash::Sha1Hash;

/// Version manifest: client binary, libraries and asset index location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Version id (also the on-disk cache key)
    pub id: String,
    /// Top-level downloads; only the client binary is used
    pub downloads: ManifestDownloads,
    /// Shared and native libraries
    #[serde(default)]
    pub libraries: Vec<Library>,
    /// Reference to the asset index
    #[serde(rename = "assetIndex")]
    pub asset_index: AssetIndexRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestDownloads {
    pub client: RemoteFile,
}

/// A remote file with an optional digest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteFile {
    pub url: String,
    #[serde(default)]
    pub sha1: Option<Sha1Hash>,
    #[serde(default)]
    pub size: Option<u64>,
}

/// Where to fetch the asset index from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetIndexRef {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub sha1: Option<Sha1Hash>,
}

/// A library entry, possibly platform-conditional
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Library {
    pub name: String,
    /// Absent rules means the library applies everywhere
    #[serde(default)]
    pub rules: Option<Vec<Rule>>,
    #[serde(default)]
    pub downloads: LibraryDownloads,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LibraryDownloads {
    #[serde(default)]
    pub artifact: Option<Artifact>,
    /// Native variants keyed by classifier (e.g. `natives-linux`)
    #[serde(default)]
    pub classifiers: BTreeMap<String, Artifact>,
}

/// A downloadable library file with its path below the libraries root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub url: String,
    pub path: String,
    #[serde(default)]
    pub sha1: Option<Sha1Hash>,
    #[serde(default)]
    pub size: Option<u64>,
}

/// Platform inclusion rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(default)]
    pub action: RuleAction,
    #[serde(default)]
    pub os: Option<OsConstraint>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleAction {
    #[default]
    Allow,
    #[serde(alias = "disallow")]
    Deny,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OsConstraint {
    #[serde(default)]
    pub name: Option<String>,
}

impl Rule {
    /// Unconditional rule with the given action
    pub fn unconditional(action: RuleAction) -> Self {
        Self { action, os: None }
    }

    /// Rule constrained to an OS name
    pub fn for_os(action: RuleAction, name: &str) -> Self {
        Self {
            action,
            os: Some(OsConstraint {
                name: Some(name.to_string()),
            }),
        }
    }
}

/// Asset index: logical resource names mapped to content-addressed objects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetIndex {
    pub objects: BTreeMap<String, AssetObject>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetObject {
    pub hash: Sha1Hash,
    #[serde(default)]
    pub size: u64,
}

/// Kind of file a task fetches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskKind {
    Client,
    Library,
    /// Native archive, extracted after a successful fetch
    Native,
    Asset,
}

/// One unit of work for the fetch pool
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DownloadTask {
    pub url: String,
    pub destination: PathBuf,
    /// Known digest; `None` means existence-only caching
    pub expected: Option<Sha1Hash>,
    pub kind: TaskKind,
}

impl DownloadTask {
    pub fn new(
        url: impl Into<String>,
        destination: impl Into<PathBuf>,
        expected: Option<Sha1Hash>,
        kind: TaskKind,
    ) -> Self {
        Self {
            url: url.into(),
            destination: destination.into(),
            expected,
            kind,
        }
    }

    /// File name shown in progress output
    pub fn display_name(&self) -> String {
        self.destination
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.url.clone())
    }

    pub fn is_native(&self) -> bool {
        self.kind == TaskKind::Native
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }
}

/// Graphics quality setting driving asset filtering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphicsQuality {
    Low,
    Medium,
    #[default]
    High,
}

impl GraphicsQuality {
    pub const ALL: [GraphicsQuality; 3] = [Self::Low, Self::Medium, Self::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for GraphicsQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for GraphicsQuality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!(
                "invalid graphics quality '{}': expected low, medium or high",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST_JSON: &str = r#"{
        "id": "1.21.5",
        "downloads": {
            "client": {
                "url": "https://example.com/client.jar",
                "sha1": "a9993e364706816aba3e25717850c26c9cd0d89d",
                "size": 3
            },
            "server": { "url": "https://example.com/server.jar" }
        },
        "libraries": [
            {
                "name": "org.lwjgl:lwjgl:3.3.3",
                "downloads": {
                    "artifact": {
                        "url": "https://example.com/lwjgl.jar",
                        "path": "org/lwjgl/lwjgl/3.3.3/lwjgl-3.3.3.jar",
                        "sha1": "da39a3ee5e6b4b0d3255bfef95601890afd80709"
                    },
                    "classifiers": {
                        "natives-linux": {
                            "url": "https://example.com/lwjgl-natives-linux.jar",
                            "path": "org/lwjgl/lwjgl/3.3.3/lwjgl-3.3.3-natives-linux.jar"
                        }
                    }
                },
                "rules": [
                    { "action": "allow" },
                    { "action": "disallow_unknown_is_rejected", "os": { "name": "osx" } }
                ]
            }
        ],
        "assetIndex": {
            "id": "24",
            "url": "https://example.com/24.json",
            "sha1": "a9993e364706816aba3e25717850c26c9cd0d89d",
            "totalSize": 1000
        },
        "mainClass": "net.minecraft.client.main.Main"
    }"#;

    #[test]
    fn test_unknown_rule_action_is_rejected() {
        assert!(serde_json::from_str::<Manifest>(MANIFEST_JSON).is_err());
    }

    #[test]
    fn test_manifest_parsing() {
        let json = MANIFEST_JSON.replace("disallow_unknown_is_rejected", "deny");
        let manifest: Manifest = serde_json::from_str(&json).unwrap();

        assert_eq!(manifest.id, "1.21.5");
        assert_eq!(manifest.asset_index.id, "24");
        assert!(manifest.downloads.client.sha1.is_some());

        let lib = &manifest.libraries[0];
        let rules = lib.rules.as_ref().unwrap();
        assert_eq!(rules[0], Rule::unconditional(RuleAction::Allow));
        assert_eq!(rules[1], Rule::for_os(RuleAction::Deny, "osx"));

        let native = &lib.downloads.classifiers["natives-linux"];
        assert!(native.sha1.is_none());
    }

    #[test]
    fn test_missing_required_keys() {
        let no_client = r#"{"id":"x","downloads":{},"assetIndex":{"id":"1","url":"u"}}"#;
        assert!(serde_json::from_str::<Manifest>(no_client).is_err());

        let no_asset_index = r#"{"id":"x","downloads":{"client":{"url":"u"}}}"#;
        assert!(serde_json::from_str::<Manifest>(no_asset_index).is_err());

        let artifact_without_path = r#"{"id":"x","downloads":{"client":{"url":"u"}},
            "assetIndex":{"id":"1","url":"u"},
            "libraries":[{"name":"a","downloads":{"artifact":{"url":"u"}}}]}"#;
        assert!(serde_json::from_str::<Manifest>(artifact_without_path).is_err());

        assert!(serde_json::from_str::<AssetIndex>(r#"{"map_to_resources":true}"#).is_err());
    }

    #[test]
    fn test_disallow_reads_as_deny() {
        let rule: Rule = serde_json::from_str(r#"{"action":"disallow"}"#).unwrap();
        assert_eq!(rule.action, RuleAction::Deny);
    }

    #[test]
    fn test_library_without_downloads() {
        let json = r#"{"name":"some:lib:1.0"}"#;
        let lib: Library = serde_json::from_str(json).unwrap();
        assert!(lib.rules.is_none());
        assert!(lib.downloads.artifact.is_none());
        assert!(lib.downloads.classifiers.is_empty());
    }

    #[test]
    fn test_graphics_quality_parsing() {
        assert_eq!("LOW".parse::<GraphicsQuality>(), Ok(GraphicsQuality::Low));
        assert_eq!(" medium ".parse::<GraphicsQuality>(), Ok(GraphicsQuality::Medium));
        assert!("ultra".parse::<GraphicsQuality>().is_err());
        assert_eq!(GraphicsQuality::default(), GraphicsQuality::High);
        assert_eq!(GraphicsQuality::Low.to_string(), "low");
    }

    #[test]
    fn test_task_display_name() {
        let task = DownloadTask::new(
            "https://example.com/a/b.jar",
            "/tmp/libraries/a/b.jar",
            None,
            TaskKind::Library,
        );
        assert_eq!(task.display_name(), "b.jar");
        assert!(!task.is_native());
    }
}
