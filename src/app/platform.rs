//! Host platform detection and native classifier selection
//!
//! Platform names appearing in manifest rules are aliased through a small
//! static table, which also carries the classifier key used to pick native
//! bundles and the markers used to decide whether a downloaded native archive
//! belongs to the running machine.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{PipelineError, PipelineResult};

/// Desktop platform family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Windows,
    Linux,
    MacOS,
}

/// CPU architecture relevant to native selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    X86_64,
    Aarch64,
    Other,
}

/// Static description of one platform family
#[derive(Debug)]
struct PlatformEntry {
    platform: Platform,
    /// Names accepted in rule `os.name` constraints
    aliases: &'static [&'static str],
    /// Classifier key selecting the native bundle
    classifier_key: &'static str,
    /// Substrings identifying native archives for this family
    native_markers: &'static [&'static str],
}

static PLATFORM_TABLE: &[PlatformEntry] = &[
    PlatformEntry {
        platform: Platform::Windows,
        aliases: &["windows", "win"],
        classifier_key: "natives-windows",
        native_markers: &["natives-windows"],
    },
    PlatformEntry {
        platform: Platform::Linux,
        aliases: &["linux", "unix"],
        classifier_key: "natives-linux",
        native_markers: &["natives-linux"],
    },
    PlatformEntry {
        platform: Platform::MacOS,
        aliases: &["osx", "mac", "macos", "darwin"],
        classifier_key: "natives-osx",
        native_markers: &["natives-osx", "natives-macos"],
    },
];

/// Classifier preferred on Apple silicon
const MACOS_ARM64_CLASSIFIER: &str = "natives-macos-arm64";
const MACOS_ARM64_MARKERS: &[&str] = &["natives-macos-arm64", "natives-macos-patch"];

impl Platform {
    fn entry(self) -> &'static PlatformEntry {
        // Every variant has exactly one row
        PLATFORM_TABLE
            .iter()
            .find(|e| e.platform == self)
            .unwrap_or(&PLATFORM_TABLE[0])
    }

    /// Resolve a platform from any accepted alias (case insensitive)
    pub fn from_alias(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        PLATFORM_TABLE
            .iter()
            .find(|e| e.aliases.contains(&name.as_str()))
            .map(|e| e.platform)
    }

    /// Classifier key of the generic native bundle
    pub fn classifier_key(self) -> &'static str {
        self.entry().classifier_key
    }

    /// All alias names for this platform
    pub fn aliases(self) -> &'static [&'static str] {
        self.entry().aliases
    }

    /// Parse from `std::env::consts::OS`
    pub fn from_os_str(os: &str) -> PipelineResult<Self> {
        match os {
            "windows" => Ok(Platform::Windows),
            "linux" => Ok(Platform::Linux),
            "macos" => Ok(Platform::MacOS),
            other => Self::from_alias(other).ok_or_else(|| PipelineError::UnsupportedPlatform {
                os: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Platform::Windows => "windows",
            Platform::Linux => "linux",
            Platform::MacOS => "macos",
        };
        write!(f, "{}", name)
    }
}

impl Arch {
    /// Parse from `std::env::consts::ARCH`
    pub fn from_arch_str(arch: &str) -> Self {
        match arch {
            "x86_64" => Arch::X86_64,
            "aarch64" => Arch::Aarch64,
            _ => Arch::Other,
        }
    }
}

/// The machine the pipeline runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostPlatform {
    pub platform: Platform,
    pub arch: Arch,
}

impl HostPlatform {
    pub fn new(platform: Platform, arch: Arch) -> Self {
        Self { platform, arch }
    }

    /// Detect the running platform
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::UnsupportedPlatform` outside the three desktop families
    pub fn current() -> PipelineResult<Self> {
        Ok(Self {
            platform: Platform::from_os_str(std::env::consts::OS)?,
            arch: Arch::from_arch_str(std::env::consts::ARCH),
        })
    }

    fn is_apple_silicon(&self) -> bool {
        self.platform == Platform::MacOS && self.arch == Arch::Aarch64
    }

    /// Classifier keys in order of preference
    ///
    /// A library contributes at most one native task: the first key in this
    /// list that it declares.
    pub fn classifier_preference(&self) -> Vec<&'static str> {
        if self.is_apple_silicon() {
            vec![MACOS_ARM64_CLASSIFIER, self.platform.classifier_key()]
        } else {
            vec![self.platform.classifier_key()]
        }
    }

    /// Whether a rule's `os.name` refers to this platform
    pub fn matches_os_name(&self, name: &str) -> bool {
        Platform::from_alias(name) == Some(self.platform)
    }

    /// Whether a downloaded archive is a native bundle for this machine
    pub fn is_compatible_native(&self, archive: &Path) -> bool {
        let name = archive.to_string_lossy().to_ascii_lowercase();

        if self.is_apple_silicon() && MACOS_ARM64_MARKERS.iter().any(|m| name.contains(m)) {
            return true;
        }

        self.platform
            .entry()
            .native_markers
            .iter()
            .any(|m| name.contains(m))
    }
}

impl fmt::Display for HostPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{:?}", self.platform, self.arch)
    }
}
