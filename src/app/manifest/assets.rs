//! Asset categorization and quality filtering
//!
//! Each logical asset name is assigned to one category by substring and
//! extension markers (first matching category wins). Inclusion is then a
//! lookup in a declarative `(category, quality) -> predicate` table; every
//! predicate is a pure function over the lower-cased asset name.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::app::models::GraphicsQuality;

/// Asset category used for filtering and reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetCategory {
    Textures,
    Sounds,
    Music,
    Languages,
    Fonts,
    Models,
    Misc,
}

impl AssetCategory {
    pub const ALL: [AssetCategory; 7] = [
        Self::Textures,
        Self::Sounds,
        Self::Music,
        Self::Languages,
        Self::Fonts,
        Self::Models,
        Self::Misc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Textures => "textures",
            Self::Sounds => "sounds",
            Self::Music => "music",
            Self::Languages => "languages",
            Self::Fonts => "fonts",
            Self::Models => "models",
            Self::Misc => "misc",
        }
    }

    /// Classify a logical asset name
    pub fn classify(name: &str) -> Self {
        let name = name.to_ascii_lowercase();
        CATEGORY_MARKERS
            .iter()
            .find(|(_, markers)| markers.iter().any(|m| name.contains(m)))
            .map(|(category, _)| *category)
            .unwrap_or(Self::Misc)
    }
}

impl fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// Music precedes sounds: music files are also `.ogg` below `sounds/`
static CATEGORY_MARKERS: &[(AssetCategory, &[&str])] = &[
    (
        AssetCategory::Textures,
        &["textures/", ".png", ".jpg", ".jpeg", ".tga"],
    ),
    (
        AssetCategory::Music,
        &["music/", "records/", "sounds/music/", "sounds/records/"],
    ),
    (AssetCategory::Sounds, &["sounds/", ".ogg", ".mp3", ".wav"]),
    (AssetCategory::Languages, &["lang/", "texts/", "realms/lang/"]),
    (AssetCategory::Fonts, &["font/", "fonts/", "unicode/"]),
    (AssetCategory::Models, &["models/", ".json"]),
];

/// Pure inclusion test over a lower-cased asset name
pub type IncludePredicate = fn(&str) -> bool;

fn always(_: &str) -> bool {
    true
}

fn never(_: &str) -> bool {
    false
}

fn contains_none(name: &str, markers: &[&str]) -> bool {
    !markers.iter().any(|m| name.contains(m))
}

fn low_textures(name: &str) -> bool {
    contains_none(name, &["hd", "4k", "high", "normal", "rain", "detailed"])
}

fn low_sounds(name: &str) -> bool {
    contains_none(name, &["ambience", "ambient", "environment", "weather"])
}

fn low_languages(name: &str) -> bool {
    name.contains("en_us") || name.contains("es_")
}

fn low_models(name: &str) -> bool {
    name.contains("item") || name.contains("block")
}

fn medium_textures(name: &str) -> bool {
    contains_none(name, &["4k", "ultra", "parallax"])
}

fn medium_sounds(name: &str) -> bool {
    !name.contains("ambient/")
}

fn medium_music(name: &str) -> bool {
    name.contains("menu") || name.contains("game")
}

static QUALITY_TABLE: &[(AssetCategory, GraphicsQuality, IncludePredicate)] = &[
    (AssetCategory::Textures, GraphicsQuality::Low, low_textures),
    (AssetCategory::Sounds, GraphicsQuality::Low, low_sounds),
    (AssetCategory::Music, GraphicsQuality::Low, never),
    (AssetCategory::Languages, GraphicsQuality::Low, low_languages),
    (AssetCategory::Fonts, GraphicsQuality::Low, always),
    (AssetCategory::Models, GraphicsQuality::Low, low_models),
    (AssetCategory::Misc, GraphicsQuality::Low, always),
    (AssetCategory::Textures, GraphicsQuality::Medium, medium_textures),
    (AssetCategory::Sounds, GraphicsQuality::Medium, medium_sounds),
    (AssetCategory::Music, GraphicsQuality::Medium, medium_music),
    (AssetCategory::Languages, GraphicsQuality::Medium, always),
    (AssetCategory::Fonts, GraphicsQuality::Medium, always),
    (AssetCategory::Models, GraphicsQuality::Medium, always),
    (AssetCategory::Misc, GraphicsQuality::Medium, always),
];

/// Predicate for one table cell; cells not listed (all of `high`) include everything
pub fn include_predicate(category: AssetCategory, quality: GraphicsQuality) -> IncludePredicate {
    QUALITY_TABLE
        .iter()
        .find(|(c, q, _)| *c == category && *q == quality)
        .map(|(_, _, predicate)| *predicate)
        .unwrap_or(always)
}

/// Classify an asset and decide whether it is fetched at the given quality
pub fn should_download(name: &str, quality: GraphicsQuality) -> (AssetCategory, bool) {
    let category = AssetCategory::classify(name);
    let include = include_predicate(category, quality)(&name.to_ascii_lowercase());
    (category, include)
}
