//! On-disk layout of the game directory
//!
//! ```text
//! <base>/.minecraft/
//!   manifest/{version}.json
//!   client.jar
//!   libraries/<artifact path>
//!   natives/
//!   assets/indexes/{id}.json
//!   assets/objects/{hash[0:2]}/{hash}
//! ```

use std::path::{Path, PathBuf};

use crate::app::hash::Sha1Hash;
use crate::constants::layout;

/// Path helpers rooted at the game directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameLayout {
    game_dir: PathBuf,
}

impl GameLayout {
    /// Layout below `<base_dir>/.minecraft`
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            game_dir: base_dir.as_ref().join(layout::GAME_DIR),
        }
    }

    pub fn game_dir(&self) -> &Path {
        &self.game_dir
    }

    pub fn manifest_path(&self, version_id: &str) -> PathBuf {
        self.game_dir
            .join(layout::MANIFEST_DIR)
            .join(format!("{}.json", version_id))
    }

    pub fn client_jar(&self) -> PathBuf {
        self.game_dir.join(layout::CLIENT_JAR)
    }

    pub fn libraries_dir(&self) -> PathBuf {
        self.game_dir.join(layout::LIBRARIES_DIR)
    }

    /// Library file at its manifest-declared relative path
    pub fn library_path(&self, relative: &str) -> PathBuf {
        let mut path = self.libraries_dir();
        path.extend(relative.split('/').filter(|s| !s.is_empty() && *s != ".."));
        path
    }

    pub fn natives_dir(&self) -> PathBuf {
        self.game_dir.join(layout::NATIVES_DIR)
    }

    pub fn assets_dir(&self) -> PathBuf {
        self.game_dir.join(layout::ASSETS_DIR)
    }

    pub fn asset_index_path(&self, index_id: &str) -> PathBuf {
        self.assets_dir()
            .join(layout::INDEXES_DIR)
            .join(format!("{}.json", index_id))
    }

    /// Content-addressed object path
    pub fn object_path(&self, hash: &Sha1Hash) -> PathBuf {
        self.assets_dir()
            .join(layout::OBJECTS_DIR)
            .join(hash.prefix())
            .join(hash.to_hex())
    }
}
