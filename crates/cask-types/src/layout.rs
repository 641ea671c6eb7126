use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::key::CacheKey;
use crate::kind::AssetKind;

/// Where each kind of content lives under the content root.
///
/// ```text
/// <root>/
///   fonts/    *.bin
///   sprites/  *.bin
///   effects/  *.bin
///   data/     *.xml   (documents)
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentLayout {
    /// The content root directory.
    pub root: PathBuf,
    pub fonts_dir: String,
    pub sprites_dir: String,
    pub effects_dir: String,
    /// Document root directory name. Also the name the legacy migration
    /// searches for.
    pub data_dir: String,
    pub font_extension: String,
    pub sprite_extension: String,
    pub effect_extension: String,
    pub data_extension: String,
}

impl Default for ContentLayout {
    fn default() -> Self {
        Self {
            root: PathBuf::from("Content"),
            fonts_dir: "fonts".into(),
            sprites_dir: "sprites".into(),
            effects_dir: "effects".into(),
            data_dir: "data".into(),
            font_extension: "bin".into(),
            sprite_extension: "bin".into(),
            effect_extension: "bin".into(),
            data_extension: "xml".into(),
        }
    }
}

impl ContentLayout {
    /// Default layout rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    pub fn dir_name(&self, kind: AssetKind) -> &str {
        match kind {
            AssetKind::Font => &self.fonts_dir,
            AssetKind::Sprite => &self.sprites_dir,
            AssetKind::Effect => &self.effects_dir,
        }
    }

    pub fn extension(&self, kind: AssetKind) -> &str {
        match kind {
            AssetKind::Font => &self.font_extension,
            AssetKind::Sprite => &self.sprite_extension,
            AssetKind::Effect => &self.effect_extension,
        }
    }

    /// Root directory scanned for `kind`.
    pub fn kind_root(&self, kind: AssetKind) -> PathBuf {
        self.root.join(self.dir_name(kind))
    }

    /// Root directory scanned for documents.
    pub fn data_root(&self) -> PathBuf {
        self.root.join(&self.data_dir)
    }

    /// On-disk location of a binary resource.
    pub fn asset_path(&self, kind: AssetKind, key: &CacheKey) -> PathBuf {
        self.kind_root(kind)
            .join(key.to_path_with_extension(self.extension(kind)))
    }

    /// On-disk location of a document. Document keys already carry their
    /// extension.
    pub fn document_path(&self, key: &CacheKey) -> PathBuf {
        self.data_root().join(key.to_relative_path())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}
