use std::path::Path;

use cask_migrate::MigrationConfig;
use cask_store::CachePolicy;
use cask_types::ContentLayout;
use serde::{Deserialize, Serialize};

use crate::error::{SdkError, SdkResult};

/// Everything needed to construct a [`Content`](crate::Content) service.
///
/// ```toml
/// [layout]
/// root = "Content"
/// data_dir = "data"
///
/// [cache]
/// promote_on_miss = false
/// refresh_on_save = false
///
/// [migration]
/// enabled = true
/// levels_up = 2
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    pub layout: ContentLayout,
    pub cache: CachePolicy,
    pub migration: MigrationConfig,
}

impl ContentConfig {
    /// Default configuration rooted at `root`.
    pub fn with_root(root: impl AsRef<Path>) -> Self {
        Self {
            layout: ContentLayout::new(root.as_ref()),
            ..Default::default()
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Read a TOML config file. Missing keys take their defaults.
    pub fn load(path: &Path) -> SdkResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| SdkError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&text).map_err(|e| SdkError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}
