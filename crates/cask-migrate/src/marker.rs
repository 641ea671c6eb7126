use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{MigrationError, MigrationResult};

/// Current marker format version.
pub const MARKER_VERSION: u32 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerStatus {
    InProgress,
    Complete,
}

/// Persisted migration progress.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    pub version: u32,
    pub status: MarkerStatus,
    /// Legacy directories already moved in full.
    #[serde(default)]
    pub moved: Vec<PathBuf>,
}

impl Marker {
    pub fn in_progress() -> Self {
        Self {
            version: MARKER_VERSION,
            status: MarkerStatus::InProgress,
            moved: Vec::new(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.status == MarkerStatus::Complete
    }

    /// Read the marker at `path`. `None` if there is none.
    pub fn load(path: &Path) -> MigrationResult<Option<Self>> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(MigrationError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let marker: Marker = serde_json::from_str(&text).map_err(|e| MigrationError::Marker {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        if marker.version > MARKER_VERSION {
            return Err(MigrationError::UnsupportedVersion {
                found: marker.version,
                supported: MARKER_VERSION,
            });
        }
        Ok(Some(marker))
    }

    pub fn store(&self, path: &Path) -> MigrationResult<()> {
        let io_err = |source| MigrationError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let text = serde_json::to_string_pretty(self).map_err(|e| MigrationError::Marker {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        fs::write(path, text).map_err(io_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_marker_is_none() {
        let dir = TempDir::new().unwrap();
        assert_eq!(Marker::load(&dir.path().join("m.json")).unwrap(), None);
    }

    #[test]
    fn store_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("m.json");
        let mut marker = Marker::in_progress();
        marker.moved.push("/old/data".into());
        marker.store(&path).unwrap();

        let loaded = Marker::load(&path).unwrap().unwrap();
        assert_eq!(loaded, marker);
        assert!(!loaded.is_complete());
    }

    #[test]
    fn status_is_snake_case_on_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("m.json");
        Marker::in_progress().store(&path).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("\"in_progress\""));
    }

    #[test]
    fn garbage_marker_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("m.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(Marker::load(&path), Err(MigrationError::Marker { .. })));
    }

    #[test]
    fn newer_marker_version_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("m.json");
        fs::write(&path, r#"{"version": 99, "status": "complete"}"#).unwrap();
        assert!(matches!(
            Marker::load(&path),
            Err(MigrationError::UnsupportedVersion { found: 99, .. })
        ));
    }
}
