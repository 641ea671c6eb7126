use serde::{Deserialize, Serialize};

/// Configuration for the legacy document migration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationConfig {
    /// Skip migration entirely.
    pub enabled: bool,
    /// How many directories above the content root the search starts.
    pub levels_up: usize,
    /// Marker file name, created inside the content root.
    pub marker_file: String,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            levels_up: 2,
            marker_file: ".cask-migration.json".into(),
        }
    }
}
