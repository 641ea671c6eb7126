use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// One file or directory that could not be moved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MoveFailure {
    pub from: PathBuf,
    pub to: PathBuf,
    pub reason: String,
}

impl fmt::Display for MoveFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}: {}", self.from.display(), self.to.display(), self.reason)
    }
}

/// Errors from migration.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// Some moves failed. Everything else was moved; the marker stays
    /// in progress so the next run retries.
    #[error("migration incomplete, {} move(s) failed", failures.len())]
    Partial { failures: Vec<MoveFailure> },

    /// The marker file exists but cannot be parsed.
    #[error("unreadable migration marker {}: {reason}", path.display())]
    Marker { path: PathBuf, reason: String },

    /// The marker was written by a newer build.
    #[error("migration marker version {found} is newer than supported {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result alias for migration operations.
pub type MigrationResult<T> = Result<T, MigrationError>;
