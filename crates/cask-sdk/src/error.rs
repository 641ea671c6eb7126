use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("cannot read config {}: {reason}", path.display())]
    Config { path: PathBuf, reason: String },

    #[error("store error: {0}")]
    Store(#[from] cask_store::StoreError),

    #[error("migration error: {0}")]
    Migration(#[from] cask_migrate::MigrationError),
}

pub type SdkResult<T> = Result<T, SdkError>;
