use cask_loader::{CodecError, DocumentKind, LoaderError};
use cask_types::TypeError;

/// Errors from cache operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Neither the cache nor the disk has the requested content.
    #[error("not found in cache or on disk: {key}")]
    NotFound { key: String },

    /// The entry exists but holds a different document kind.
    #[error("{key} holds <{found}>, requested <{}>", expected.tag())]
    TypeMismatch {
        key: String,
        expected: DocumentKind,
        found: String,
    },

    /// The caller-supplied key could not be normalized.
    #[error("invalid key: {0}")]
    InvalidKey(#[from] TypeError),

    /// Any other loader failure (decode, markup, I/O).
    #[error("loader error: {0}")]
    Loader(#[from] LoaderError),
}

impl StoreError {
    /// Lift a loader error, giving missing content and kind mismatches
    /// their own variants.
    pub(crate) fn from_loader(key: &str, err: LoaderError) -> Self {
        match err {
            LoaderError::NotFound { .. } => StoreError::NotFound { key: key.to_string() },
            LoaderError::Codec {
                source: CodecError::KindMismatch { expected, found },
                ..
            } => StoreError::TypeMismatch {
                key: key.to_string(),
                expected,
                found,
            },
            other => StoreError::Loader(other),
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
