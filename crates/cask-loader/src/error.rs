//! Error types for the loader crate.

use std::path::PathBuf;

use cask_types::{AssetKind, TypeError};

use crate::codec::CodecError;

/// Errors that can occur while loading or saving content.
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    /// The file does not exist on disk.
    #[error("content not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// The file exists but its bytes are not a usable resource.
    #[error("cannot decode {kind} at {}: {reason}", path.display())]
    Decode {
        kind: AssetKind,
        path: PathBuf,
        reason: String,
    },

    /// The document markup could not be read or written.
    #[error("document {}: {source}", path.display())]
    Codec {
        path: PathBuf,
        #[source]
        source: CodecError,
    },

    /// A discovered path or caller-supplied key could not become a cache key.
    #[error("invalid key: {0}")]
    Key(#[from] TypeError),

    /// I/O error from the content source.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LoaderError {
    /// Map an I/O error, turning `NotFound` into [`LoaderError::NotFound`].
    pub(crate) fn from_io(path: PathBuf, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            LoaderError::NotFound { path }
        } else {
            LoaderError::Io { path, source }
        }
    }

    /// Returns `true` if the content was missing on disk.
    pub fn is_not_found(&self) -> bool {
        matches!(self, LoaderError::NotFound { .. })
    }
}

/// Convenience alias for loader results.
pub type LoaderResult<T> = Result<T, LoaderError>;
