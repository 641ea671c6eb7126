use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid cache key {key:?}: {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("unknown asset kind: {0}")]
    UnknownKind(String),
}
