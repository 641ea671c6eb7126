use std::path::Path;

use bytes::Bytes;
use cask_types::{AssetKind, CacheKey, Fingerprint};

use crate::error::{LoaderError, LoaderResult};

/// A decoded binary resource.
///
/// The payload is reference-counted, so cloning a resource out of a cache
/// does not copy its bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resource {
    kind: AssetKind,
    key: String,
    data: Bytes,
    /// `None` for placeholders.
    fingerprint: Option<Fingerprint>,
}

impl Resource {
    /// Decode raw file bytes. An empty file is not a valid resource.
    pub fn decode(
        kind: AssetKind,
        key: CacheKey,
        path: &Path,
        data: Vec<u8>,
    ) -> LoaderResult<Self> {
        if data.is_empty() {
            return Err(LoaderError::Decode {
                kind,
                path: path.to_path_buf(),
                reason: "file is empty".into(),
            });
        }
        let fingerprint = Fingerprint::of(&data);
        Ok(Self {
            kind,
            key: key.into(),
            data: Bytes::from(data),
            fingerprint: Some(fingerprint),
        })
    }

    /// The safe default handed out when a resource cannot be loaded.
    pub fn placeholder(kind: AssetKind, key: impl Into<String>) -> Self {
        Self {
            kind,
            key: key.into(),
            data: Bytes::new(),
            fingerprint: None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.fingerprint.is_none()
    }

    pub fn kind(&self) -> AssetKind {
        self.kind
    }

    /// The key this resource was requested under.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn fingerprint(&self) -> Option<Fingerprint> {
        self.fingerprint
    }
}
