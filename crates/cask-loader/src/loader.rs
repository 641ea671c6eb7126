//! The stateless loader.
//!
//! [`Loader`] maps cache keys to paths under the [`ContentLayout`], reads and
//! decodes them through a [`ContentSource`], and walks each kind's root to
//! discover what a preload should pick up. It holds no cached content.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use cask_types::{AssetKind, CacheKey, ContentLayout};
use tracing::{debug, error, warn};

use crate::codec;
use crate::document::{DataDocument, Document};
use crate::error::{LoaderError, LoaderResult};
use crate::resource::Resource;
use crate::source::{ContentSource, DiskSource};

/// A file found by discovery, with the key it will be cached under.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Discovered {
    pub key: CacheKey,
    pub path: PathBuf,
}

/// Disk I/O and (de)serialization for every kind of content.
#[derive(Clone)]
pub struct Loader {
    layout: ContentLayout,
    source: Arc<dyn ContentSource>,
}

impl std::fmt::Debug for Loader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Loader")
            .field("root", &self.layout.root)
            .finish()
    }
}

impl Loader {
    pub fn new(layout: ContentLayout, source: Arc<dyn ContentSource>) -> Self {
        Self { layout, source }
    }

    /// A loader reading the real filesystem.
    pub fn on_disk(layout: ContentLayout) -> Self {
        Self::new(layout, Arc::new(DiskSource))
    }

    pub fn layout(&self) -> &ContentLayout {
        &self.layout
    }

    // ---------------------------------------------------------------
    // Binary resources
    // ---------------------------------------------------------------

    /// Load one binary resource by key.
    pub fn load_binary(&self, kind: AssetKind, key: &CacheKey) -> LoaderResult<Resource> {
        let path = self.layout.asset_path(kind, key);
        self.load_binary_at(kind, key.clone(), &path)
    }

    /// Load one binary resource, substituting a placeholder on failure.
    ///
    /// Missing binary content is a packaging defect, not a runtime condition,
    /// so this never fails. Debug builds assert instead of substituting.
    pub fn load_binary_or_default(&self, kind: AssetKind, key: &CacheKey) -> Resource {
        match self.load_binary(kind, key) {
            Ok(resource) => resource,
            Err(e) => {
                error!("{} {:?} unavailable, using placeholder: {}", kind, key.as_str(), e);
                debug_assert!(false, "{kind} {key} unavailable: {e}");
                Resource::placeholder(kind, key.as_str())
            }
        }
    }

    fn load_binary_at(&self, kind: AssetKind, key: CacheKey, path: &Path) -> LoaderResult<Resource> {
        let data = self
            .source
            .read(path)
            .map_err(|e| LoaderError::from_io(path.to_path_buf(), e))?;
        debug!("read {} {:?} ({} bytes)", kind, key.as_str(), data.len());
        Resource::decode(kind, key, path, data)
    }

    /// Load a discovered binary file.
    pub fn load_discovered_binary(&self, kind: AssetKind, found: &Discovered) -> LoaderResult<Resource> {
        self.load_binary_at(kind, found.key.clone(), &found.path)
    }

    // ---------------------------------------------------------------
    // Documents
    // ---------------------------------------------------------------

    /// Load a document of a known kind.
    ///
    /// If the file is missing and `create_if_missing` is set, a default
    /// document is returned and nothing is written. If it is missing and the
    /// flag is not set, the content is incomplete and `NotFound` is returned.
    pub fn load_document<T: DataDocument>(
        &self,
        key: &CacheKey,
        create_if_missing: bool,
    ) -> LoaderResult<T> {
        let path = self.layout.document_path(key);
        match self.read_text(&path) {
            Ok(text) => codec::decode::<T>(&text).map_err(|source| LoaderError::Codec { path, source }),
            Err(e) if e.is_not_found() && create_if_missing => {
                debug!("document {:?} missing, creating default {}", key.as_str(), T::KIND);
                Ok(T::default())
            }
            Err(e) => {
                if e.is_not_found() {
                    error!("document {:?} does not exist", key.as_str());
                }
                Err(e)
            }
        }
    }

    /// Load a document of whatever kind the file holds.
    pub fn load_any_document(&self, key: &CacheKey) -> LoaderResult<Document> {
        let path = self.layout.document_path(key);
        self.load_any_document_at(&path)
    }

    /// Load a discovered document file.
    pub fn load_discovered_document(&self, found: &Discovered) -> LoaderResult<Document> {
        self.load_any_document_at(&found.path)
    }

    fn load_any_document_at(&self, path: &Path) -> LoaderResult<Document> {
        let text = self.read_text(path)?;
        codec::decode_any(&text).map_err(|source| LoaderError::Codec {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Serialize a document and overwrite its file.
    pub fn save_document<T: DataDocument>(&self, document: &T, key: &CacheKey) -> LoaderResult<()> {
        let path = self.layout.document_path(key);
        let text = codec::encode(document).map_err(|source| LoaderError::Codec {
            path: path.clone(),
            source,
        })?;
        self.source
            .write(&path, text.as_bytes())
            .map_err(|source| LoaderError::Io {
                path: path.clone(),
                source,
            })?;
        debug!("saved {} to {:?}", T::KIND, key.as_str());
        Ok(())
    }

    fn read_text(&self, path: &Path) -> LoaderResult<String> {
        let data = self
            .source
            .read(path)
            .map_err(|e| LoaderError::from_io(path.to_path_buf(), e))?;
        String::from_utf8(data).map_err(|e| LoaderError::Codec {
            path: path.to_path_buf(),
            source: codec::CodecError::Xml(e.to_string()),
        })
    }

    // ---------------------------------------------------------------
    // Discovery
    // ---------------------------------------------------------------

    /// Every file of `kind` under its root, keyed without extension.
    pub fn discover_assets(&self, kind: AssetKind) -> LoaderResult<Vec<Discovered>> {
        let ext = self.layout.extension(kind);
        self.discover(&self.layout.kind_root(kind), ext, Some(ext))
    }

    /// Every document under the document root, keyed with extension.
    pub fn discover_documents(&self) -> LoaderResult<Vec<Discovered>> {
        self.discover(&self.layout.data_root(), &self.layout.data_extension, None)
    }

    fn discover(
        &self,
        root: &Path,
        extension: &str,
        strip_extension: Option<&str>,
    ) -> LoaderResult<Vec<Discovered>> {
        let files = self
            .source
            .list(root, extension)
            .map_err(|source| LoaderError::Io {
                path: root.to_path_buf(),
                source,
            })?;

        let mut found = Vec::with_capacity(files.len());
        for path in files {
            let Ok(relative) = path.strip_prefix(root) else {
                warn!("{:?} is outside {:?}, skipping", path, root);
                continue;
            };
            match CacheKey::from_relative_path(relative, strip_extension) {
                Ok(key) => found.push(Discovered { key, path }),
                Err(e) => warn!("skipping {:?}: {}", path, e),
            }
        }
        Ok(found)
    }
}
