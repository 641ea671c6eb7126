use std::collections::HashMap;
use std::sync::RwLock;

use cask_loader::{DataDocument, Document, DocumentKind, Loader};
use cask_types::CacheKey;
use tracing::{debug, error, info};

use crate::error::{StoreError, StoreResult};
use crate::policy::CachePolicy;
use crate::report::{self, PreloadReport, SkippedFile};

/// A single cache of structured documents of every kind, keyed by path
/// relative to the document root (extension included).
pub struct DataStore {
    loader: Loader,
    policy: CachePolicy,
    documents: RwLock<HashMap<CacheKey, Document>>,
}

impl DataStore {
    pub fn new(loader: Loader, policy: CachePolicy) -> Self {
        Self {
            loader,
            policy,
            documents: RwLock::new(HashMap::new()),
        }
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    /// Walk the document root and replace the cache with what was found.
    pub fn preload_all(&self) -> PreloadReport {
        let mut report = PreloadReport::default();

        let found = match self.loader.discover_documents() {
            Ok(found) => found,
            Err(e) => {
                error!("cannot list document root: {}", e);
                report.unreadable_roots.push(SkippedFile {
                    path: self.loader.layout().data_root(),
                    reason: e.to_string(),
                });
                return report;
            }
        };

        let fresh = report::load_all(
            found,
            |item| self.loader.load_discovered_document(item),
            &mut report,
        );
        info!(
            "preloaded {} document(s), {} skipped, {} duplicate(s)",
            fresh.len(),
            report.skipped.len(),
            report.duplicates.len()
        );
        *self.documents.write().expect("lock poisoned") = fresh;
        report
    }

    /// Fetch a document as `T`.
    ///
    /// A cached entry of another kind is a [`StoreError::TypeMismatch`]. On a
    /// miss the document is loaded from disk; see
    /// [`Loader::load_document`] for `create_if_missing`.
    pub fn get<T: DataDocument>(&self, key: &str, create_if_missing: bool) -> StoreResult<T> {
        let key = CacheKey::new(key)?;

        if let Some(document) = self.documents.read().expect("lock poisoned").get(&key) {
            debug!("document cache hit {:?}", key.as_str());
            return T::from_document(document)
                .cloned()
                .ok_or_else(|| StoreError::TypeMismatch {
                    key: key.to_string(),
                    expected: T::KIND,
                    found: document.kind().tag().to_string(),
                });
        }

        debug!("document cache miss {:?}, loading from disk", key.as_str());
        let document: T = self
            .loader
            .load_document(&key, create_if_missing)
            .map_err(|e| StoreError::from_loader(key.as_str(), e))?;

        if self.policy.promote_on_miss {
            self.documents
                .write()
                .expect("lock poisoned")
                .entry(key)
                .or_insert_with(|| document.clone().into_document());
        }
        Ok(document)
    }

    /// Every cached document of kind `T`. Order is unspecified.
    pub fn get_all_of_type<T: DataDocument>(&self) -> Vec<T> {
        self.documents
            .read()
            .expect("lock poisoned")
            .values()
            .filter_map(T::from_document)
            .cloned()
            .collect()
    }

    /// Every cached document of kind `T` with its key. Order is unspecified.
    pub fn get_all_pairs_of_type<T: DataDocument>(&self) -> Vec<(CacheKey, T)> {
        self.documents
            .read()
            .expect("lock poisoned")
            .iter()
            .filter_map(|(key, doc)| T::from_document(doc).map(|d| (key.clone(), d.clone())))
            .collect()
    }

    /// Write a document to disk.
    ///
    /// The cached entry for `key`, if any, is only replaced when the policy
    /// has `refresh_on_save`; otherwise reads keep returning the preloaded
    /// value until the next preload.
    pub fn save<T: DataDocument>(&self, document: &T, key: &str) -> StoreResult<()> {
        let key = CacheKey::new(key)?;
        self.loader.save_document(document, &key)?;

        if self.policy.refresh_on_save {
            self.documents
                .write()
                .expect("lock poisoned")
                .insert(key, document.clone().into_document());
        }
        Ok(())
    }

    /// Kind of the cached document at `key`, if cached.
    pub fn kind_of(&self, key: &str) -> Option<DocumentKind> {
        let key = CacheKey::new(key).ok()?;
        self.documents
            .read()
            .expect("lock poisoned")
            .get(&key)
            .map(Document::kind)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.kind_of(key).is_some()
    }

    /// Drop one cached document. Returns `true` if it was present.
    pub fn invalidate(&self, key: &str) -> bool {
        let Ok(key) = CacheKey::new(key) else {
            return false;
        };
        self.documents
            .write()
            .expect("lock poisoned")
            .remove(&key)
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.documents.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sorted keys of every cached document.
    pub fn keys(&self) -> Vec<CacheKey> {
        let mut keys: Vec<CacheKey> = self
            .documents
            .read()
            .expect("lock poisoned")
            .keys()
            .cloned()
            .collect();
        keys.sort();
        keys
    }
}

impl std::fmt::Debug for DataStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataStore")
            .field("documents", &self.len())
            .field("policy", &self.policy)
            .finish()
    }
}
