use std::collections::HashMap;
use std::sync::RwLock;

use cask_loader::{Loader, Resource};
use cask_types::{AssetKind, CacheKey};
use tracing::{debug, error, info};

use crate::error::{StoreError, StoreResult};
use crate::policy::CachePolicy;
use crate::report::{self, PreloadReport, SkippedFile};

/// Where a cached resource came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Origin {
    Preloaded,
    OnDemand,
}

/// A cached resource.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetEntry {
    pub resource: Resource,
    pub origin: Origin,
}

type Cache = RwLock<HashMap<CacheKey, AssetEntry>>;

/// Typed caches for binary resources, one per [`AssetKind`].
pub struct AssetStore {
    loader: Loader,
    policy: CachePolicy,
    fonts: Cache,
    sprites: Cache,
    effects: Cache,
}

impl AssetStore {
    /// An empty store. Call [`preload_all`](Self::preload_all) to fill it.
    pub fn new(loader: Loader, policy: CachePolicy) -> Self {
        Self {
            loader,
            policy,
            fonts: RwLock::new(HashMap::new()),
            sprites: RwLock::new(HashMap::new()),
            effects: RwLock::new(HashMap::new()),
        }
    }

    fn cache(&self, kind: AssetKind) -> &Cache {
        match kind {
            AssetKind::Font => &self.fonts,
            AssetKind::Sprite => &self.sprites,
            AssetKind::Effect => &self.effects,
        }
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    // ---------------------------------------------------------------
    // Preloading
    // ---------------------------------------------------------------

    /// Walk every kind's root and replace each cache with what was found.
    pub fn preload_all(&self) -> PreloadReport {
        let mut report = PreloadReport::default();
        for kind in AssetKind::ALL {
            report.merge(self.preload_kind(kind));
        }
        report
    }

    /// Walk one kind's root and replace its cache.
    ///
    /// If the root cannot be listed the existing cache is kept.
    pub fn preload_kind(&self, kind: AssetKind) -> PreloadReport {
        let mut report = PreloadReport::default();

        let found = match self.loader.discover_assets(kind) {
            Ok(found) => found,
            Err(e) => {
                error!("cannot list {} root: {}", kind, e);
                report.unreadable_roots.push(SkippedFile {
                    path: self.loader.layout().kind_root(kind),
                    reason: e.to_string(),
                });
                return report;
            }
        };

        let loaded = report::load_all(
            found,
            |item| self.loader.load_discovered_binary(kind, item),
            &mut report,
        );
        let fresh: HashMap<CacheKey, AssetEntry> = loaded
            .into_iter()
            .map(|(key, resource)| {
                (
                    key,
                    AssetEntry {
                        resource,
                        origin: Origin::Preloaded,
                    },
                )
            })
            .collect();

        info!(
            "preloaded {} {}(s), {} skipped, {} duplicate(s)",
            fresh.len(),
            kind,
            report.skipped.len(),
            report.duplicates.len()
        );
        *self.cache(kind).write().expect("lock poisoned") = fresh;
        report
    }

    // ---------------------------------------------------------------
    // Lookup
    // ---------------------------------------------------------------

    /// Fetch a resource, from the cache if present, otherwise from disk.
    pub fn try_get(&self, kind: AssetKind, key: &str) -> StoreResult<Resource> {
        let key = CacheKey::new(key)?;

        if let Some(entry) = self.cache(kind).read().expect("lock poisoned").get(&key) {
            debug!("{} cache hit {:?}", kind, key.as_str());
            return Ok(entry.resource.clone());
        }

        debug!("{} cache miss {:?}, loading from disk", kind, key.as_str());
        let resource = self
            .loader
            .load_binary(kind, &key)
            .map_err(|e| StoreError::from_loader(key.as_str(), e))?;

        if self.policy.promote_on_miss {
            self.cache(kind)
                .write()
                .expect("lock poisoned")
                .entry(key)
                .or_insert_with(|| AssetEntry {
                    resource: resource.clone(),
                    origin: Origin::OnDemand,
                });
        }
        Ok(resource)
    }

    /// Fetch a resource. Never fails: content missing from both cache and
    /// disk yields a placeholder (and trips a debug assertion).
    pub fn get(&self, kind: AssetKind, key: &str) -> Resource {
        match self.try_get(kind, key) {
            Ok(resource) => resource,
            Err(e) => {
                error!("{} {:?} unavailable, using placeholder: {}", kind, key, e);
                debug_assert!(false, "{kind} {key:?} unavailable: {e}");
                Resource::placeholder(kind, key)
            }
        }
    }

    /// The cached entry for `key`, without falling back to disk.
    pub fn entry(&self, kind: AssetKind, key: &str) -> Option<AssetEntry> {
        let key = CacheKey::new(key).ok()?;
        self.cache(kind).read().expect("lock poisoned").get(&key).cloned()
    }

    pub fn contains(&self, kind: AssetKind, key: &str) -> bool {
        self.entry(kind, key).is_some()
    }

    /// Drop one cached entry. Returns `true` if it was present.
    pub fn invalidate(&self, kind: AssetKind, key: &str) -> bool {
        let Ok(key) = CacheKey::new(key) else {
            return false;
        };
        self.cache(kind)
            .write()
            .expect("lock poisoned")
            .remove(&key)
            .is_some()
    }

    /// Number of cached entries of `kind`.
    pub fn len(&self, kind: AssetKind) -> usize {
        self.cache(kind).read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        AssetKind::ALL.into_iter().all(|kind| self.len(kind) == 0)
    }

    /// Sorted keys cached for `kind`.
    pub fn keys(&self, kind: AssetKind) -> Vec<CacheKey> {
        let mut keys: Vec<CacheKey> = self
            .cache(kind)
            .read()
            .expect("lock poisoned")
            .keys()
            .cloned()
            .collect();
        keys.sort();
        keys
    }
}

impl std::fmt::Debug for AssetStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetStore")
            .field("fonts", &self.len(AssetKind::Font))
            .field("sprites", &self.len(AssetKind::Sprite))
            .field("effects", &self.len(AssetKind::Effect))
            .field("policy", &self.policy)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cask_loader::{ContentSource, CountingSource, DiskSource};
    use cask_types::ContentLayout;
    use std::fs;
    use std::path::Path;
    use std::sync::Arc;
    use tempfile::TempDir;

    struct Fixture {
        dir: TempDir,
        source: Arc<CountingSource<DiskSource>>,
        store: AssetStore,
    }

    fn fixture(policy: CachePolicy) -> Fixture {
        let dir = TempDir::new().unwrap();
        let source = Arc::new(CountingSource::new(DiskSource));
        let loader = Loader::new(
            ContentLayout::new(dir.path()),
            source.clone() as Arc<dyn ContentSource>,
        );
        Fixture {
            dir,
            source,
            store: AssetStore::new(loader, policy),
        }
    }

    fn write(root: &Path, rel: &str, data: &[u8]) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, data).unwrap();
    }

    // -----------------------------------------------------------------------
    // Preload
    // -----------------------------------------------------------------------

    #[test]
    fn preload_keys_strip_root_and_extension() {
        let fx = fixture(CachePolicy::default());
        write(fx.dir.path(), "fonts/A.bin", b"font-a");
        write(fx.dir.path(), "fonts/Sub/B.bin", b"font-b");

        let report = fx.store.preload_all();
        assert!(report.is_clean());
        assert_eq!(report.loaded, 2);

        let keys: Vec<String> = fx.store.keys(AssetKind::Font).iter().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["A", "Sub/B"]);
        assert_eq!(fx.store.get(AssetKind::Font, "A").data().as_ref(), b"font-a");
        assert_eq!(fx.store.get(AssetKind::Font, "Sub/B").data().as_ref(), b"font-b");
    }

    #[test]
    fn preload_one_entry_per_file_per_kind() {
        let fx = fixture(CachePolicy::default());
        write(fx.dir.path(), "fonts/UI/Cursor.bin", b"f");
        write(fx.dir.path(), "sprites/UI/Cursor.bin", b"s");
        write(fx.dir.path(), "sprites/Logo.bin", b"l");
        write(fx.dir.path(), "effects/Light.bin", b"e");

        fx.store.preload_all();
        assert_eq!(fx.store.len(AssetKind::Font), 1);
        assert_eq!(fx.store.len(AssetKind::Sprite), 2);
        assert_eq!(fx.store.len(AssetKind::Effect), 1);
        assert!(fx.store.contains(AssetKind::Font, "UI/Cursor"));
        assert_eq!(fx.store.get(AssetKind::Sprite, "UI/Cursor").data().as_ref(), b"s");
    }

    #[test]
    fn preload_is_idempotent() {
        let fx = fixture(CachePolicy::default());
        write(fx.dir.path(), "sprites/A.bin", b"a");
        write(fx.dir.path(), "sprites/Deep/B.bin", b"b");

        fx.store.preload_all();
        let first: Vec<_> = fx
            .store
            .keys(AssetKind::Sprite)
            .into_iter()
            .map(|k| (k.clone(), fx.store.entry(AssetKind::Sprite, k.as_str()).unwrap()))
            .collect();

        fx.store.preload_all();
        let second: Vec<_> = fx
            .store
            .keys(AssetKind::Sprite)
            .into_iter()
            .map(|k| (k.clone(), fx.store.entry(AssetKind::Sprite, k.as_str()).unwrap()))
            .collect();

        assert_eq!(first, second);
    }

    #[test]
    fn preload_replaces_previous_contents() {
        let fx = fixture(CachePolicy::default());
        write(fx.dir.path(), "sprites/Old.bin", b"old");
        fx.store.preload_all();
        assert!(fx.store.contains(AssetKind::Sprite, "Old"));

        fs::remove_file(fx.dir.path().join("sprites/Old.bin")).unwrap();
        write(fx.dir.path(), "sprites/New.bin", b"new");
        fx.store.preload_all();
        assert!(!fx.store.contains(AssetKind::Sprite, "Old"));
        assert!(fx.store.contains(AssetKind::Sprite, "New"));
    }

    #[test]
    fn broken_file_is_skipped_rest_of_batch_loads() {
        let fx = fixture(CachePolicy::default());
        write(fx.dir.path(), "sprites/Empty.bin", b"");
        write(fx.dir.path(), "sprites/Good.bin", b"ok");
        write(fx.dir.path(), "effects/Light.bin", b"fx");

        let report = fx.store.preload_all();
        assert_eq!(report.skipped.len(), 1);
        assert!(report.skipped[0].path.ends_with("Empty.bin"));
        assert!(fx.store.contains(AssetKind::Sprite, "Good"));
        assert!(fx.store.contains(AssetKind::Effect, "Light"));
    }

    #[test]
    fn case_variant_files_collapse_first_wins() {
        let fx = fixture(CachePolicy::default());
        write(fx.dir.path(), "sprites/Tile.BIN", b"upper");
        write(fx.dir.path(), "sprites/Tile.bin", b"lower");

        let report = fx.store.preload_all();
        assert_eq!(fx.store.len(AssetKind::Sprite), 1);
        assert_eq!(report.duplicates.len(), 1);
        // Walk order is sorted by file name; "Tile.BIN" < "Tile.bin".
        assert_eq!(fx.store.get(AssetKind::Sprite, "Tile").data().as_ref(), b"upper");
    }

    #[test]
    fn preloaded_entries_are_marked() {
        let fx = fixture(CachePolicy::default());
        write(fx.dir.path(), "effects/Light.bin", b"fx");
        fx.store.preload_all();
        assert_eq!(
            fx.store.entry(AssetKind::Effect, "Light").unwrap().origin,
            Origin::Preloaded
        );
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    #[test]
    fn cache_hit_reads_nothing() {
        let fx = fixture(CachePolicy::default());
        write(fx.dir.path(), "sprites/UI/Cursor.bin", b"cursor");
        fx.store.preload_all();
        fx.source.reset();

        fx.store.get(AssetKind::Sprite, "UI/Cursor");
        fx.store.get(AssetKind::Sprite, "UI\\Cursor");
        assert_eq!(fx.source.stats().reads, 0);
    }

    #[test]
    fn miss_reads_disk_once_and_is_not_cached() {
        let fx = fixture(CachePolicy::default());
        fx.store.preload_all();
        write(fx.dir.path(), "sprites/Late.bin", b"late");
        fx.source.reset();

        let res = fx.store.get(AssetKind::Sprite, "Late");
        assert_eq!(res.data().as_ref(), b"late");
        assert_eq!(fx.source.stats().reads, 1);
        assert!(!fx.store.contains(AssetKind::Sprite, "Late"));

        fx.store.get(AssetKind::Sprite, "Late");
        assert_eq!(fx.source.stats().reads, 2);
    }

    #[test]
    fn miss_is_promoted_when_policy_allows() {
        let fx = fixture(CachePolicy::promoting());
        fx.store.preload_all();
        write(fx.dir.path(), "sprites/Late.bin", b"late");
        fx.source.reset();

        fx.store.get(AssetKind::Sprite, "Late");
        fx.store.get(AssetKind::Sprite, "Late");
        assert_eq!(fx.source.stats().reads, 1);
        assert_eq!(
            fx.store.entry(AssetKind::Sprite, "Late").unwrap().origin,
            Origin::OnDemand
        );

        assert!(fx.store.invalidate(AssetKind::Sprite, "Late"));
        fx.store.get(AssetKind::Sprite, "Late");
        assert_eq!(fx.source.stats().reads, 2);
    }

    #[test]
    fn try_get_missing_everywhere_is_not_found() {
        let fx = fixture(CachePolicy::default());
        let err = fx.store.try_get(AssetKind::Font, "Nope").unwrap_err();
        assert!(matches!(err, StoreError::NotFound { ref key } if key == "Nope"));
    }

    #[test]
    fn try_get_rejects_invalid_key() {
        let fx = fixture(CachePolicy::default());
        let err = fx.store.try_get(AssetKind::Font, "../escape").unwrap_err();
        assert!(matches!(err, StoreError::InvalidKey(_)));
    }

    #[test]
    fn kinds_are_independent() {
        let fx = fixture(CachePolicy::default());
        write(fx.dir.path(), "fonts/Shared.bin", b"font");
        fx.store.preload_all();
        assert!(fx.store.contains(AssetKind::Font, "Shared"));
        assert!(!fx.store.contains(AssetKind::Sprite, "Shared"));
        assert!(fx.store.try_get(AssetKind::Sprite, "Shared").is_err());
    }

    #[test]
    fn invalidate_unknown_key_is_false() {
        let fx = fixture(CachePolicy::default());
        assert!(!fx.store.invalidate(AssetKind::Font, "Nope"));
        assert!(fx.store.is_empty());
    }
}
