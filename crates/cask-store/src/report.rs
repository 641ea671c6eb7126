use std::collections::HashMap;
use std::path::PathBuf;

use cask_loader::{Discovered, LoaderResult};
use cask_types::CacheKey;
use serde::Serialize;
use tracing::warn;

/// A file left out of a preload because it failed to load.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Two files that mapped to the same key. `kept` was discovered first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DuplicateKey {
    pub key: CacheKey,
    pub kept: PathBuf,
    pub dropped: PathBuf,
}

/// Outcome of a preload pass.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PreloadReport {
    /// Entries now in the cache.
    pub loaded: usize,
    pub skipped: Vec<SkippedFile>,
    pub duplicates: Vec<DuplicateKey>,
    /// Roots that could not be listed at all; their caches were left as they were.
    pub unreadable_roots: Vec<SkippedFile>,
}

impl PreloadReport {
    /// `true` when every discovered file made it into the cache.
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.duplicates.is_empty() && self.unreadable_roots.is_empty()
    }

    pub fn merge(&mut self, other: PreloadReport) {
        self.loaded += other.loaded;
        self.skipped.extend(other.skipped);
        self.duplicates.extend(other.duplicates);
        self.unreadable_roots.extend(other.unreadable_roots);
    }
}

/// Load every discovered file into a fresh map, first key wins.
pub(crate) fn load_all<V>(
    found: Vec<Discovered>,
    mut load: impl FnMut(&Discovered) -> LoaderResult<V>,
    report: &mut PreloadReport,
) -> HashMap<CacheKey, V> {
    let mut entries = HashMap::with_capacity(found.len());
    let mut origins: HashMap<CacheKey, PathBuf> = HashMap::with_capacity(found.len());

    for item in found {
        if let Some(kept) = origins.get(&item.key) {
            warn!(
                "duplicate key {:?}: keeping {:?}, dropping {:?}",
                item.key.as_str(),
                kept,
                item.path
            );
            report.duplicates.push(DuplicateKey {
                key: item.key.clone(),
                kept: kept.clone(),
                dropped: item.path.clone(),
            });
            continue;
        }

        match load(&item) {
            Ok(value) => {
                origins.insert(item.key.clone(), item.path.clone());
                entries.insert(item.key, value);
            }
            Err(e) => {
                warn!("skipping {:?}: {}", item.path, e);
                report.skipped.push(SkippedFile {
                    path: item.path,
                    reason: e.to_string(),
                });
            }
        }
    }

    report.loaded += entries.len();
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use cask_loader::LoaderError;

    fn found(key: &str, path: &str) -> Discovered {
        Discovered {
            key: CacheKey::new(key).unwrap(),
            path: PathBuf::from(path),
        }
    }

    #[test]
    fn first_occurrence_wins() {
        let mut report = PreloadReport::default();
        let map = load_all(
            vec![found("A", "fonts/A.bin"), found("A", "fonts/A.BIN")],
            |d| Ok(d.path.clone()),
            &mut report,
        );
        assert_eq!(map.len(), 1);
        assert_eq!(map[&CacheKey::new("A").unwrap()], PathBuf::from("fonts/A.bin"));
        assert_eq!(report.loaded, 1);
        assert_eq!(report.duplicates.len(), 1);
        assert_eq!(report.duplicates[0].dropped, PathBuf::from("fonts/A.BIN"));
    }

    #[test]
    fn failures_are_skipped_not_fatal() {
        let mut report = PreloadReport::default();
        let map = load_all(
            vec![found("Bad", "bad.bin"), found("Good", "good.bin")],
            |d| {
                if d.key.as_str() == "Bad" {
                    Err(LoaderError::NotFound { path: d.path.clone() })
                } else {
                    Ok(())
                }
            },
            &mut report,
        );
        assert_eq!(map.len(), 1);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].path, PathBuf::from("bad.bin"));
        assert!(!report.is_clean());
    }

    #[test]
    fn failed_first_file_does_not_shadow_later_one() {
        let mut report = PreloadReport::default();
        let mut calls = 0;
        let map = load_all(
            vec![found("A", "A.bin"), found("A", "A.BIN")],
            |_| {
                calls += 1;
                if calls == 1 {
                    Err(LoaderError::NotFound { path: PathBuf::from("A.bin") })
                } else {
                    Ok(calls)
                }
            },
            &mut report,
        );
        assert_eq!(map[&CacheKey::new("A").unwrap()], 2);
        assert!(report.duplicates.is_empty());
    }

    #[test]
    fn merge_accumulates() {
        let mut a = PreloadReport {
            loaded: 2,
            ..Default::default()
        };
        let b = PreloadReport {
            loaded: 3,
            skipped: vec![SkippedFile {
                path: "x".into(),
                reason: "empty".into(),
            }],
            ..Default::default()
        };
        a.merge(b);
        assert_eq!(a.loaded, 5);
        assert_eq!(a.skipped.len(), 1);
    }
}
