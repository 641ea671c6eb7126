use serde::{Deserialize, Serialize};

/// How the stores treat entries that did not come from preloading.
///
/// The default keeps caches exactly as preloaded: a miss is served from disk
/// without being cached, and a save leaves the cached entry untouched until
/// the next preload.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CachePolicy {
    /// Insert what a cache miss loaded from disk. Entries inserted this way
    /// are marked [`Origin::OnDemand`](crate::Origin::OnDemand) and can be
    /// dropped again with `invalidate`.
    pub promote_on_miss: bool,
    /// Replace the cached document with the one just saved.
    pub refresh_on_save: bool,
}

impl CachePolicy {
    /// Cache whatever is loaded and keep saved documents current.
    pub fn promoting() -> Self {
        Self {
            promote_on_miss: true,
            refresh_on_save: true,
        }
    }
}
