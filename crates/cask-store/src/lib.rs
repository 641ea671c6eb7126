//! Preloading content caches for cask.
//!
//! Two stores sit on top of the [`Loader`](cask_loader::Loader):
//!
//! - [`AssetStore`] -- one cache per binary kind (fonts, sprites, effects)
//! - [`DataStore`] -- a single cache of documents of every kind, narrowed to
//!   the requested concrete type on read
//!
//! # Contract
//!
//! 1. `preload_all` walks each root once and replaces the cache wholesale.
//!    A file that fails to load is skipped and reported; it never aborts the
//!    batch.
//! 2. Two files that collapse to one key: the first in walk order is kept,
//!    the other is reported as a [`DuplicateKey`].
//! 3. A cache hit never touches the disk.
//! 4. A miss falls back to the loader. Whether the result is then cached is
//!    decided by [`CachePolicy::promote_on_miss`].
//! 5. `DataStore::save` always writes through to disk. Whether the cached
//!    entry is replaced is decided by [`CachePolicy::refresh_on_save`].
//! 6. Reading a document as the wrong type is a [`StoreError::TypeMismatch`].

pub mod asset;
pub mod data;
pub mod error;
pub mod policy;
pub mod report;

pub use asset::{AssetEntry, AssetStore, Origin};
pub use data::DataStore;
pub use error::{StoreError, StoreResult};
pub use policy::CachePolicy;
pub use report::{DuplicateKey, PreloadReport, SkippedFile};
