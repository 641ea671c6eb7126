//! High-level SDK for cask.
//!
//! [`Content`] is the service the rest of the engine holds a reference to.
//! It owns the loader, both stores and the migration step, and runs them in
//! startup order.

pub mod config;
pub mod content;
pub mod error;

pub use config::ContentConfig;
pub use content::{Content, StartupReport};
pub use error::{SdkError, SdkResult};

// Re-export key types
pub use cask_loader::{
    ContentSource, CountingSource, DataDocument, DiskSource, Document, DocumentKind,
    GameObjectData, ItemList, OptionsData, Resource, ScreenData,
};
pub use cask_migrate::{MigrationConfig, MigrationOutcome, MigrationState, MoveFailure};
pub use cask_store::{CachePolicy, PreloadReport, StoreError};
pub use cask_types::{AssetKind, CacheKey, ContentLayout, Fingerprint};
