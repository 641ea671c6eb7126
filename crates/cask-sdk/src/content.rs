use std::sync::Arc;

use cask_loader::{ContentSource, DataDocument, DiskSource, Loader, Resource};
use cask_migrate::{MigrationError, MigrationOutcome, MigrationService, MoveFailure};
use cask_store::{AssetStore, DataStore, PreloadReport};
use cask_types::{AssetKind, CacheKey, ContentLayout};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::ContentConfig;
use crate::error::SdkResult;

/// What happened during [`Content::startup`].
#[derive(Clone, Debug, Default, Serialize)]
pub struct StartupReport {
    /// `None` when the migration stopped part way; see `migration_failures`.
    pub migration: Option<MigrationOutcome>,
    /// Moves that failed. The next startup retries them.
    pub migration_failures: Vec<MoveFailure>,
    pub assets: PreloadReport,
    pub documents: PreloadReport,
}

impl StartupReport {
    pub fn is_clean(&self) -> bool {
        self.migration_failures.is_empty() && self.assets.is_clean() && self.documents.is_clean()
    }
}

/// The content service.
///
/// Owns one loader shared by both stores and the migration step for the same
/// content root.
pub struct Content {
    config: ContentConfig,
    loader: Loader,
    assets: AssetStore,
    data: DataStore,
    migration: MigrationService,
}

impl Content {
    /// Build a service reading from disk. Caches start empty.
    pub fn new(config: ContentConfig) -> Self {
        Self::with_source(config, Arc::new(DiskSource))
    }

    /// Build a service over an explicit source.
    pub fn with_source(config: ContentConfig, source: Arc<dyn ContentSource>) -> Self {
        let loader = Loader::new(config.layout.clone(), source);
        Self {
            assets: AssetStore::new(loader.clone(), config.cache),
            data: DataStore::new(loader.clone(), config.cache),
            migration: MigrationService::new(config.layout.clone(), config.migration.clone()),
            loader,
            config,
        }
    }

    /// Build a service and run the startup sequence.
    pub fn open(config: ContentConfig) -> SdkResult<(Self, StartupReport)> {
        let content = Self::new(config);
        let report = content.startup()?;
        Ok((content, report))
    }

    /// Migrate legacy documents, then preload assets, then preload documents.
    ///
    /// A partial migration is logged and recorded in the report; preloading
    /// still runs against whatever is in place.
    pub fn startup(&self) -> SdkResult<StartupReport> {
        let mut report = StartupReport::default();

        match self.migration.migrate() {
            Ok(outcome) => report.migration = Some(outcome),
            Err(MigrationError::Partial { failures }) => {
                warn!("{} migration move(s) failed, continuing", failures.len());
                report.migration_failures = failures;
            }
            Err(e) => return Err(e.into()),
        }

        report.assets = self.assets.preload_all();
        report.documents = self.data.preload_all();

        info!(
            "content ready: {} asset(s), {} document(s)",
            report.assets.loaded, report.documents.loaded
        );
        Ok(report)
    }

    pub fn config(&self) -> &ContentConfig {
        &self.config
    }

    pub fn layout(&self) -> &ContentLayout {
        &self.config.layout
    }

    pub fn loader(&self) -> &Loader {
        &self.loader
    }

    pub fn assets(&self) -> &AssetStore {
        &self.assets
    }

    pub fn data(&self) -> &DataStore {
        &self.data
    }

    pub fn migration(&self) -> &MigrationService {
        &self.migration
    }

    // ---- Engine-facing shortcuts ----

    /// Cached asset, or a placeholder if it cannot be loaded.
    pub fn asset(&self, kind: AssetKind, key: &str) -> Resource {
        self.assets.get(kind, key)
    }

    pub fn font(&self, key: &str) -> Resource {
        self.asset(AssetKind::Font, key)
    }

    pub fn sprite(&self, key: &str) -> Resource {
        self.asset(AssetKind::Sprite, key)
    }

    pub fn effect(&self, key: &str) -> Resource {
        self.asset(AssetKind::Effect, key)
    }

    pub fn document<T: DataDocument>(&self, key: &str, create_if_missing: bool) -> SdkResult<T> {
        Ok(self.data.get(key, create_if_missing)?)
    }

    pub fn save_document<T: DataDocument>(&self, document: &T, key: &str) -> SdkResult<()> {
        Ok(self.data.save(document, key)?)
    }

    pub fn documents_of_type<T: DataDocument>(&self) -> Vec<T> {
        self.data.get_all_of_type()
    }

    pub fn document_pairs_of_type<T: DataDocument>(&self) -> Vec<(CacheKey, T)> {
        self.data.get_all_pairs_of_type()
    }
}

impl std::fmt::Debug for Content {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Content")
            .field("root", &self.config.layout.root)
            .field("assets", &self.assets)
            .field("data", &self.data)
            .finish()
    }
}
