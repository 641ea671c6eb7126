use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use cask_types::ContentLayout;
use serde::Serialize;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::MigrationConfig;
use crate::error::{MigrationError, MigrationResult, MoveFailure};
use crate::marker::{Marker, MarkerStatus};

/// Whether the document root is in its canonical place.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum MigrationState {
    NotMigrated,
    Migrated,
}

/// What a completed migration moved.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    /// Legacy directories that were relocated in full.
    pub moved: Vec<PathBuf>,
    /// Legacy directories that still hold files after the merge, because of
    /// `collisions`.
    pub partially_moved: Vec<PathBuf>,
    /// Files left in a legacy directory because the canonical root already
    /// had a file at the same relative path.
    pub collisions: Vec<PathBuf>,
}

/// Result of [`MigrationService::migrate`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum MigrationOutcome {
    Disabled,
    AlreadyMigrated,
    /// No legacy directory was found. Nothing is recorded, so a later run
    /// searches again.
    NothingToMigrate,
    Migrated(MigrationReport),
}

/// Relocates legacy document directories into the content root.
#[derive(Clone, Debug)]
pub struct MigrationService {
    layout: ContentLayout,
    config: MigrationConfig,
}

impl MigrationService {
    pub fn new(layout: ContentLayout, config: MigrationConfig) -> Self {
        Self { layout, config }
    }

    fn marker_path(&self) -> PathBuf {
        self.layout.root.join(&self.config.marker_file)
    }

    /// Determine the current state.
    ///
    /// - complete marker: migrated
    /// - in-progress marker: not migrated (an earlier run was interrupted)
    /// - no marker, document root present: migrated
    /// - otherwise: not migrated
    pub fn check(&self) -> MigrationResult<MigrationState> {
        match Marker::load(&self.marker_path())? {
            Some(marker) if marker.is_complete() => Ok(MigrationState::Migrated),
            Some(_) => Ok(MigrationState::NotMigrated),
            None if self.layout.data_root().is_dir() => Ok(MigrationState::Migrated),
            None => Ok(MigrationState::NotMigrated),
        }
    }

    /// Move every legacy document directory into the canonical location.
    ///
    /// Calling this again after it succeeded is a no-op.
    pub fn migrate(&self) -> MigrationResult<MigrationOutcome> {
        if !self.config.enabled {
            return Ok(MigrationOutcome::Disabled);
        }
        if self.check()? == MigrationState::Migrated {
            debug!("document root already in place");
            return Ok(MigrationOutcome::AlreadyMigrated);
        }

        let marker_path = self.marker_path();
        let existing = Marker::load(&marker_path)?;

        let legacy = self.find_legacy_dirs()?;
        if legacy.is_empty() {
            // An earlier run moved everything but stopped before completing.
            if let Some(mut marker) = existing {
                if self.layout.data_root().is_dir() {
                    info!("completing interrupted migration");
                    marker.status = MarkerStatus::Complete;
                    marker.store(&marker_path)?;
                    return Ok(MigrationOutcome::AlreadyMigrated);
                }
            }
            debug!("no legacy document directory found");
            return Ok(MigrationOutcome::NothingToMigrate);
        }

        let mut marker = existing.unwrap_or_else(Marker::in_progress);
        marker.store(&marker_path)?;

        let target = self.layout.data_root();
        let mut report = MigrationReport::default();
        let mut failures = Vec::new();

        for dir in legacy {
            info!("migrating {:?} -> {:?}", dir, target);
            let failed_before = failures.len();
            let collided_before = report.collisions.len();
            relocate(&dir, &target, &mut report.collisions, &mut failures);
            if failures.len() > failed_before {
                continue;
            }
            if report.collisions.len() > collided_before {
                report.partially_moved.push(dir);
            } else {
                marker.moved.push(dir.clone());
                marker.store(&marker_path)?;
                report.moved.push(dir);
            }
        }

        if !failures.is_empty() {
            for failure in &failures {
                warn!("migration move failed: {}", failure);
            }
            return Err(MigrationError::Partial { failures });
        }

        marker.status = MarkerStatus::Complete;
        marker.store(&marker_path)?;
        info!("migrated {} legacy directory(ies)", report.moved.len());
        Ok(MigrationOutcome::Migrated(report))
    }

    /// Directories named like the document root under the search root,
    /// excluding the content root's own subtree and its ancestors.
    pub fn find_legacy_dirs(&self) -> MigrationResult<Vec<PathBuf>> {
        let content = resolve(&self.layout.root)?;
        let Some(search_root) = content.ancestors().nth(self.config.levels_up) else {
            warn!("{:?} has fewer than {} ancestors", content, self.config.levels_up);
            return Ok(Vec::new());
        };
        let search_root = search_root.to_path_buf();
        let wanted = self.layout.data_dir.as_str();

        let mut found = Vec::new();
        let mut walker = WalkDir::new(&search_root)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !e.path().starts_with(&content));

        while let Some(entry) = walker.next() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("skipping unreadable entry under {:?}: {}", search_root, e);
                    continue;
                }
            };
            let name_matches = entry
                .file_name()
                .to_str()
                .map(|n| n.eq_ignore_ascii_case(wanted))
                .unwrap_or(false);
            if !entry.file_type().is_dir() || !name_matches {
                continue;
            }
            if content.starts_with(entry.path()) {
                debug!("{:?} contains the content root, not a legacy directory", entry.path());
                continue;
            }
            found.push(entry.into_path());
            walker.skip_current_dir();
        }
        Ok(found)
    }
}

/// Absolute form of `path`, resolving symlinks when it exists.
fn resolve(path: &Path) -> MigrationResult<PathBuf> {
    fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .map_err(|source| MigrationError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// Move `from` to `target`: a plain rename when the target does not exist
/// yet, otherwise a file-by-file merge that keeps existing target files.
fn relocate(
    from: &Path,
    target: &Path,
    collisions: &mut Vec<PathBuf>,
    failures: &mut Vec<MoveFailure>,
) {
    if !target.exists() {
        if let Some(parent) = target.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                failures.push(failure(from, target, e));
                return;
            }
        }
        match fs::rename(from, target) {
            Ok(()) => return,
            // Cross-device or similar; fall back to moving file by file.
            Err(e) => debug!("rename {:?} failed ({}), merging instead", from, e),
        }
    }

    for entry in WalkDir::new(from).min_depth(1).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| from.to_path_buf());
                failures.push(MoveFailure {
                    from: path,
                    to: target.to_path_buf(),
                    reason: e.to_string(),
                });
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(from) else {
            continue;
        };
        let dest = target.join(relative);
        if dest.exists() {
            warn!("{:?} already exists, leaving {:?} in place", dest, entry.path());
            collisions.push(entry.path().to_path_buf());
            continue;
        }
        if let Err(e) = move_file(entry.path(), &dest) {
            failures.push(failure(entry.path(), &dest, e));
        }
    }

    remove_empty_dirs(from);
}

fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    fs::copy(from, to)?;
    if let Err(e) = fs::remove_file(from) {
        // Leave exactly one copy so a retry sees no collision.
        let _ = fs::remove_file(to);
        return Err(e);
    }
    Ok(())
}

/// Remove directories under (and including) `root` that are now empty.
fn remove_empty_dirs(root: &Path) {
    for entry in WalkDir::new(root).contents_first(true).into_iter().flatten() {
        if entry.file_type().is_dir() {
            // Fails harmlessly on directories that still hold collisions.
            let _ = fs::remove_dir(entry.path());
        }
    }
}

fn failure(from: &Path, to: &Path, e: io::Error) -> MoveFailure {
    MoveFailure {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        reason: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// `<tmp>/install/game/Content` with the search root at `<tmp>/install`.
    struct Fixture {
        _dir: TempDir,
        install: PathBuf,
        content: PathBuf,
        service: MigrationService,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let install = dir.path().join("install");
        let content = install.join("game").join("Content");
        fs::create_dir_all(&content).unwrap();
        let service = MigrationService::new(ContentLayout::new(&content), MigrationConfig::default());
        Fixture {
            _dir: dir,
            install,
            content,
            service,
        }
    }

    fn write(path: &Path, text: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, text).unwrap();
    }

    #[test]
    fn fresh_install_is_not_migrated() {
        let fx = fixture();
        assert_eq!(fx.service.check().unwrap(), MigrationState::NotMigrated);
    }

    #[test]
    fn existing_document_root_counts_as_migrated() {
        let fx = fixture();
        fs::create_dir_all(fx.content.join("data")).unwrap();
        assert_eq!(fx.service.check().unwrap(), MigrationState::Migrated);
        assert_eq!(fx.service.migrate().unwrap(), MigrationOutcome::AlreadyMigrated);
    }

    #[test]
    fn legacy_directory_is_moved_and_second_run_is_noop() {
        let fx = fixture();
        let legacy = fx.install.join("publish").join("data");
        write(&legacy.join("Screens/Menu.xml"), "<ScreenData/>");
        write(&legacy.join("Options/Options.xml"), "<OptionsData/>");

        let MigrationOutcome::Migrated(report) = fx.service.migrate().unwrap() else {
            panic!("expected Migrated");
        };
        assert_eq!(report.moved.len(), 1);
        assert!(report.collisions.is_empty());

        assert!(fx.content.join("data/Screens/Menu.xml").is_file());
        assert!(fx.content.join("data/Options/Options.xml").is_file());
        assert!(!legacy.exists());
        assert_eq!(fx.service.check().unwrap(), MigrationState::Migrated);

        let marker = Marker::load(&fx.content.join(".cask-migration.json")).unwrap().unwrap();
        assert!(marker.is_complete());

        assert_eq!(fx.service.migrate().unwrap(), MigrationOutcome::AlreadyMigrated);
        assert!(fx.content.join("data/Screens/Menu.xml").is_file());
    }

    #[test]
    fn nothing_found_leaves_no_marker() {
        let fx = fixture();
        assert_eq!(fx.service.migrate().unwrap(), MigrationOutcome::NothingToMigrate);
        assert!(!fx.content.join(".cask-migration.json").exists());
        assert_eq!(fx.service.check().unwrap(), MigrationState::NotMigrated);
    }

    #[test]
    fn content_root_subtree_is_never_a_source() {
        let fx = fixture();
        // A directory named like the document root, but inside the content root.
        fs::create_dir_all(fx.content.join("sprites").join("data")).unwrap();
        assert!(fx.service.find_legacy_dirs().unwrap().is_empty());
    }

    #[test]
    fn match_is_case_insensitive_and_not_descended() {
        let fx = fixture();
        let legacy = fx.install.join("old").join("Data");
        fs::create_dir_all(legacy.join("data")).unwrap();
        let found = fx.service.find_legacy_dirs().unwrap();
        assert_eq!(found.len(), 1);
        assert!(found[0].ends_with("old/Data"));
    }

    #[test]
    fn several_legacy_directories_are_merged() {
        let fx = fixture();
        write(&fx.install.join("a/data/Screens/A.xml"), "a");
        write(&fx.install.join("b/data/Screens/B.xml"), "b");

        let MigrationOutcome::Migrated(report) = fx.service.migrate().unwrap() else {
            panic!("expected Migrated");
        };
        assert_eq!(report.moved.len(), 2);
        assert!(fx.content.join("data/Screens/A.xml").is_file());
        assert!(fx.content.join("data/Screens/B.xml").is_file());
    }

    #[test]
    fn merge_keeps_existing_files() {
        let fx = fixture();
        write(&fx.install.join("a/data/Same.xml"), "first");
        write(&fx.install.join("b/data/Same.xml"), "second");

        let MigrationOutcome::Migrated(report) = fx.service.migrate().unwrap() else {
            panic!("expected Migrated");
        };
        assert_eq!(report.collisions.len(), 1);
        assert_eq!(report.moved.len(), 1);
        assert!(report.moved[0].ends_with("a/data"));
        assert_eq!(report.partially_moved.len(), 1);
        assert!(report.partially_moved[0].ends_with("b/data"));
        assert_eq!(fs::read_to_string(fx.content.join("data/Same.xml")).unwrap(), "first");
        assert!(fx.install.join("b/data/Same.xml").is_file());

        let marker = Marker::load(&fx.content.join(".cask-migration.json")).unwrap().unwrap();
        assert!(marker.is_complete());
        assert_eq!(marker.moved, report.moved);
    }

    #[test]
    fn interrupted_run_is_resumed() {
        let fx = fixture();
        // A previous run moved one file, then stopped before completing.
        Marker::in_progress()
            .store(&fx.content.join(".cask-migration.json"))
            .unwrap();
        write(&fx.content.join("data/Screens/Done.xml"), "done");
        write(&fx.install.join("publish/data/Screens/Rest.xml"), "rest");

        assert_eq!(fx.service.check().unwrap(), MigrationState::NotMigrated);
        let MigrationOutcome::Migrated(report) = fx.service.migrate().unwrap() else {
            panic!("expected Migrated");
        };
        assert_eq!(report.moved.len(), 1);
        assert!(fx.content.join("data/Screens/Done.xml").is_file());
        assert!(fx.content.join("data/Screens/Rest.xml").is_file());
        assert_eq!(fx.service.check().unwrap(), MigrationState::Migrated);
    }

    #[test]
    fn ancestor_named_like_document_root_is_not_a_source() {
        let dir = TempDir::new().unwrap();
        let content = dir.path().join("x").join("data").join("Content");
        write(&content.join("fonts/A.bin"), "font");
        write(&dir.path().join("x/old/data/Screens/Menu.xml"), "<ScreenData/>");
        let service = MigrationService::new(ContentLayout::new(&content), MigrationConfig::default());

        let found = service.find_legacy_dirs().unwrap();
        assert_eq!(found.len(), 1);
        assert!(found[0].ends_with("old/data"));

        let MigrationOutcome::Migrated(report) = service.migrate().unwrap() else {
            panic!("expected Migrated");
        };
        assert_eq!(report.moved.len(), 1);
        assert!(content.join("fonts/A.bin").is_file());
        assert!(content.join("data/Screens/Menu.xml").is_file());
        assert!(!content.join("data/Content").exists());
    }

    #[test]
    fn ancestor_alone_leaves_content_untouched() {
        let dir = TempDir::new().unwrap();
        let content = dir.path().join("x").join("data").join("Content");
        write(&content.join("fonts/A.bin"), "font");
        let service = MigrationService::new(ContentLayout::new(&content), MigrationConfig::default());

        assert!(service.find_legacy_dirs().unwrap().is_empty());
        assert_eq!(service.migrate().unwrap(), MigrationOutcome::NothingToMigrate);
        assert!(content.join("fonts/A.bin").is_file());
    }

    #[test]
    fn stale_in_progress_marker_is_completed() {
        let fx = fixture();
        // Everything was moved, but the run stopped before marking completion.
        let marker_path = fx.content.join(".cask-migration.json");
        Marker::in_progress().store(&marker_path).unwrap();
        write(&fx.content.join("data/Screens/A.xml"), "a");
        assert_eq!(fx.service.check().unwrap(), MigrationState::NotMigrated);

        assert_eq!(fx.service.migrate().unwrap(), MigrationOutcome::AlreadyMigrated);
        assert!(Marker::load(&marker_path).unwrap().unwrap().is_complete());
        assert_eq!(fx.service.check().unwrap(), MigrationState::Migrated);
        assert!(fx.content.join("data/Screens/A.xml").is_file());
    }

    #[test]
    fn failed_move_is_partial_and_retried() {
        let fx = fixture();
        let marker_path = fx.content.join(".cask-migration.json");
        Marker::in_progress().store(&marker_path).unwrap();
        // A plain file where the merge needs a directory.
        write(&fx.content.join("data/Screens"), "blocker");
        let legacy = fx.install.join("publish").join("data");
        write(&legacy.join("Screens/Menu.xml"), "<ScreenData/>");

        let failures = match fx.service.migrate() {
            Err(MigrationError::Partial { failures }) => failures,
            other => panic!("expected Partial, got {other:?}"),
        };
        assert_eq!(failures.len(), 1);
        assert!(failures[0].from.ends_with("Screens/Menu.xml"));
        assert!(legacy.join("Screens/Menu.xml").is_file());

        let marker = Marker::load(&marker_path).unwrap().unwrap();
        assert!(!marker.is_complete());
        assert!(marker.moved.is_empty());
        assert_eq!(fx.service.check().unwrap(), MigrationState::NotMigrated);

        fs::remove_file(fx.content.join("data/Screens")).unwrap();
        let MigrationOutcome::Migrated(report) = fx.service.migrate().unwrap() else {
            panic!("expected Migrated");
        };
        assert_eq!(report.moved.len(), 1);
        assert!(fx.content.join("data/Screens/Menu.xml").is_file());
        assert!(!legacy.exists());
        assert!(Marker::load(&marker_path).unwrap().unwrap().is_complete());
    }

    #[test]
    fn disabled_does_nothing() {
        let dir = TempDir::new().unwrap();
        let content = dir.path().join("x/y/Content");
        write(&dir.path().join("x/legacy/data/A.xml"), "a");
        let service = MigrationService::new(
            ContentLayout::new(&content),
            MigrationConfig {
                enabled: false,
                ..Default::default()
            },
        );
        assert_eq!(service.migrate().unwrap(), MigrationOutcome::Disabled);
        assert!(!content.join("data").exists());
    }
}
