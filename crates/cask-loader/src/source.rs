use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::warn;
use walkdir::WalkDir;

/// Filesystem access used by the [`Loader`](crate::Loader).
///
/// Implementations must satisfy these invariants:
/// - `read` of a missing file returns an error of kind `NotFound`.
/// - `write` replaces the whole file and creates missing parent directories.
/// - `list` of a missing directory returns an empty list, not an error.
/// - `list` results are sorted so discovery order is deterministic.
pub trait ContentSource: Send + Sync {
    /// Read a whole file.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Replace a file's contents.
    fn write(&self, path: &Path, data: &[u8]) -> io::Result<()>;

    /// Recursively list files under `root` whose extension equals
    /// `extension` (ASCII case-insensitive).
    fn list(&self, root: &Path, extension: &str) -> io::Result<Vec<PathBuf>>;
}

/// The real filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct DiskSource;

impl ContentSource for DiskSource {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn write(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)?;

        // Write beside the target, then rename over it.
        let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
        tmp.write_all(data)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    fn list(&self, root: &Path, extension: &str) -> io::Result<Vec<PathBuf>> {
        if !root.is_dir() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("skipping unreadable entry under {:?}: {}", root, e);
                    continue;
                }
            };
            if entry.file_type().is_file() && has_extension(entry.path(), extension) {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}

/// Snapshot of a [`CountingSource`]'s counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SourceStats {
    pub reads: u64,
    pub writes: u64,
    pub lists: u64,
}

/// A source wrapper that counts every call it forwards.
///
/// Used to verify cache behaviour, e.g. that a cache hit performs no reads.
#[derive(Debug, Default)]
pub struct CountingSource<S> {
    inner: S,
    reads: AtomicU64,
    writes: AtomicU64,
    lists: AtomicU64,
}

impl<S: ContentSource> CountingSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            reads: AtomicU64::new(0),
            writes: AtomicU64::new(0),
            lists: AtomicU64::new(0),
        }
    }

    pub fn stats(&self) -> SourceStats {
        SourceStats {
            reads: self.reads.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            lists: self.lists.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        self.reads.store(0, Ordering::Relaxed);
        self.writes.store(0, Ordering::Relaxed);
        self.lists.store(0, Ordering::Relaxed);
    }
}

impl<S: ContentSource> ContentSource for CountingSource<S> {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        self.inner.read(path)
    }

    fn write(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        self.writes.fetch_add(1, Ordering::Relaxed);
        self.inner.write(path, data)
    }

    fn list(&self, root: &Path, extension: &str) -> io::Result<Vec<PathBuf>> {
        self.lists.fetch_add(1, Ordering::Relaxed);
        self.inner.list(root, extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str, data: &[u8]) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, data).unwrap();
    }

    #[test]
    fn list_filters_by_extension_recursively() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "A.bin", b"a");
        touch(dir.path(), "Sub/B.BIN", b"b");
        touch(dir.path(), "Sub/notes.txt", b"n");

        let files = DiskSource.list(dir.path(), "bin").unwrap();
        assert_eq!(
            files,
            vec![dir.path().join("A.bin"), dir.path().join("Sub").join("B.BIN")]
        );
    }

    #[test]
    fn list_missing_directory_is_empty() {
        let dir = TempDir::new().unwrap();
        let files = DiskSource.list(&dir.path().join("nope"), "bin").unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn write_creates_parents_and_replaces() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("deep/nested/file.xml");
        DiskSource.write(&path, b"first").unwrap();
        DiskSource.write(&path, b"second").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"second");
    }

    #[test]
    fn read_missing_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = DiskSource.read(&dir.path().join("missing.bin")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn counting_source_counts_each_call() {
        let dir = TempDir::new().unwrap();
        let source = CountingSource::new(DiskSource);
        let path = dir.path().join("x.bin");

        source.write(&path, b"x").unwrap();
        source.read(&path).unwrap();
        let _ = source.read(&dir.path().join("missing.bin"));
        source.list(dir.path(), "bin").unwrap();

        assert_eq!(
            source.stats(),
            SourceStats {
                reads: 2,
                writes: 1,
                lists: 1
            }
        );

        source.reset();
        assert_eq!(source.stats(), SourceStats::default());
    }
}
