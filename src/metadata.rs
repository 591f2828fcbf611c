//! File metadata as a live view over a backing store.
//!
//! `FileDetail` never caches: each accessor asks its `MetadataProbe` again, so
//! repeated reads follow the on-disk state. A backing store plugs in by
//! implementing the probe; `LocalProbe` is the one for the native file system.

use chrono::{DateTime, Utc};
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;

use crate::path::FsPath;

/// What a backing store reports about one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stat {
    pub size: u64,
    pub is_dir: bool,
    pub created: Option<SystemTime>,
    pub modified: Option<SystemTime>,
}

/// Capability interface over a backing store.
pub trait MetadataProbe: Send + Sync {
    /// `Ok(None)` when nothing exists at `path`.
    fn stat(&self, path: &Path) -> io::Result<Option<Stat>>;

    fn exists(&self, path: &Path) -> bool {
        matches!(self.stat(path), Ok(Some(_)))
    }

    fn name(&self) -> &'static str {
        "unknown"
    }
}

/// Native file system via `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalProbe;

impl MetadataProbe for LocalProbe {
    fn stat(&self, path: &Path) -> io::Result<Option<Stat>> {
        match fs::metadata(path) {
            Ok(meta) => Ok(Some(Stat {
                size: if meta.is_dir() { 0 } else { meta.len() },
                is_dir: meta.is_dir(),
                // Not every platform/filesystem records a birth time.
                created: meta.created().ok(),
                modified: meta.modified().ok(),
            })),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        path.try_exists().unwrap_or(false)
    }

    fn name(&self) -> &'static str {
        "local"
    }
}

/// Metadata handle for one path. Size, timestamps and existence are re-read on
/// every call; name, extension and directory come from the path itself.
#[derive(Clone)]
pub struct FileDetail {
    path: FsPath,
    probe: Arc<dyn MetadataProbe>,
}

impl fmt::Debug for FileDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileDetail")
            .field("path", &self.path)
            .field("probe", &self.probe.name())
            .finish()
    }
}

impl PartialEq for FileDetail {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl FileDetail {
    pub fn new(path: FsPath, probe: Arc<dyn MetadataProbe>) -> Self {
        Self { path, probe }
    }

    pub fn path(&self) -> &FsPath {
        &self.path
    }

    pub fn name(&self) -> &str {
        self.path.name()
    }

    pub fn extension(&self) -> &str {
        self.path.extension()
    }

    pub fn full_name(&self) -> String {
        self.path.full_name()
    }

    pub fn directory(&self) -> &Path {
        self.path.directory_path()
    }

    fn live(&self) -> Option<Stat> {
        self.probe.stat(self.path.as_path()).ok().flatten()
    }

    pub fn exists(&self) -> bool {
        self.probe.exists(self.path.as_path())
    }

    /// Size in bytes; 0 when missing or a directory.
    pub fn size(&self) -> u64 {
        self.live().map(|s| s.size).unwrap_or(0)
    }

    pub fn created_utc(&self) -> Option<DateTime<Utc>> {
        self.live().and_then(|s| s.created).map(DateTime::<Utc>::from)
    }

    pub fn modified_utc(&self) -> Option<DateTime<Utc>> {
        self.live().and_then(|s| s.modified).map(DateTime::<Utc>::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use tempfile::tempdir;

    /// In-memory store used to show that FileDetail re-queries every time.
    #[derive(Default)]
    struct MapProbe(Mutex<HashMap<PathBuf, Stat>>);

    impl MetadataProbe for MapProbe {
        fn stat(&self, path: &Path) -> io::Result<Option<Stat>> {
            Ok(self.0.lock().unwrap().get(path).copied())
        }
    }

    #[test]
    fn detail_reflects_live_changes() {
        let probe = Arc::new(MapProbe::default());
        let detail = FileDetail::new(FsPath::file("/m/a.txt"), probe.clone());
        assert!(!detail.exists());
        assert_eq!(detail.size(), 0);

        probe.0.lock().unwrap().insert(
            PathBuf::from("/m/a.txt"),
            Stat { size: 42, is_dir: false, created: None, modified: Some(SystemTime::UNIX_EPOCH) },
        );
        assert!(detail.exists());
        assert_eq!(detail.size(), 42);
        assert_eq!(detail.modified_utc().unwrap().timestamp(), 0);
    }

    #[test]
    fn local_probe_reads_disk() {
        let td = tempdir().unwrap();
        let p = td.path().join("f.log");
        let detail = FileDetail::new(FsPath::file(&p), Arc::new(LocalProbe));
        assert!(!detail.exists());

        fs::write(&p, b"hello").unwrap();
        assert!(detail.exists());
        assert_eq!(detail.size(), 5);
        assert!(detail.modified_utc().is_some());
        assert_eq!(detail.full_name(), "f.log");
        assert_eq!(detail.extension(), ".log");

        fs::write(&p, b"hello world").unwrap();
        assert_eq!(detail.size(), 11);
    }

    #[test]
    fn local_probe_reports_directories() {
        let td = tempdir().unwrap();
        let stat = LocalProbe.stat(td.path()).unwrap().unwrap();
        assert!(stat.is_dir);
        assert_eq!(stat.size, 0);
        assert!(LocalProbe.stat(&td.path().join("missing")).unwrap().is_none());
    }
}
