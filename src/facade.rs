//! Asynchronous file-system surface.
//!
//! Every operation validates its arguments before the first suspension point,
//! then hops onto tokio's blocking pool for the OS work. Invalid arguments are
//! the only failure returned as `Err`; everything else (collision refusals,
//! vanished paths, permission errors) comes back as `false` or `None`.
//!
//! `try_open_file` is the one exception: it keeps the failure cause for callers
//! that want to report it.
//!
//! The facade does not cache and does not order concurrent calls on one path;
//! see [`crate::sync::PathLocks`] for that.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, trace};
use walkdir::WalkDir;

use crate::collision::{self, AccessMode, CollisionMethod, OpenAction, Resolution};
use crate::errors::{FsError, settle, settle_flag};
use crate::metadata::{FileDetail, LocalProbe, MetadataProbe};
use crate::path::{FsPath, normalize_extension};
use crate::platform::{self, PlatformContext, temp::unique_temp_name};
use crate::rename::unique_sibling;
use crate::stream::FileStream;

#[derive(Clone)]
pub struct FileSystem {
    ctx: Arc<PlatformContext>,
    probe: Arc<dyn MetadataProbe>,
}

impl std::fmt::Debug for FileSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSystem")
            .field("ctx", &self.ctx)
            .field("probe", &self.probe.name())
            .finish()
    }
}

fn require_path(op: &'static str, path: &Path) -> Result<PathBuf, FsError> {
    if path.as_os_str().is_empty() {
        return Err(FsError::InvalidArgument { op, reason: "path is empty" });
    }
    Ok(path.to_path_buf())
}

/// Run `work` on the blocking pool.
async fn off_thread<T, F>(op: &'static str, work: F) -> Result<T, FsError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, FsError> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| FsError::Background { op, reason: e.to_string() })?
}

impl FileSystem {
    /// Facade over the native file system.
    pub fn new(ctx: PlatformContext) -> Self {
        Self::with_probe(ctx, Arc::new(LocalProbe))
    }

    /// Facade whose existence checks and metadata come from `probe`.
    pub fn with_probe(ctx: PlatformContext, probe: Arc<dyn MetadataProbe>) -> Self {
        debug!(platform = ctx.identity(), temp_root = %ctx.temp_root().display(), probe = probe.name(), "file system ready");
        Self { ctx: Arc::new(ctx), probe }
    }

    pub fn context(&self) -> &PlatformContext {
        &self.ctx
    }

    /// Live metadata handle for `path`. Does not require the path to exist.
    pub async fn get_detail(&self, path: impl AsRef<Path>) -> Result<FileDetail, FsError> {
        let path = require_path("get_detail", path.as_ref())?;
        let probe = Arc::clone(&self.probe);
        off_thread("get_detail", move || Ok(FileDetail::new(FsPath::file(path), probe))).await
    }

    /// Open `path` under the given access mode and collision policy.
    /// `Ok(None)` means the request could not be satisfied.
    pub async fn open_file(
        &self,
        path: impl AsRef<Path>,
        mode: AccessMode,
        method: CollisionMethod,
    ) -> Result<Option<FileStream>, FsError> {
        settle("open_file", self.try_open_file(path, mode, method).await)
    }

    /// Like [`open_file`](Self::open_file) but keeps the reason for a refusal.
    pub async fn try_open_file(
        &self,
        path: impl AsRef<Path>,
        mode: AccessMode,
        method: CollisionMethod,
    ) -> Result<FileStream, FsError> {
        let path = require_path("open_file", path.as_ref())?;
        let probe = Arc::clone(&self.probe);
        off_thread("open_file", move || open_blocking(probe.as_ref(), FsPath::file(path), mode, method)).await
    }

    /// Remove a file. A missing file counts as removed.
    pub async fn delete_file(&self, path: impl AsRef<Path>) -> Result<bool, FsError> {
        let path = require_path("delete_file", path.as_ref())?;
        let result = off_thread("delete_file", move || match fs::remove_file(&path) {
            Ok(()) => {
                trace!(path = %path.display(), "file removed");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(true),
            Err(e) => Err(FsError::io("delete file", path)(e)),
        })
        .await;
        settle_flag("delete_file", result)
    }

    /// Create `path` and any missing parents. An existing directory yields
    /// `allow_existing`; an existing file yields `false`.
    pub async fn create_directory(&self, path: impl AsRef<Path>, allow_existing: bool) -> Result<bool, FsError> {
        let path = require_path("create_directory", path.as_ref())?;
        let result = off_thread("create_directory", move || {
            match fs::metadata(&path) {
                Ok(meta) if meta.is_dir() => return Ok(allow_existing),
                Ok(_) => return Err(FsError::NotADirectory(path)),
                Err(_) => {}
            }
            fs::create_dir_all(&path).map_err(FsError::io("create directory", &path))?;
            trace!(path = %path.display(), "directory created");
            Ok(true)
        })
        .await;
        settle_flag("create_directory", result)
    }

    /// Remove a directory; with `recursive`, its contents too. A missing
    /// directory yields `false`.
    pub async fn delete_directory(&self, path: impl AsRef<Path>, recursive: bool) -> Result<bool, FsError> {
        let path = require_path("delete_directory", path.as_ref())?;
        let result = off_thread("delete_directory", move || {
            let meta = fs::symlink_metadata(&path).map_err(FsError::io("inspect directory", &path))?;
            if !meta.is_dir() {
                return Err(FsError::NotADirectory(path));
            }
            let removed = if recursive { fs::remove_dir_all(&path) } else { fs::remove_dir(&path) };
            removed.map_err(FsError::io("delete directory", &path))?;
            trace!(path = %path.display(), recursive, "directory removed");
            Ok(true)
        })
        .await;
        settle_flag("delete_directory", result)
    }

    /// Files under `path`, in enumeration order. `Ok(None)` when `path` is not
    /// an existing directory.
    pub async fn list_files(&self, path: impl AsRef<Path>, recursive: bool) -> Result<Option<Vec<FileDetail>>, FsError> {
        let path = require_path("list_files", path.as_ref())?;
        let probe = Arc::clone(&self.probe);
        let result = off_thread("list_files", move || {
            let files: Vec<FileDetail> = walk(&path, recursive, false)?
                .into_iter()
                .map(|p| FileDetail::new(FsPath::file(p), Arc::clone(&probe)))
                .collect();
            Ok(files)
        })
        .await;
        settle("list_files", result)
    }

    /// Directories under `path`, in enumeration order. `Ok(None)` when `path`
    /// is not an existing directory.
    pub async fn list_directories(&self, path: impl AsRef<Path>, recursive: bool) -> Result<Option<Vec<FsPath>>, FsError> {
        let path = require_path("list_directories", path.as_ref())?;
        let result = off_thread("list_directories", move || {
            Ok(walk(&path, recursive, true)?.into_iter().map(FsPath::directory).collect::<Vec<_>>())
        })
        .await;
        settle("list_directories", result)
    }

    /// Without `create_file`: the temp root itself, nothing created.
    /// With it: a fresh empty file in the temp root named with `extension`
    /// ("log" and ".log" both work).
    pub async fn get_temporary_path(&self, create_file: bool, extension: &str) -> Result<Option<FsPath>, FsError> {
        let root = self.ctx.temp_root().to_path_buf();
        if !create_file {
            return Ok(Some(FsPath::directory(root)));
        }
        let extension = normalize_extension(extension);
        let result = off_thread("get_temporary_path", move || {
            let path = root.join(unique_temp_name(&extension));
            let mut opts = OpenOptions::new();
            opts.write(true).create_new(true);
            opts.open(&path).map_err(FsError::io("create temporary file", &path))?;
            trace!(path = %path.display(), "temporary file created");
            Ok(FsPath::file(path))
        })
        .await;
        settle("get_temporary_path", result)
    }

    /// True when `path` is a file or a directory.
    pub async fn exists(&self, path: impl AsRef<Path>) -> Result<bool, FsError> {
        let path = require_path("exists", path.as_ref())?;
        let probe = Arc::clone(&self.probe);
        settle_flag("exists", off_thread("exists", move || Ok(probe.exists(&path))).await)
    }

    /// Move `old_path` to `new_path`. An existing destination is never
    /// replaced; the call yields `false` instead.
    pub async fn rename_file(&self, old_path: impl AsRef<Path>, new_path: impl AsRef<Path>) -> Result<bool, FsError> {
        let from = require_path("rename_file", old_path.as_ref())?;
        let to = require_path("rename_file", new_path.as_ref())?;
        let probe = Arc::clone(&self.probe);
        let result = off_thread("rename_file", move || {
            if probe.exists(&to) {
                return Err(FsError::Rejected { op: "rename_file", path: to });
            }
            fs::rename(&from, &to).map_err(FsError::io("rename", &from))?;
            info!(src = %from.display(), dest = %to.display(), "renamed");
            Ok(true)
        })
        .await;
        settle_flag("rename_file", result)
    }
}

fn open_blocking(
    probe: &dyn MetadataProbe,
    requested: FsPath,
    mode: AccessMode,
    method: CollisionMethod,
) -> Result<FileStream, FsError> {
    let stat = probe.stat(requested.as_path()).map_err(FsError::io("stat", requested.as_path()))?;
    if stat.is_some_and(|s| s.is_dir) {
        return Err(FsError::NotAFile(requested.into_path_buf()));
    }
    let exists = stat.is_some();
    let (target, action) = match collision::resolve(mode, method, exists) {
        Resolution::Reject => {
            debug!(path = %requested, %mode, %method, exists, "open refused by collision policy");
            return Err(FsError::Rejected { op: "open_file", path: requested.into_path_buf() });
        }
        Resolution::Proceed(action) => (requested, action),
        Resolution::Rename => {
            let fresh = unique_sibling(&requested, |p| probe.exists(p));
            debug!(requested = %requested, chosen = %fresh, "target exists; opening renamed sibling");
            (fresh, OpenAction::CreateNew)
        }
    };

    let (file, created) = open_target(target.as_path(), mode, action, exists)
        .map_err(FsError::io("open", target.as_path()))?;
    if let Err(e) = prepare_opened(&file, target.as_path(), mode, action) {
        discard_failed_open(file, target.as_path(), created);
        return Err(e);
    }
    trace!(path = %target, %mode, ?action, created, "file opened");
    Ok(FileStream::new(file, target, mode))
}

/// Open for `action` without truncating. The flag tells whether this call
/// created the file.
fn open_target(path: &Path, mode: AccessMode, action: OpenAction, exists: bool) -> io::Result<(fs::File, bool)> {
    let options = |create_new: bool| {
        let mut opts = OpenOptions::new();
        match action {
            OpenAction::Read => opts.read(true),
            _ if create_new => opts.read(true).write(true).create_new(true),
            _ => opts.read(true).write(true).create(true).truncate(false),
        };
        platform::configure_open(&mut opts, mode);
        opts
    };
    match action {
        OpenAction::Read => Ok((options(false).open(path)?, false)),
        OpenAction::CreateNew => Ok((options(true).open(path)?, true)),
        OpenAction::OpenOrCreate | OpenAction::Truncate if !exists => match options(true).open(path) {
            Ok(file) => Ok((file, true)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok((options(false).open(path)?, false)),
            Err(e) => Err(e),
        },
        OpenAction::OpenOrCreate | OpenAction::Truncate => Ok((options(false).open(path)?, false)),
    }
}

/// Release a handle whose open was refused after the fact, removing the file
/// when this open created it.
fn discard_failed_open(file: fs::File, path: &Path, created: bool) {
    drop(file);
    if created && let Err(e) = fs::remove_file(path) {
        debug!(path = %path.display(), error = %e, "could not remove file created by a failed open");
    }
}

/// Checks and lock work between the OS open and handing out a stream.
fn prepare_opened(file: &fs::File, path: &Path, mode: AccessMode, action: OpenAction) -> Result<(), FsError> {
    let meta = file.metadata().map_err(FsError::io("stat", path))?;
    if meta.is_dir() {
        return Err(FsError::NotAFile(path.to_path_buf()));
    }
    if mode == AccessMode::ReadWriteExclusive {
        platform::lock_exclusive(file).map_err(FsError::io("lock", path))?;
        if action == OpenAction::Truncate {
            file.set_len(0).map_err(FsError::io("truncate", path))?;
        }
    } else if action == OpenAction::Truncate {
        platform::truncate_unheld(file).map_err(FsError::io("truncate", path))?;
    }
    Ok(())
}

/// Entries below `root` (not `root` itself). Unreadable entries are skipped.
fn walk(root: &Path, recursive: bool, dirs: bool) -> Result<Vec<PathBuf>, FsError> {
    if !root.is_dir() {
        return Err(FsError::NotADirectory(root.to_path_buf()));
    }
    let max_depth = if recursive { usize::MAX } else { 1 };
    let entries = WalkDir::new(root)
        .min_depth(1)
        .max_depth(max_depth)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(e) => {
                trace!(root = %root.display(), error = %e, "skipping unreadable entry");
                None
            }
        })
        .filter(|e| if dirs { e.file_type().is_dir() } else { e.file_type().is_file() })
        .map(walkdir::DirEntry::into_path)
        .collect();
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn fs_in(dir: &Path) -> FileSystem {
        FileSystem::new(PlatformContext::new(dir).unwrap())
    }

    #[tokio::test]
    async fn empty_path_is_invalid_argument() {
        let td = tempdir().unwrap();
        let fs = fs_in(td.path());
        assert!(matches!(fs.exists("").await, Err(FsError::InvalidArgument { .. })));
        assert!(matches!(fs.delete_file("").await, Err(FsError::InvalidArgument { .. })));
        assert!(matches!(
            fs.open_file("", AccessMode::ReadWrite, CollisionMethod::NormalOpen).await,
            Err(FsError::InvalidArgument { .. })
        ));
        assert!(matches!(fs.rename_file("a", "").await, Err(FsError::InvalidArgument { .. })));
    }

    #[test]
    fn walk_respects_depth_and_kind() {
        let td = tempdir().unwrap();
        std::fs::create_dir_all(td.path().join("a/b")).unwrap();
        std::fs::write(td.path().join("top.txt"), b"").unwrap();
        std::fs::write(td.path().join("a/b/deep.txt"), b"").unwrap();

        assert_eq!(walk(td.path(), false, false).unwrap(), vec![td.path().join("top.txt")]);
        assert_eq!(walk(td.path(), true, false).unwrap().len(), 2);
        assert_eq!(walk(td.path(), false, true).unwrap(), vec![td.path().join("a")]);
        assert_eq!(walk(td.path(), true, true).unwrap().len(), 2);
        assert!(matches!(walk(&td.path().join("top.txt"), false, false), Err(FsError::NotADirectory(_))));
    }

    #[test]
    fn failed_open_removes_only_what_it_created() {
        let td = tempdir().unwrap();
        let made = td.path().join("made.bin");
        let (file, created) =
            open_target(&made, AccessMode::ReadWriteExclusive, OpenAction::OpenOrCreate, false).unwrap();
        assert!(created);
        discard_failed_open(file, &made, created);
        assert!(!made.exists());

        let kept = td.path().join("kept.bin");
        std::fs::write(&kept, b"old").unwrap();
        // A stale "absent" answer still sees the file on disk.
        let (file, created) =
            open_target(&kept, AccessMode::ReadWriteExclusive, OpenAction::Truncate, false).unwrap();
        assert!(!created);
        discard_failed_open(file, &kept, created);
        assert_eq!(std::fs::read(&kept).unwrap(), b"old");
    }

    #[tokio::test]
    async fn try_open_reports_directories() {
        let td = tempdir().unwrap();
        let fs = fs_in(td.path());
        let err = fs
            .try_open_file(td.path(), AccessMode::ReadOnly, CollisionMethod::NormalOpen)
            .await
            .unwrap_err();
        assert!(matches!(err, FsError::NotAFile(_)));
    }

    #[tokio::test]
    async fn try_open_reports_rejection() {
        let td = tempdir().unwrap();
        let fs = fs_in(td.path());
        let p = td.path().join("r.txt");
        std::fs::write(&p, b"x").unwrap();
        let err = fs
            .try_open_file(&p, AccessMode::ReadWrite, CollisionMethod::FailIfExists)
            .await
            .unwrap_err();
        assert!(matches!(err, FsError::Rejected { .. }));
    }
}
