//! Windows implementations of platform helpers.
//!
//! Notes:
//! - Exclusive opens ask the OS for no sharing at all, then also take a
//!   LockFileEx lock so both platforms refuse a second exclusive opener.
//! - Temporary files are removed by the stream after its handle closes.

use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io;
use std::os::windows::fs::OpenOptionsExt;
use std::path::Path;

use windows_sys::Win32::Storage::FileSystem::{FILE_SHARE_DELETE, FILE_SHARE_READ, FILE_SHARE_WRITE};

use crate::collision::AccessMode;

pub fn configure_open(opts: &mut OpenOptions, mode: AccessMode) {
    match mode {
        AccessMode::ReadWriteExclusive => {
            opts.share_mode(0);
        }
        _ => {
            opts.share_mode(FILE_SHARE_READ | FILE_SHARE_WRITE | FILE_SHARE_DELETE);
        }
    }
}

pub fn lock_exclusive(file: &File) -> io::Result<()> {
    FileExt::try_lock_exclusive(file)
}

/// Empty a file unless another handle holds its exclusive lock.
pub fn truncate_unheld(file: &File) -> io::Result<()> {
    FileExt::try_lock_shared(file)?;
    let emptied = file.set_len(0);
    let _ = FileExt::unlock(file);
    emptied
}

/// Open log file for appending (best-effort; no symlink defense available via std on Windows).
pub fn open_log_file_secure_append(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    OpenOptions::new().create(true).append(true).open(path)
}
