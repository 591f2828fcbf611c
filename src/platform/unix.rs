//! Unix implementations of platform helpers.

use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::Path;

use crate::collision::AccessMode;

/// OS-specific open flags for an access mode.
/// Descriptors are never inherited by child processes.
pub fn configure_open(opts: &mut OpenOptions, _mode: AccessMode) {
    opts.custom_flags(libc::O_CLOEXEC);
}

/// Take the exclusive-open lock. flock is advisory on Unix: it keeps out other
/// exclusive openers, not plain readers.
pub fn lock_exclusive(file: &File) -> io::Result<()> {
    FileExt::try_lock_exclusive(file)
}

/// Empty a file that no other handle holds under the exclusive lock.
/// A held file is left untouched and the lock conflict is returned.
pub fn truncate_unheld(file: &File) -> io::Result<()> {
    FileExt::try_lock_shared(file)?;
    let emptied = file.set_len(0);
    let _ = FileExt::unlock(file);
    emptied
}

/// Open log file for appending; set 0600 only when creating a new file.
/// If the file already exists, we preserve its existing permissions to avoid
/// clobbering administrator adjustments (e.g. group-readable for log shipping).
pub fn open_log_file_secure_append(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let existed = path.exists();
    let f = OpenOptions::new()
        .create(true)
        .append(true)
        .custom_flags(libc::O_CLOEXEC)
        .mode(0o600) // applies on create
        .open(path)?;
    if !existed {
        // Newly created: ensure 0600
        let _ = fs::set_permissions(path, fs::Permissions::from_mode(0o600));
    }
    Ok(f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn preserve_existing_log_file_mode() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log.txt");
        fs::write(&path, b"hello").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();
        let _f = open_log_file_secure_append(&path).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o640, "existing permissions should be preserved");
    }

    #[test]
    fn new_log_file_gets_0600() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("new_log.txt");
        let _f = open_log_file_secure_append(&path).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600, "newly created log file should be 0600");
    }

    #[test]
    fn second_exclusive_lock_is_refused() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("held.bin");
        let first = File::create(&path).unwrap();
        lock_exclusive(&first).unwrap();
        let second = File::open(&path).unwrap();
        assert!(lock_exclusive(&second).is_err());
        drop(first);
        assert!(lock_exclusive(&second).is_ok());
    }

    #[test]
    fn truncate_leaves_a_held_file_alone() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("held.bin");
        fs::write(&path, b"keep me").unwrap();
        let holder = OpenOptions::new().read(true).write(true).open(&path).unwrap();
        lock_exclusive(&holder).unwrap();

        let other = OpenOptions::new().write(true).open(&path).unwrap();
        assert!(truncate_unheld(&other).is_err());
        assert_eq!(fs::read(&path).unwrap(), b"keep me");

        drop(holder);
        truncate_unheld(&other).unwrap();
        assert_eq!(fs::metadata(&path).unwrap().len(), 0);
        // The shared lock taken for the truncate is gone again.
        let third = File::open(&path).unwrap();
        assert!(lock_exclusive(&third).is_ok());
    }
}
