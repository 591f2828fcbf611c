//! I/O error enrichment.
//!
//! Adds actionable hints to io::Error messages, keyed by raw OS code with an
//! ErrorKind fallback. `FsError::Io` renders through `describe_io_error`, and
//! `io_error_with_help` serves anyhow code paths.
//!
//! Usage:
//!   // in functions returning anyhow::Result<_>
//!   fs::read_to_string(p).map_err(io_error_with_help("read config", p))?;

use anyhow::anyhow;
use std::io;
use std::path::Path;

/// Format a human-friendly message with op/path plus platform-aware hints.
pub fn describe_io_error(op: &str, path: &Path, e: &io::Error) -> String {
    let mut msg = format!("{} '{}': {}", op, path.display(), e);

    if let Some(code) = e.raw_os_error() {
        // Platform-specific hints by raw OS code.
        #[cfg(unix)]
        {
            match code {
                libc::EACCES | libc::EPERM => {
                    msg.push_str(": permission denied; check ownership and write permissions.");
                }
                libc::EXDEV => {
                    msg.push_str(": cross-filesystem; rename cannot cross devices.");
                }
                libc::EBUSY => {
                    msg.push_str(": resource busy; another handle may hold it open.");
                }
                libc::ENOENT => {
                    msg.push_str(": path not found; verify it exists.");
                }
                libc::EEXIST => {
                    msg.push_str(": already exists; use RenameIfExists or OverwriteIfExists.");
                }
                libc::ENOSPC => {
                    msg.push_str(": insufficient space on device.");
                }
                libc::EROFS => {
                    msg.push_str(": read-only filesystem; cannot write here.");
                }
                libc::ELOOP => {
                    msg.push_str(": too many symbolic link levels (ELOOP); possible symlink cycle.");
                }
                libc::ENAMETOOLONG => {
                    msg.push_str(": filename or path too long; shorten path segments.");
                }
                libc::EMFILE => {
                    msg.push_str(": process file descriptor limit reached; close files or raise limits.");
                }
                libc::ENFILE => {
                    msg.push_str(": system-wide file table overflow; reduce open files.");
                }
                _ => {}
            }
        }
        #[cfg(windows)]
        {
            // Common Win32 errors
            match code {
                5 => msg.push_str(": access denied; check permissions."),          // ERROR_ACCESS_DENIED
                17 => msg.push_str(": not same device; rename cannot cross devices."),   // ERROR_NOT_SAME_DEVICE
                32 => msg.push_str(": sharing violation; file is open elsewhere (exclusive open?)."),        // ERROR_SHARING_VIOLATION
                2 | 3 => msg.push_str(": path not found; verify it exists."),      // FILE/ PATH NOT FOUND
                80 => msg.push_str(": already exists; use RenameIfExists or OverwriteIfExists."),       // ERROR_FILE_EXISTS
                112 => msg.push_str(": insufficient disk space."),                 // ERROR_DISK_FULL
                19 => msg.push_str(": write protected / read-only media."),        // ERROR_WRITE_PROTECT
                206 => msg.push_str(": filename or path too long (MAX_PATH exceeded)."), // ERROR_FILENAME_EXCED_RANGE
                4 => msg.push_str(": too many open files; close handles or increase limit."), // ERROR_TOO_MANY_OPEN_FILES
                _ => {}
            }
        }
        // Include OS code for diagnostics
        msg.push_str(&format!(" [os code: {}]", code));
    } else {
        // Fallback to Kind-based hints
        match e.kind() {
            io::ErrorKind::PermissionDenied => {
                msg.push_str(": permission denied; check ownership and write permissions.");
            }
            io::ErrorKind::NotFound => {
                msg.push_str(": path not found; verify it exists.");
            }
            io::ErrorKind::AlreadyExists => {
                msg.push_str(": already exists; use RenameIfExists or OverwriteIfExists.");
            }
            io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => {
                msg.push_str(": busy/timed out; another opener holds the file.");
            }
            _ => {}
        }
    }

    msg
}

/// Adapter for anyhow::Result code.
/// Returns a closure suitable for `.map_err(...)` that converts io::Error -> anyhow::Error.
pub fn io_error_with_help<'a>(
    op: &'a str,
    path: &'a Path,
) -> impl FnOnce(io::Error) -> anyhow::Error + 'a {
    move |e: io::Error| anyhow!(describe_io_error(op, path, &e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notfound_fallback_hint_includes_path() {
        let p = Path::new("/nonexistent/path/for/test");
        let err = io_error_with_help("open", p)(io::Error::from(io::ErrorKind::NotFound));
        let msg = err.to_string();
        assert!(msg.contains("open"));
        assert!(msg.contains(p.to_string_lossy().as_ref()));
        assert!(msg.contains("path not found"));
    }

    #[cfg(unix)]
    #[test]
    fn raw_code_hint_and_code_present() {
        let msg = describe_io_error("write", Path::new("/tmp"), &io::Error::from_raw_os_error(libc::ENOSPC));
        assert!(msg.contains("insufficient space"), "msg was: {msg}");
        assert!(msg.contains("os code"));
    }

    #[cfg(unix)]
    #[test]
    fn exists_hint_points_at_collision_policies() {
        let msg = describe_io_error("create", Path::new("/tmp/x"), &io::Error::from_raw_os_error(libc::EEXIST));
        assert!(msg.contains("RenameIfExists"), "msg was: {msg}");
    }
}
