//! Platform-specific helpers and the platform context.
//! OS differences (Unix/Windows) sit behind a uniform API so the rest of the
//! codebase can remain platform-agnostic.
//!
//! `PlatformContext` is built once, validated at construction, and handed to
//! the facade explicitly. There is no process-wide binding to initialize.

pub mod temp;
#[cfg(unix)]
mod unix;
#[cfg(windows)]
mod windows;

#[cfg(unix)]
pub use unix::{configure_open, lock_exclusive, open_log_file_secure_append, truncate_unheld};

#[cfg(windows)]
pub use windows::{configure_open, lock_exclusive, open_log_file_secure_append, truncate_unheld};

use std::path::{Path, PathBuf};

use crate::errors::FsError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformContext {
    temp_root: PathBuf,
    identity: String,
}

impl PlatformContext {
    /// Bind to an explicit temp root. It must already exist as a directory.
    pub fn new(temp_root: impl Into<PathBuf>) -> Result<Self, FsError> {
        let temp_root = temp_root.into();
        if temp_root.as_os_str().is_empty() {
            return Err(FsError::InvalidPlatform("temp root is empty".into()));
        }
        if !temp_root.is_dir() {
            return Err(FsError::InvalidPlatform(format!(
                "temp root '{}' is not an existing directory",
                temp_root.display()
            )));
        }
        Ok(Self {
            temp_root,
            identity: format!("{}/{}", std::env::consts::OS, std::env::consts::FAMILY),
        })
    }

    /// Bind to the OS temp directory.
    pub fn system() -> Result<Self, FsError> {
        Self::new(std::env::temp_dir())
    }

    pub fn temp_root(&self) -> &Path {
        &self.temp_root
    }

    /// "os/family", e.g. "linux/unix".
    pub fn identity(&self) -> &str {
        &self.identity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn accepts_existing_directory() {
        let td = tempdir().unwrap();
        let ctx = PlatformContext::new(td.path()).unwrap();
        assert_eq!(ctx.temp_root(), td.path());
        assert!(ctx.identity().contains('/'));
    }

    #[test]
    fn rejects_missing_or_file_roots() {
        let td = tempdir().unwrap();
        let missing = td.path().join("nope");
        assert!(matches!(PlatformContext::new(&missing), Err(FsError::InvalidPlatform(_))));

        let file = td.path().join("f");
        std::fs::write(&file, b"x").unwrap();
        assert!(matches!(PlatformContext::new(&file), Err(FsError::InvalidPlatform(_))));

        assert!(matches!(PlatformContext::new(""), Err(FsError::InvalidPlatform(_))));
    }

    #[test]
    fn system_context_uses_os_temp() {
        let ctx = PlatformContext::system().unwrap();
        assert_eq!(ctx.temp_root(), std::env::temp_dir());
    }
}
