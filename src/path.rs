//! Path handle with eager name decomposition.
//! - `name` is the stem (no extension).
//! - `extension` is empty or starts with '.'.
//! - `directory` is the containing folder.
//! - `is_directory` is declared by the caller and never checked against disk.
//!
//! Decomposition is pure string work; nothing here touches the file system.

use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};

pub const EXTENSION_SEPARATOR: char = '.';

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FsPath {
    full: PathBuf,
    name: String,
    extension: String,
    directory: PathBuf,
    is_directory: bool,
}

impl FsPath {
    /// A path the caller declares to be a file.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::new(path, false)
    }

    /// A path the caller declares to be a directory.
    pub fn directory(path: impl Into<PathBuf>) -> Self {
        Self::new(path, true)
    }

    pub fn new(path: impl Into<PathBuf>, is_directory: bool) -> Self {
        let full = path.into();
        let (name, extension) = if is_directory {
            (lossy(full.file_name()), String::new())
        } else {
            split_name(&full)
        };
        let directory = full
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self {
            full,
            name,
            extension,
            directory,
            is_directory,
        }
    }

    pub fn as_path(&self) -> &Path {
        &self.full
    }

    pub fn into_path_buf(self) -> PathBuf {
        self.full
    }

    /// Stem without extension.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Extension including its leading separator, or "".
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// `name + extension`.
    pub fn full_name(&self) -> String {
        format!("{}{}", self.name, self.extension)
    }

    pub fn directory_path(&self) -> &Path {
        &self.directory
    }

    pub fn is_directory(&self) -> bool {
        self.is_directory
    }

    pub fn is_empty(&self) -> bool {
        self.full.as_os_str().is_empty()
    }

    /// Sibling in the same directory with a different file name.
    pub fn with_file_name(&self, file_name: impl AsRef<OsStr>) -> Self {
        Self::new(self.directory.join(file_name.as_ref()), self.is_directory)
    }
}

impl fmt::Display for FsPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full.display())
    }
}

impl AsRef<Path> for FsPath {
    fn as_ref(&self) -> &Path {
        &self.full
    }
}

impl From<&str> for FsPath {
    fn from(s: &str) -> Self {
        FsPath::file(s)
    }
}

impl From<PathBuf> for FsPath {
    fn from(p: PathBuf) -> Self {
        FsPath::file(p)
    }
}

impl From<&Path> for FsPath {
    fn from(p: &Path) -> Self {
        FsPath::file(p)
    }
}

/// Normalize an extension so it carries exactly one leading separator.
/// "log" -> ".log", ".log" -> ".log", "" -> "".
pub fn normalize_extension(ext: &str) -> String {
    let trimmed = ext.trim().trim_start_matches(EXTENSION_SEPARATOR);
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{EXTENSION_SEPARATOR}{trimmed}")
    }
}

fn lossy(s: Option<&OsStr>) -> String {
    s.map(|s| s.to_string_lossy().into_owned()).unwrap_or_default()
}

// Follows std's stem/extension split: "archive.tar.gz" -> ("archive.tar", ".gz"),
// ".env" -> (".env", "").
fn split_name(path: &Path) -> (String, String) {
    let stem = path.file_stem().or_else(|| path.file_name());
    let ext = path
        .extension()
        .map(|e| format!("{EXTENSION_SEPARATOR}{}", e.to_string_lossy()))
        .unwrap_or_default();
    (lossy(stem), ext)
}
