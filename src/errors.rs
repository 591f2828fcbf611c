//! Typed error definitions for portable_fs.
//! Provides a small set of well-known failure modes for better logs and tests.
//!
//! Only `InvalidArgument` ever reaches callers of the facade as an `Err`; the
//! rest are collapsed into a negative result by [`settle`].

use std::io;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum FsError {
    #[error("Invalid argument for {op}: {reason}")]
    InvalidArgument { op: &'static str, reason: &'static str },

    #[error("Collision policy refused {op} on {path}")]
    Rejected { op: &'static str, path: PathBuf },

    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Not a file: {0}")]
    NotAFile(PathBuf),

    #[error("{}", crate::helpers::describe_io_error(.op, .path, .source))]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Background worker for {op} did not complete: {reason}")]
    Background { op: &'static str, reason: String },

    #[error("Invalid platform context: {0}")]
    InvalidPlatform(String),
}

impl FsError {
    /// Stable numeric code for logs and exit statuses.
    pub fn code(&self) -> i32 {
        match self {
            FsError::InvalidArgument { .. } => 2,
            FsError::Rejected { .. } => 3,
            FsError::NotADirectory(_) => 4,
            FsError::Io { .. } => 5,
            FsError::Background { .. } => 6,
            FsError::InvalidPlatform(_) => 7,
            FsError::NotAFile(_) => 8,
        }
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, FsError::InvalidArgument { .. })
    }

    /// Build an `Io` variant; usable with `map_err`.
    pub fn io(op: &'static str, path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> FsError {
        let path = path.into();
        move |source| FsError::Io { op, path, source }
    }
}

/// Collapse an internal result into the facade contract.
///
/// `InvalidArgument` passes through as `Err`. Every other failure is logged and
/// becomes `Ok(None)`, which callers read as "operation did not happen".
pub fn settle<T>(op: &'static str, result: Result<T, FsError>) -> Result<Option<T>, FsError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_invalid_argument() => Err(e),
        Err(e) => {
            debug!(op, code = e.code(), error = %e, "operation collapsed to negative result");
            Ok(None)
        }
    }
}

/// `settle` for operations whose positive result is a plain success flag.
pub fn settle_flag(op: &'static str, result: Result<bool, FsError>) -> Result<bool, FsError> {
    Ok(settle(op, result)?.unwrap_or(false))
}
