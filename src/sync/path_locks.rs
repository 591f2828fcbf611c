//! One `AsyncLock` per path.
//!
//! The facade does not order concurrent calls on the same path. Callers that
//! need ordering take the path's lock around their calls:
//!
//! ```ignore
//! let _held = locks.acquire(path).await;
//! fs.open_file(&target, mode, method).await?;
//! ```
//!
//! Entries nobody refers to any more are pruned on the next lookup.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use super::{AsyncLock, Releaser};

#[derive(Debug, Clone, Default)]
pub struct PathLocks {
    locks: Arc<Mutex<HashMap<PathBuf, AsyncLock>>>,
}

impl PathLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// The lock guarding `path`. Equal paths share one lock.
    pub fn lock_for(&self, path: impl AsRef<Path>) -> AsyncLock {
        let mut map = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        map.retain(|_, lock| !lock.is_idle());
        map.entry(path.as_ref().to_path_buf()).or_default().clone()
    }

    pub async fn acquire(&self, path: impl AsRef<Path>) -> Releaser {
        self.lock_for(path).acquire().await
    }

    /// Number of paths with a live lock.
    pub fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
