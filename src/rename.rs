//! Rename-suffix generator.
//!
//! Given a colliding target, produce a sibling `{stem}-{n}{extension}` for
//! n = 2, 3, ... until the existence probe reports a free name.
//!
//! Notes:
//! - Every candidate is re-probed; the answer comes from live state, not arithmetic.
//! - The search has no upper bound. A directory holding every candidate would spin.
//! - Callers should hold a lock around probe + create if they race other writers.

use std::path::Path;
use tracing::trace;

use crate::path::FsPath;

pub const FIRST_SUFFIX: u64 = 2;
pub const SUFFIX_SEPARATOR: char = '-';

// Conservative filename limits (bytes, platform-specific and approximate).
#[cfg(windows)]
pub const MAX_FILENAME_LEN: usize = 240; // leave headroom for legacy MAX_PATH
#[cfg(not(windows))]
pub const MAX_FILENAME_LEN: usize = 255; // typical POSIX/EXT limits

/// Find the first free `{stem}-{n}{ext}` sibling of `target`, starting at n = 2.
pub fn unique_sibling(target: &FsPath, mut exists: impl FnMut(&Path) -> bool) -> FsPath {
    let mut n = FIRST_SUFFIX;
    loop {
        let name = suffixed_name(target.name(), target.extension(), n);
        let candidate = target.with_file_name(&name);
        if !exists(candidate.as_path()) {
            trace!(target = %target, candidate = %candidate, n, "rename: free sibling found");
            return candidate;
        }
        if n - FIRST_SUFFIX == 3 {
            trace!(target = %target, "rename: multiple collisions, continuing to search unique suffix");
        }
        n = n.saturating_add(1);
    }
}

/// Build `{stem}-{n}{ext}`, shortening the stem if the result would not fit
/// in a single path component.
pub fn suffixed_name(stem: &str, extension: &str, n: u64) -> String {
    let suffix = format!("{SUFFIX_SEPARATOR}{n}");
    let overhead = suffix.len() + extension.len();
    let budget = MAX_FILENAME_LEN.saturating_sub(overhead);

    let mut kept = String::with_capacity(stem.len().min(budget));
    for ch in stem.chars() {
        if kept.len() + ch.len_utf8() > budget {
            break;
        }
        kept.push(ch);
    }
    if kept.is_empty() {
        // Pathologically small budget or empty stem; keep the name non-empty.
        kept.push('f');
    }

    format!("{kept}{suffix}{extension}")
}
