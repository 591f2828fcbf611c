//! Temporary file names.
//! Names are unique by construction within one process (pid + clock + sequence);
//! they are not re-checked against the directory.
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

pub const TEMP_PREFIX: &str = "pfs";

static COUNTER: AtomicU64 = AtomicU64::new(0);

/// Pattern: pfs-<pid>-<nanos>-<seq><ext>
/// `extension` must already be normalized (empty or starting with '.').
pub fn unique_temp_name(extension: &str) -> String {
    let pid = std::process::id();
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_nanos()).unwrap_or(0);
    let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{TEMP_PREFIX}-{pid}-{nanos}-{seq}{extension}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::thread;

    #[test]
    fn uniqueness_concurrent() {
        let mut handles = Vec::new();
        for _ in 0..32 { // modest concurrency
            handles.push(thread::spawn(|| unique_temp_name(".tmp")));
        }
        let mut set = HashSet::new();
        for h in handles { let n = h.join().unwrap(); assert!(set.insert(n)); }
        assert_eq!(set.len(), 32);
    }

    #[test]
    fn keeps_extension() {
        let n = unique_temp_name(".log");
        assert!(n.starts_with("pfs-"));
        assert!(n.ends_with(".log"));
        assert!(!unique_temp_name("").contains('.'));
    }
}
