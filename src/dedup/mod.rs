//! Dedup Filter (§4.3): a persistent, approximate set of already-seen CIDs.
//!
//! False positives (skipping a CID incorrectly) are tolerable; false
//! negatives within a single session are not (§3). `BloomSeenSet` wraps a
//! `growable_bloom_filter::GrowableBloom` — a scalable bloom filter that
//! grows without a rebuild, matching §4.3's "grow without rebuild"
//! requirement — behind a single mutex so a caller can hold the guard across
//! both the membership check and the insert and get the atomic
//! check-then-add that §5 requires (Invariant 1).

use std::path::Path;
use std::sync::Mutex;

use growable_bloom_filter::GrowableBloom;

use crate::error::DedupError;

/// Target false-positive rate for the underlying bloom filter. Not exposed
/// as config — §4.3 only asks for a capacity, not a tunable error rate.
const FALSE_POSITIVE_RATE: f64 = 0.01;

/// Approximate set-membership over CIDs, durable across restarts.
pub struct BloomSeenSet {
    inner: Mutex<GrowableBloom>,
}

impl BloomSeenSet {
    /// A fresh, empty filter sized for `initial_capacity` entries.
    pub fn new(initial_capacity: usize) -> Self {
        Self {
            inner: Mutex::new(GrowableBloom::new(FALSE_POSITIVE_RATE, initial_capacity)),
        }
    }

    /// Restore from `path` if it exists, else build a fresh filter (§4.3
    /// persistence: "if absent, create a fresh filter").
    pub fn restore(path: &Path, initial_capacity: usize) -> Result<Self, DedupError> {
        match std::fs::read(path) {
            Ok(bytes) => {
                let filter: GrowableBloom = bincode::deserialize(&bytes)?;
                Ok(Self {
                    inner: Mutex::new(filter),
                })
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Ok(Self::new(initial_capacity))
            }
            Err(source) => Err(DedupError::Io {
                path: path.display().to_string(),
                source,
            }),
        }
    }

    /// Snapshot the filter to `path`, creating parent directories as needed.
    pub fn snapshot(&self, path: &Path) -> Result<(), DedupError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| DedupError::Io {
                path: path.display().to_string(),
                source,
            })?;
        }
        let bytes = {
            let guard = self.inner.lock().expect("dedup mutex poisoned");
            bincode::serialize(&*guard)?
        };
        std::fs::write(path, bytes).map_err(|source| DedupError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    /// Atomically test-and-insert: returns `true` if `cid` had already been
    /// seen (in which case it was *not* re-inserted — it's already there),
    /// `false` if it was newly added. Callers use this single call instead
    /// of separate `contains`/`add` to get the atomicity §5 requires.
    pub fn check_and_insert(&self, cid: &str) -> bool {
        let mut guard = self.inner.lock().expect("dedup mutex poisoned");
        guard.insert(cid)
    }

    /// Pure membership test, for read-only diagnostics (`status` CLI
    /// command); crawl workers should use `check_and_insert` instead.
    pub fn contains(&self, cid: &str) -> bool {
        let guard = self.inner.lock().expect("dedup mutex poisoned");
        guard.contains(cid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn check_and_insert_is_monotonic() {
        let set = BloomSeenSet::new(1_000);
        assert!(!set.check_and_insert("Qm1"));
        assert!(set.check_and_insert("Qm1"));
        assert!(set.check_and_insert("Qm1"));
    }

    #[test]
    fn restore_without_snapshot_yields_fresh_filter() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bloom-filter");
        let set = BloomSeenSet::restore(&path, 1_000).unwrap();
        assert!(!set.contains("Qm1"));
    }

    #[test]
    fn snapshot_round_trips_contains_truth_table() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bloom-filter");

        let set = BloomSeenSet::new(1_000);
        for cid in ["Qm1", "Qm2", "Qm3"] {
            set.check_and_insert(cid);
        }
        set.snapshot(&path).unwrap();

        let restored = BloomSeenSet::restore(&path, 1_000).unwrap();
        for cid in ["Qm1", "Qm2", "Qm3"] {
            assert!(restored.contains(cid));
        }
    }
}
