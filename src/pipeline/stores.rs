// src/pipeline/stores.rs

//! Shared bookkeeping stores for the regeneration pipeline.
//!
//! Each store owns its backing map behind its own mutex and exposes only the
//! atomic check-and-set operation the pipeline needs, so lock discipline
//! cannot be violated at call sites. These three stores are the only mutable
//! state touched by more than one worker.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::SystemTime;

/// Last processed modification time per input file. Monotonic per path: an
/// update is accepted only if strictly newer than the stored value. Entries
/// are never removed.
#[derive(Debug, Default)]
pub struct ModTimeStore {
    inner: Mutex<HashMap<PathBuf, SystemTime>>,
}

impl ModTimeStore {
    /// Stat `path` and record its modification time if it is strictly newer
    /// than the stored one. The time is read from the filesystem, not from
    /// the triggering event, since notification systems can report stale or
    /// coalesced writes.
    ///
    /// A failed stat (file removed between notification and check) is
    /// reported as "not updated", never as an error.
    pub fn upsert_if_newer(&self, path: &Path) -> (Option<SystemTime>, bool) {
        let modified = match fs::metadata(path).and_then(|meta| meta.modified()) {
            Ok(time) => time,
            Err(_) => return (None, false),
        };
        let mut map = self.inner.lock().expect("modtime store lock poisoned");
        match map.get(path) {
            Some(previous) if modified <= *previous => (Some(modified), false),
            _ => {
                map.insert(path.to_path_buf(), modified);
                (Some(modified), true)
            }
        }
    }
}

/// Last content hash written per output artifact. Suppresses redundant
/// writes of byte-identical output.
#[derive(Debug, Default)]
pub struct HashStore {
    inner: Mutex<HashMap<PathBuf, blake3::Hash>>,
}

impl HashStore {
    /// Compare-and-swap: if `digest` differs from the stored digest for
    /// `key`, record it and return true. The comparison and the store happen
    /// under one critical section so two workers cannot both decide to write
    /// the same artifact.
    pub fn upsert_if_changed(&self, key: &Path, digest: blake3::Hash) -> bool {
        let mut map = self.inner.lock().expect("hash store lock poisoned");
        match map.get(key) {
            Some(previous) if *previous == digest => false,
            _ => {
                map.insert(key.to_path_buf(), digest);
                true
            }
        }
    }
}

/// Set of input paths currently in a failed state. Membership is toggled on
/// every regeneration attempt; it exists only to detect the transition from
/// error to non-error for reporting, never to block future attempts.
#[derive(Debug, Default)]
pub struct ErrorRegistry {
    inner: Mutex<HashSet<PathBuf>>,
}

impl ErrorRegistry {
    /// Record the outcome of a regeneration attempt for `path`. Returns
    /// whether the path was previously failing and the number of paths still
    /// in a failed state.
    pub fn set_error(&self, path: &Path, has_error: bool) -> (bool, usize) {
        let mut set = self.inner.lock().expect("error registry lock poisoned");
        let previously_had_error = set.remove(path);
        if has_error {
            set.insert(path.to_path_buf());
        }
        (previously_had_error, set.len())
    }
}
