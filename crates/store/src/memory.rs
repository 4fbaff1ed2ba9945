//! Volatile in-memory snapshot storage.
//!
//! A [`MemoryRegistry`] holds one frozen name→payload map per log. Stores
//! update their log's map with optimistic concurrency: read the current
//! frozen map, build the replacement, then swap it in only if nobody else
//! got there first, retrying a bounded number of times. Concurrent
//! in-process writers proceed without blocking each other at a small,
//! bounded retry cost. Mainly for tests and single-process ephemeral use.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use snapkeep_core::SnapshotLogSettings;
use tracing::debug;

use crate::backend::SnapshotStore;
use crate::error::{Result, StoreError};

/// Immutable view of one log's snapshots.
type Frozen = Arc<HashMap<String, String>>;

/// Attempts an optimistic update makes before giving up.
const MAX_UPDATE_ATTEMPTS: u32 = 10;

/// Shared state behind every [`MemorySnapshotStore`], keyed by log name.
///
/// Constructed explicitly and passed in by whoever composes the stores,
/// so lifetime and test isolation are visible: one registry per process,
/// or one per test run.
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    logs: Mutex<HashMap<String, Frozen>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Frozen>> {
        self.logs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// In-memory backend for one snapshot log.
pub struct MemorySnapshotStore {
    registry: Arc<MemoryRegistry>,
    log_name: String,
}

impl MemorySnapshotStore {
    pub fn open(settings: &SnapshotLogSettings, registry: Arc<MemoryRegistry>) -> Self {
        Self {
            registry,
            log_name: settings.name().to_string(),
        }
    }

    /// Apply `apply` to the current frozen map and swap the result in.
    ///
    /// Compare-and-swap on pointer identity of the frozen map; a lost race
    /// retries from a fresh read, up to [`MAX_UPDATE_ATTEMPTS`] times.
    fn update<F>(&self, apply: F) -> Result<()>
    where
        F: Fn(&HashMap<String, String>) -> HashMap<String, String>,
    {
        for _ in 0..MAX_UPDATE_ATTEMPTS {
            let observed: Frozen = {
                let mut logs = self.registry.lock();
                logs.entry(self.log_name.clone()).or_default().clone()
            };

            let updated = Arc::new(apply(&observed));

            let mut logs = self.registry.lock();
            match logs.get_mut(&self.log_name) {
                Some(current) if Arc::ptr_eq(current, &observed) => {
                    *current = updated;
                    return Ok(());
                }
                // Either another writer swapped the map or the namespace
                // was dropped entirely; re-read and try again.
                _ => continue,
            }
        }

        Err(StoreError::Contention {
            attempts: MAX_UPDATE_ATTEMPTS,
        })
    }

    fn snapshots(&self) -> Option<Frozen> {
        self.registry.lock().get(&self.log_name).cloned()
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn write(&self, name: &str, payload: &str) -> Result<()> {
        self.update(|snapshots| {
            let mut next = snapshots.clone();
            next.insert(name.to_string(), payload.to_string());
            next
        })
    }

    fn read(&self, name: &str) -> Result<String> {
        self.snapshots()
            .and_then(|snapshots| snapshots.get(name).cloned())
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    fn list(&self) -> Result<Vec<String>> {
        Ok(self
            .snapshots()
            .map(|snapshots| snapshots.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn remove(&self, name: &str) -> Result<()> {
        self.update(|snapshots| {
            let mut next = snapshots.clone();
            next.remove(name);
            next
        })
    }

    fn remove_all(&self) -> Result<()> {
        self.registry.lock().remove(&self.log_name);
        debug!(log = %self.log_name, "log namespace dropped");
        Ok(())
    }
}
