//! The snapshot log facade: naming, serialization, storage, and pruning
//! composed into the public save/load workflow.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use serde::de::DeserializeOwned;
use snapkeep_core::{Clock, SnapshotLogSettings, SystemClock, name, retention};
use tracing::debug;

use crate::backend::SnapshotStore;
use crate::error::Result;
use crate::file::FileSnapshotStore;
use crate::memory::{MemoryRegistry, MemorySnapshotStore};
use crate::serialize::{JsonSerializer, Serializer};

/// A log of immutable snapshots of one value type, with tiered retention.
///
/// Each save writes a new snapshot under a fresh sortable identifier and
/// then prunes whatever the retention policy no longer wants. The newest
/// snapshot and the configured floor count always survive pruning.
///
/// The save counter that disambiguates same-instant saves is owned by this
/// instance and resets on restart; it is not a cross-process coordination
/// mechanism. Identifier uniqueness across instances rests on the 100 ns
/// timestamp resolution.
pub struct SnapshotLog<T> {
    settings: SnapshotLogSettings,
    store: Box<dyn SnapshotStore>,
    serializer: Box<dyn Serializer<T>>,
    clock: Arc<dyn Clock>,
    saves: AtomicU64,
}

impl<T> SnapshotLog<T> {
    /// Compose a log from explicit parts. The convenience constructors
    /// [`SnapshotLog::file`] and [`SnapshotLog::in_memory`] cover the
    /// common JSON + wall-clock case.
    pub fn new(
        settings: SnapshotLogSettings,
        store: Box<dyn SnapshotStore>,
        serializer: Box<dyn Serializer<T>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            settings,
            store,
            serializer,
            clock,
            saves: AtomicU64::new(0),
        }
    }

    pub fn settings(&self) -> &SnapshotLogSettings {
        &self.settings
    }

    /// Persist `value` as a new snapshot and prune aged ones.
    ///
    /// Returns the new snapshot's identifier. Pruning runs after every
    /// save, unconditionally.
    pub fn save(&self, value: &T) -> Result<String> {
        let name = self.next_name();
        let payload = self.serializer.serialize(value)?;
        self.store.write(&name, &payload)?;
        self.prune()?;
        Ok(name)
    }

    /// Load the snapshot stored under `name`.
    pub fn load(&self, name: &str) -> Result<T> {
        let payload = self.store.read(name)?;
        self.serializer.deserialize(&payload)
    }

    /// Load the most recently saved snapshot, or the type's default value
    /// when nothing has ever been saved. "Never saved" is an ordinary
    /// state here, not a lookup failure.
    pub fn load_latest(&self) -> Result<T>
    where
        T: Default,
    {
        match self.latest_name()? {
            Some(name) => self.load(&name),
            None => Ok(T::default()),
        }
    }

    /// Identifier of the most recent snapshot, if any. Identifiers sort
    /// chronologically, so this is the case-insensitive lexicographic max.
    pub fn latest_name(&self) -> Result<Option<String>> {
        let names = self.store.list()?;
        Ok(names.into_iter().max_by_key(|n| n.to_lowercase()))
    }

    /// All snapshot identifiers currently stored for this log.
    pub fn names(&self) -> Result<Vec<String>> {
        self.store.list()
    }

    /// Delete one snapshot. Deleting one that is already gone is a no-op.
    pub fn delete(&self, name: &str) -> Result<()> {
        self.store.remove(name)
    }

    /// Delete every snapshot of this log.
    pub fn delete_all(&self) -> Result<()> {
        self.store.remove_all()
    }

    /// Delete everything the retention policy no longer wants, and return
    /// what was deleted. Runs after every save; also callable on its own
    /// schedule.
    pub fn prune(&self) -> Result<Vec<String>> {
        let names = self.store.list()?;
        let doomed = retention::eligible_for_deletion(&self.settings, self.clock.now(), &names)?;
        for name in &doomed {
            self.store.remove(name)?;
        }
        if !doomed.is_empty() {
            debug!(
                log = %self.settings.name(),
                pruned = doomed.len(),
                "aged snapshots pruned"
            );
        }
        Ok(doomed)
    }

    fn next_name(&self) -> String {
        let sequence = self.saves.fetch_add(1, Ordering::Relaxed);
        name::build(self.settings.name(), self.clock.now(), sequence)
    }
}

impl<T> SnapshotLog<T>
where
    T: Serialize + DeserializeOwned,
{
    /// File-backed log in `dir` with the JSON serializer and wall clock.
    pub fn file(settings: SnapshotLogSettings, dir: impl AsRef<Path>) -> Result<Self> {
        let store = FileSnapshotStore::open(&settings, dir)?;
        Ok(Self::new(
            settings,
            Box::new(store),
            Box::new(JsonSerializer),
            Arc::new(SystemClock),
        ))
    }

    /// In-memory log on `registry` with the JSON serializer and wall
    /// clock.
    pub fn in_memory(settings: SnapshotLogSettings, registry: Arc<MemoryRegistry>) -> Self {
        let store = MemorySnapshotStore::open(&settings, registry);
        Self::new(
            settings,
            Box::new(store),
            Box::new(JsonSerializer),
            Arc::new(SystemClock),
        )
    }
}
