use crate::error::Result;

/// Storage contract for named, serialized snapshot payloads.
///
/// Implementations persist opaque text under unique names and never
/// interpret payload content. The save-then-prune workflow and retention
/// decisions live in [`crate::SnapshotLog`], which depends only on this
/// contract, so backends stay swappable.
///
/// Implementations:
/// - [`crate::FileSnapshotStore`]: one file per snapshot in a flat
///   directory
/// - [`crate::MemorySnapshotStore`]: process-local map, optimistic
///   concurrency
pub trait SnapshotStore: Send + Sync {
    /// Persist `payload` under `name`. Names are unique per log, so
    /// overwrites are not expected.
    fn write(&self, name: &str, payload: &str) -> Result<()>;

    /// Payload stored under `name`, or [`crate::StoreError::NotFound`].
    fn read(&self, name: &str) -> Result<String>;

    /// All snapshot names present for this log. Entries that merely share
    /// the storage location but do not match the log's identifier pattern
    /// are excluded.
    fn list(&self) -> Result<Vec<String>>;

    /// Remove one snapshot. Removing a name that is already gone is a
    /// no-op: pruning races with external deletion are harmless.
    fn remove(&self, name: &str) -> Result<()>;

    /// Remove every snapshot of this log.
    fn remove_all(&self) -> Result<()>;
}
