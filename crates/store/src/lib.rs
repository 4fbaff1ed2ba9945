//! Snapshot persistence: storage backends behind one contract, the
//! serializer contract with a JSON default, and the [`SnapshotLog`] facade
//! that composes naming, serialization, storage, and pruning.
//!
//! # Invariants
//! - Snapshots are immutable once written; only deletion removes them.
//! - Every save is followed by a retention prune before it returns.
//! - Backends never interpret payloads; they move opaque text.

pub mod backend;
pub mod error;
pub mod file;
pub mod log;
pub mod memory;
pub mod serialize;

pub use backend::SnapshotStore;
pub use error::{Result, StoreError};
pub use file::FileSnapshotStore;
pub use log::SnapshotLog;
pub use memory::{MemoryRegistry, MemorySnapshotStore};
pub use serialize::{JsonSerializer, Serializer};
