//! Core snapshot-log logic: identifier codec, tiered retention policy,
//! settings, and clock abstraction. No I/O lives here.
//!
//! # Invariants
//! - Identifiers from one log sort lexicographically in creation order.
//! - Retention never deletes the newest snapshot or the configured floor.
//! - Malformed identifiers surface as errors, never as silent coercions.

pub mod clock;
pub mod name;
pub mod retention;
pub mod settings;

pub use clock::{Clock, ManualClock, SystemClock};
pub use name::NameError;
pub use settings::SnapshotLogSettings;
