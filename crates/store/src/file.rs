//! Durable file-backed snapshot storage.
//!
//! One file per snapshot, named `{identifier}{extension}`, plain-text
//! payload, stored flat in one directory per log. The directory may be
//! shared with unrelated files; anything that does not match the log's
//! identifier pattern is invisible to this store.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use snapkeep_core::{SnapshotLogSettings, name};
use tracing::debug;

use crate::backend::SnapshotStore;
use crate::error::{Result, StoreError};

/// File-system backend for one snapshot log.
///
/// A single instance-level mutex serializes touches to the directory.
/// There is no cross-process locking; the directory is owned by one
/// logical store instance at a time.
pub struct FileSnapshotStore {
    dir: PathBuf,
    log_name: String,
    extension: String,
    io_gate: Mutex<()>,
}

impl FileSnapshotStore {
    /// Open the store in `dir`, creating the directory if missing.
    pub fn open(settings: &SnapshotLogSettings, dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            log_name: settings.name().to_string(),
            extension: settings.file_extension().to_string(),
            io_gate: Mutex::new(()),
        })
    }

    /// Directory this store reads and writes.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn snapshot_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}{}", self.extension))
    }

    fn gate(&self) -> MutexGuard<'_, ()> {
        self.io_gate.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn write(&self, name: &str, payload: &str) -> Result<()> {
        let _gate = self.gate();
        fs::write(self.snapshot_path(name), payload)?;
        debug!(name, "snapshot written");
        Ok(())
    }

    fn read(&self, name: &str) -> Result<String> {
        let _gate = self.gate();
        match fs::read_to_string(self.snapshot_path(name)) {
            Ok(payload) => Ok(payload),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StoreError::NotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn list(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            let Some(stem) = file_name.strip_suffix(self.extension.as_str()) else {
                continue;
            };
            if name::matches(stem, &self.log_name) {
                names.push(stem.to_string());
            }
        }
        Ok(names)
    }

    fn remove(&self, name: &str) -> Result<()> {
        let _gate = self.gate();
        match fs::remove_file(self.snapshot_path(name)) {
            Ok(()) => Ok(()),
            // Already gone is fine; pruning can race external cleanup.
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn remove_all(&self) -> Result<()> {
        for name in self.list()? {
            self.remove(&name)?;
        }
        debug!(log = %self.log_name, "all snapshots removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDateTime, TimeDelta};

    fn settings() -> SnapshotLogSettings {
        SnapshotLogSettings::new("audit")
    }

    fn snapshot_name(sequence: u64) -> String {
        let at = NaiveDateTime::parse_from_str("2024-06-01 12:00:00", "%Y-%m-%d %H:%M:%S")
            .expect("valid test instant")
            .and_utc()
            + TimeDelta::seconds(sequence as i64);
        name::build("audit", at, sequence)
    }

    #[test]
    fn open_creates_the_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join("snapshots");
        let store = FileSnapshotStore::open(&settings(), &dir).unwrap();
        assert!(store.dir().is_dir());
    }

    #[test]
    fn write_then_read_roundtrip() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileSnapshotStore::open(&settings(), tmp.path()).unwrap();
        let name = snapshot_name(0);

        store.write(&name, "{\"answer\":42}").unwrap();
        assert_eq!(store.read(&name).unwrap(), "{\"answer\":42}");
    }

    #[test]
    fn read_missing_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileSnapshotStore::open(&settings(), tmp.path()).unwrap();

        let err = store.read(&snapshot_name(0)).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn remove_missing_is_a_noop() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileSnapshotStore::open(&settings(), tmp.path()).unwrap();

        store.remove(&snapshot_name(0)).unwrap();
    }

    #[test]
    fn list_sees_only_this_logs_snapshots() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileSnapshotStore::open(&settings(), tmp.path()).unwrap();
        let mine = snapshot_name(0);
        store.write(&mine, "{}").unwrap();

        // Unrelated residents of the same directory.
        std::fs::write(tmp.path().join("README.md"), "# notes").unwrap();
        std::fs::write(tmp.path().join("audit_notes.json"), "{}").unwrap();
        let other_log = name::build(
            "billing",
            NaiveDateTime::parse_from_str("2024-06-01 12:00:00", "%Y-%m-%d %H:%M:%S")
                .unwrap()
                .and_utc(),
            0,
        );
        std::fs::write(tmp.path().join(format!("{other_log}.json")), "{}").unwrap();
        // Right shape, wrong extension.
        std::fs::write(tmp.path().join(format!("{}.txt", snapshot_name(1))), "{}").unwrap();

        assert_eq!(store.list().unwrap(), vec![mine]);
    }

    #[test]
    fn remove_all_leaves_foreign_files_alone() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileSnapshotStore::open(&settings(), tmp.path()).unwrap();
        store.write(&snapshot_name(0), "{}").unwrap();
        store.write(&snapshot_name(1), "{}").unwrap();
        std::fs::write(tmp.path().join("keep.json"), "{}").unwrap();

        store.remove_all().unwrap();

        assert!(store.list().unwrap().is_empty());
        assert!(tmp.path().join("keep.json").exists());
    }
}
