//! Key-value slots
//!
//! A slot is a named string value. `FileSlots` keeps each slot in its own
//! file under the data directory and survives restarts; `MemorySlots`
//! lives only as long as the process (a "session").
//!
//! Files written by `FileSlots`:
//! - `<data_dir>/<key>.json`

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use super::error::{StorageError, StorageResult};

/// A store of named string slots
pub trait SlotStore: Send + Sync {
    /// Read a slot, `None` if it was never written
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Write a slot, replacing any previous value
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Delete a slot (no-op if absent)
    fn remove(&self, key: &str) -> StorageResult<()>;
}

/// Durable slots backed by files in a directory
#[derive(Debug, Clone)]
pub struct FileSlots {
    dir: PathBuf,
}

impl FileSlots {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory the slot files live in
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing a slot
    pub fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Whether a slot file exists
    pub fn exists(&self, key: &str) -> bool {
        self.slot_path(key).exists()
    }
}

impl SlotStore for FileSlots {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.slot_path(key);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::reading(e, path)),
        }
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        atomic_write(&self.slot_path(key), value.as_bytes())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let path = self.slot_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::writing(e, path)),
        }
    }
}

/// Session-scoped slots held in memory
#[derive(Debug, Default)]
pub struct MemorySlots {
    values: Mutex<HashMap<String, String>>,
}

impl MemorySlots {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SlotStore for MemorySlots {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.remove(key);
        Ok(())
    }
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
///
/// The target file is never left partially written.
fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StorageError::CreateDirectory {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let temp_path = path.with_extension("tmp");

    let mut file =
        File::create(&temp_path).map_err(|e| StorageError::writing(e, temp_path.clone()))?;

    file.write_all(data)
        .map_err(|e| StorageError::writing(e, temp_path.clone()))?;

    file.sync_all()
        .map_err(|e| StorageError::writing(e, temp_path.clone()))?;

    fs::rename(&temp_path, path).map_err(|source| StorageError::Replace {
        from: temp_path.clone(),
        to: path.to_path_buf(),
        source,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_slots_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let slots = FileSlots::new(temp_dir.path());

        assert!(slots.get("quotes").unwrap().is_none());
        assert!(!slots.exists("quotes"));

        slots.set("quotes", "[]").unwrap();
        assert!(slots.exists("quotes"));
        assert_eq!(slots.get("quotes").unwrap().as_deref(), Some("[]"));

        slots.set("quotes", "[1]").unwrap();
        assert_eq!(slots.get("quotes").unwrap().as_deref(), Some("[1]"));
    }

    #[test]
    fn test_file_slots_remove() {
        let temp_dir = TempDir::new().unwrap();
        let slots = FileSlots::new(temp_dir.path());

        slots.set("quotes", "[]").unwrap();
        slots.remove("quotes").unwrap();
        assert!(!slots.exists("quotes"));

        // Removing a missing slot is fine
        slots.remove("quotes").unwrap();
    }

    #[test]
    fn test_file_slots_leave_no_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let slots = FileSlots::new(temp_dir.path());

        slots.set("quotes", "[]").unwrap();
        assert!(!temp_dir.path().join("quotes.tmp").exists());
    }

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let nested_path = temp_dir
            .path()
            .join("a")
            .join("b")
            .join("c")
            .join("file.txt");

        atomic_write(&nested_path, b"test data").unwrap();

        let content = fs::read_to_string(&nested_path).unwrap();
        assert_eq!(content, "test data");
    }

    #[test]
    fn test_file_slots_unwritable_dir() {
        let temp_dir = TempDir::new().unwrap();
        // A regular file where the directory should be
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, "x").unwrap();
        let slots = FileSlots::new(blocker.join("data"));

        assert!(slots.set("quotes", "[]").is_err());
    }

    #[test]
    fn test_memory_slots() {
        let slots = MemorySlots::new();

        assert!(slots.get("lastShownIndex").unwrap().is_none());
        slots.set("lastShownIndex", "2").unwrap();
        assert_eq!(slots.get("lastShownIndex").unwrap().as_deref(), Some("2"));
        slots.remove("lastShownIndex").unwrap();
        assert!(slots.get("lastShownIndex").unwrap().is_none());
    }
}
