//! Persistence adapter
//!
//! A blocking string key-value store. Backends:
//! - [`MemoryStorage`]: in-process map, with a switch to simulate write failures
//! - [`FileStorage`]: one `<key>.json` file per key, written atomically
//!
//! Callers treat every failure as a warning; in-memory state stays
//! authoritative until a later save succeeds.

use crate::error::PersistenceError;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Durable key-value storage
pub trait StorageBackend: Send + Sync + std::fmt::Debug {
    /// Value under `key`, or `None` if nothing is stored
    ///
    /// # Errors
    /// `PersistenceError` if the backend cannot be read.
    fn read(&self, key: &str) -> Result<Option<String>, PersistenceError>;

    /// Store `value` under `key`, replacing any previous value
    ///
    /// # Errors
    /// `PersistenceError` if the write fails; the previous value is kept.
    fn write(&self, key: &str, value: &str) -> Result<(), PersistenceError>;
}

impl<S: StorageBackend + ?Sized> StorageBackend for Arc<S> {
    fn read(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        (**self).write(key, value)
    }
}

impl<S: StorageBackend + ?Sized> StorageBackend for Box<S> {
    fn read(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        (**self).write(key, value)
    }
}

/// In-process storage
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryStorage {
    /// Empty storage
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-filled with one value
    #[must_use]
    pub fn with_entry(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.lock().insert(key.into(), value.into());
        self
    }

    /// Make every following write fail (or succeed again)
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Raw value under `key`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    /// Successful writes so far
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl StorageBackend for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.get(key))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PersistenceError::Unavailable(format!("write to '{key}' refused")));
        }
        self.entries.lock().insert(key.to_string(), value.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// One JSON file per key under a directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Storage rooted at `dir`; the directory is created on first write
    #[inline]
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Root directory
    #[inline]
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding `key`
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl StorageBackend for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PersistenceError::io_error(path, e)),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| PersistenceError::io_error(&self.dir, e))?;

        let path = self.path_for(key);
        let mut file = tempfile::NamedTempFile::new_in(&self.dir)
            .map_err(|e| PersistenceError::io_error(&self.dir, e))?;
        file.write_all(value.as_bytes())
            .and_then(|()| file.flush())
            .map_err(|e| PersistenceError::io_error(file.path(), e))?;
        file.persist(&path)
            .map_err(|e| PersistenceError::io_error(&path, e.error))?;

        tracing::debug!(path = %path.display(), bytes = value.len(), "Stored");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_storage_failure_switch() {
        let storage = MemoryStorage::new();
        storage.write("k", "1").unwrap();

        storage.set_fail_writes(true);
        assert!(matches!(storage.write("k", "2"), Err(PersistenceError::Unavailable(_))));
        assert_eq!(storage.read("k").unwrap().as_deref(), Some("1"));

        storage.set_fail_writes(false);
        storage.write("k", "3").unwrap();
        assert_eq!(storage.get("k").as_deref(), Some("3"));
        assert_eq!(storage.write_count(), 2);
    }

    #[test]
    fn file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("data"));

        assert_eq!(storage.read("board").unwrap(), None);
        storage.write("board", r#"{"version":"3.0"}"#).unwrap();
        storage.write("board", r#"{"version":"3.1"}"#).unwrap();
        assert_eq!(storage.read("board").unwrap().as_deref(), Some(r#"{"version":"3.1"}"#));
        assert!(storage.path_for("board").exists());
    }

    #[test]
    fn shared_handle_delegates() {
        let storage = Arc::new(MemoryStorage::new());
        let handle: Arc<MemoryStorage> = Arc::clone(&storage);
        handle.write("k", "v").unwrap();
        assert_eq!(storage.get("k").as_deref(), Some("v"));
    }
}
