/*
    persistence.rs - Local key/value slots

    The only state that outlives the process is the OAuth credential map,
    stored as a JSON string under a single key. Reads and writes are
    synchronous.

    - FileSlotStore: one file per key under a data directory, replaced
      atomically through a temporary file
    - MemorySlotStore: process-local map for tests and ephemeral sessions
*/

use super::errors::PersistenceError;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

/// Synchronous string slots keyed by name
pub trait SlotStore: Send + Sync {
    /// Stored value, `None` when the key was never written
    fn read(&self, key: &str) -> Result<Option<String>, PersistenceError>;

    /// Replace the value under `key`
    fn write(&self, key: &str, value: &str) -> Result<(), PersistenceError>;
}

/// File-backed slots
#[derive(Debug, Clone)]
pub struct FileSlotStore {
    dir: PathBuf,
}

impl FileSlotStore {
    /// Slots live in `dir`; the directory is created on first write
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, PersistenceError> {
        let valid = !key.is_empty()
            && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
            && !key.starts_with('.');
        if !valid {
            return Err(PersistenceError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl SlotStore for FileSlotStore {
    fn read(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(PersistenceError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        let path = self.path_for(key)?;
        let io_err = |source| PersistenceError::Io {
            key: key.to_string(),
            source,
        };

        fs::create_dir_all(&self.dir).map_err(io_err)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(io_err)?;
        fs::rename(&tmp, &path).map_err(io_err)?;
        Ok(())
    }
}

/// In-memory slots
#[derive(Debug, Default)]
pub struct MemorySlotStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemorySlotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SlotStore for MemorySlotStore {
    fn read(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let slots = self.slots.lock().map_err(|_| PersistenceError::Poisoned)?;
        Ok(slots.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        let mut slots = self.slots.lock().map_err(|_| PersistenceError::Poisoned)?;
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
