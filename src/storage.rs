use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use serde::{de::DeserializeOwned, Serialize};
use tracing::{info, warn};

use crate::error::StorageError;

/// Durable key-value slots. Each key holds one whole snapshot and every
/// `save` replaces it.
pub trait SlotStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn save(&self, key: &str, data: &str) -> Result<(), StorageError>;

    /// Drops the slot. Returns true if one existed.
    fn remove(&self, key: &str) -> Result<bool, StorageError>;
}

/// One `<key>.json` file per slot inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl SlotStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.slot_path(key)) {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, key: &str, data: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.slot_path(key);
        // The temp file must be on disk before the rename publishes it,
        // otherwise a power cut can leave an empty slot behind.
        let tmp = path.with_extension("json.tmp");
        let mut file = File::create(&tmp)?;
        file.write_all(data.as_bytes())?;
        file.sync_all()?;
        drop(file);
        fs::rename(&tmp, &path)?;
        sync_dir(&self.dir)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, StorageError> {
        match fs::remove_file(self.slot_path(key)) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> Result<(), StorageError> {
    File::open(dir)?.sync_all()?;
    Ok(())
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> Result<(), StorageError> {
    Ok(())
}

/// In-memory slots. Cloning shares the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slots: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SlotStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let slots = self
            .slots
            .read()
            .map_err(|_| StorageError::LockPoisoned("slot read"))?;
        Ok(slots.get(key).cloned())
    }

    fn save(&self, key: &str, data: &str) -> Result<(), StorageError> {
        let mut slots = self
            .slots
            .write()
            .map_err(|_| StorageError::LockPoisoned("slot write"))?;
        slots.insert(key.to_string(), data.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, StorageError> {
        let mut slots = self
            .slots
            .write()
            .map_err(|_| StorageError::LockPoisoned("slot write"))?;
        Ok(slots.remove(key).is_some())
    }
}

/// JSON snapshots of a `T` kept in a single slot.
pub struct Snapshot<T> {
    _state: PhantomData<fn() -> T>,
}

impl<T: Serialize + DeserializeOwned + Default> Snapshot<T> {
    /// Reads the slot. A missing, unreadable or corrupt snapshot yields
    /// `T::default()`.
    pub fn load<S: SlotStore>(slots: &S, key: &str) -> T {
        let data = match slots.load(key) {
            Ok(Some(data)) => data,
            Ok(None) => {
                info!(key, "no snapshot, starting empty");
                return T::default();
            }
            Err(err) => {
                warn!(key, error = %err, "snapshot unreadable, starting empty");
                return T::default();
            }
        };
        match serde_json::from_str(&data) {
            Ok(state) => {
                info!(key, bytes = data.len(), "snapshot loaded");
                state
            }
            Err(err) => {
                warn!(key, error = %err, "snapshot corrupt, starting empty");
                T::default()
            }
        }
    }

    pub fn save<S: SlotStore>(slots: &S, key: &str, state: &T) -> Result<(), StorageError> {
        let data = serde_json::to_string_pretty(state)?;
        slots.save(key, &data)?;
        info!(key, bytes = data.len(), "snapshot saved");
        Ok(())
    }
}
