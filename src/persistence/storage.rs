//! Key/value storage backends and backed-up save slots

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::PersistenceError;
use super::envelope;

/// String key/value store (localStorage-shaped)
pub trait Storage {
    fn get_item(&self, key: &str) -> Result<Option<String>, PersistenceError>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), PersistenceError>;
    fn remove_item(&mut self, key: &str) -> Result<(), PersistenceError>;
}

/// In-memory storage for tests and headless runs
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), PersistenceError> {
        self.items.remove(key);
        Ok(())
    }
}

/// One file per key under a directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Use `dir`, creating it if needed
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        match fs::read_to_string(self.path(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        // Write then rename so a crash never leaves a half-written save
        let path = self.path(key);
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), PersistenceError> {
        match fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// A sealed value under one key, with the previous good save kept as backup
#[derive(Debug, Clone)]
pub struct SaveSlot {
    key: String,
    backup_key: String,
}

impl SaveSlot {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            backup_key: format!("{}.bak", key),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Seal and write `value`, rotating a valid previous save into the backup
    pub fn save<S, T>(&self, storage: &mut S, value: &T) -> Result<(), PersistenceError>
    where
        S: Storage + ?Sized,
        T: Serialize + DeserializeOwned,
    {
        let sealed = envelope::seal(value)?;
        if let Some(previous) = storage.get_item(&self.key)? {
            // Never rotate a corrupt save over a good backup
            if envelope::open::<T>(&previous).is_ok() {
                storage.set_item(&self.backup_key, &previous)?;
            }
        }
        storage.set_item(&self.key, &sealed)?;
        log::debug!("Saved {}", self.key);
        Ok(())
    }

    /// Load the primary save, falling back to the backup when it is corrupt
    pub fn load<S, T>(&self, storage: &S) -> Result<T, PersistenceError>
    where
        S: Storage + ?Sized,
        T: DeserializeOwned,
    {
        let primary = match storage.get_item(&self.key)? {
            Some(raw) => envelope::open(&raw),
            None => Err(PersistenceError::Missing(self.key.clone())),
        };
        let err = match primary {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        match storage.get_item(&self.backup_key)? {
            Some(raw) => {
                let value = envelope::open(&raw)?;
                log::warn!("Save {} unusable ({}), loaded backup", self.key, err);
                Ok(value)
            }
            None => Err(err),
        }
    }

    /// Remove both the save and its backup
    pub fn clear<S: Storage + ?Sized>(&self, storage: &mut S) -> Result<(), PersistenceError> {
        storage.remove_item(&self.key)?;
        storage.remove_item(&self.backup_key)?;
        log::info!("Cleared save {}", self.key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{ChargeLedger, PowerUpKind};

    #[test]
    fn test_missing_slot() {
        let storage = MemoryStorage::new();
        let slot = SaveSlot::new("economy");
        assert!(matches!(
            slot.load::<_, ChargeLedger>(&storage),
            Err(PersistenceError::Missing(_))
        ));
    }

    #[test]
    fn test_backup_rotation() {
        let mut storage = MemoryStorage::new();
        let slot = SaveSlot::new("economy");

        let first = ChargeLedger::daily_allowance();
        slot.save(&mut storage, &first).unwrap();
        assert_eq!(storage.len(), 1);

        let mut second = first.clone();
        second.grant_pack(PowerUpKind::Shake);
        slot.save(&mut storage, &second).unwrap();
        assert_eq!(storage.len(), 2);

        // Corrupt the primary: the previous save comes back
        storage.set_item("economy", "{ truncated").unwrap();
        let loaded: ChargeLedger = slot.load(&storage).unwrap();
        assert_eq!(loaded, first);
    }

    #[test]
    fn test_corrupt_primary_not_rotated() {
        let mut storage = MemoryStorage::new();
        let slot = SaveSlot::new("economy");
        let good = ChargeLedger::daily_allowance();
        slot.save(&mut storage, &good).unwrap();
        slot.save(&mut storage, &good).unwrap();

        storage.set_item("economy", "garbage").unwrap();
        slot.save(&mut storage, &ChargeLedger::new()).unwrap();

        // Backup still holds the last good save, not the garbage
        let backup = storage.get_item("economy.bak").unwrap().unwrap();
        assert_eq!(envelope::open::<ChargeLedger>(&backup).unwrap(), good);
    }

    #[test]
    fn test_clear() {
        let mut storage = MemoryStorage::new();
        let slot = SaveSlot::new("economy");
        slot.save(&mut storage, &ChargeLedger::new()).unwrap();
        slot.save(&mut storage, &ChargeLedger::new()).unwrap();
        slot.clear(&mut storage).unwrap();
        assert!(storage.is_empty());
    }

    #[test]
    fn test_file_storage() {
        let dir = std::env::temp_dir().join(format!("orb-merge-test-{}", std::process::id()));
        let mut storage = FileStorage::new(dir.clone()).unwrap();
        let slot = SaveSlot::new("economy");

        let ledger = ChargeLedger::daily_allowance();
        slot.save(&mut storage, &ledger).unwrap();
        assert_eq!(slot.load::<_, ChargeLedger>(&storage).unwrap(), ledger);

        slot.clear(&mut storage).unwrap();
        assert_eq!(storage.get_item("economy").unwrap(), None);
        let _ = fs::remove_dir_all(&dir);
    }
}
