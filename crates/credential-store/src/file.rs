//! File-backed key/value storage.

use crate::{CredentialStorage, StorageError, StorageResult};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::warn;

/// Key/value storage persisted as a JSON object in a single file.
///
/// Every mutation writes through immediately, so stored values survive a
/// process restart. An unreadable or corrupt file behaves as empty
/// rather than failing reads.
pub struct FileStorage {
    path: PathBuf,
    /// Serializes read-modify-write cycles against the file.
    lock: Mutex<()>,
}

impl FileStorage {
    /// Create a storage instance backed by the given file.
    ///
    /// The file and its parent directory are created on first write.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    fn read_map(&self) -> HashMap<String, String> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(map) => map,
                Err(err) => {
                    warn!(path = %self.path.display(), error = %err, "Corrupt credential file, treating as empty");
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        }
    }

    fn write_map(&self, map: &HashMap<String, String>) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(map)
            .map_err(|err| StorageError::Encoding(err.to_string()))?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

impl CredentialStorage for FileStorage {
    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let _guard = self.lock.lock().unwrap();
        let mut map = self.read_map();
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map)
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let _guard = self.lock.lock().unwrap();
        Ok(self.read_map().get(key).cloned())
    }

    fn remove(&self, key: &str) -> StorageResult<bool> {
        let _guard = self.lock.lock().unwrap();
        let mut map = self.read_map();
        let existed = map.remove(key).is_some();
        if existed {
            self.write_map(&map)?;
        }
        Ok(existed)
    }
}
