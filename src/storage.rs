//! Durable key-value storage areas backing the credential store.

use crate::error::Result;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

/// A durable key-value area. The credential store keeps its whole entry
/// sequence as one serialized block under one fixed key.
pub trait StorageArea: Send + Sync {
    /// Read the block stored under `key`, if any.
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Replace the block stored under `key`.
    fn write(&self, key: &str, value: &str) -> Result<()>;
}

/// File-backed storage area: each key maps to a JSON file in a directory.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Platform data directory for passlock, e.g.
    /// `~/.local/share/passlock` on Linux.
    pub fn default_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("passlock")
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl StorageArea for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.slot_path(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.slot_path(key);
        fs::write(&path, value)?;

        // Secrets are stored unencrypted; keep the file owner-only.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = fs::Permissions::from_mode(0o600);
            let _ = fs::set_permissions(&path, permissions);
        }

        Ok(())
    }
}

/// In-memory storage area, used by tests and throwaway stores.
#[derive(Default)]
pub struct MemoryStorage {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageArea for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.slots.lock().expect("storage lock poisoned").get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        self.slots
            .lock()
            .expect("storage lock poisoned")
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_roundtrip() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.read("slot").unwrap(), None);

        storage.write("slot", "[1,2,3]").unwrap();
        assert_eq!(storage.read("slot").unwrap().as_deref(), Some("[1,2,3]"));

        storage.write("slot", "[]").unwrap();
        assert_eq!(storage.read("slot").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_file_storage_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());

        assert_eq!(storage.read("passwords").unwrap(), None);
        storage.write("passwords", "{\"a\":1}").unwrap();
        assert_eq!(
            storage.read("passwords").unwrap().as_deref(),
            Some("{\"a\":1}")
        );
        assert!(dir.path().join("passwords.json").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_file_storage_sets_owner_only_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        storage.write("passwords", "[]").unwrap();

        let mode = fs::metadata(dir.path().join("passwords.json"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
