use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use super::{KeyValueStore, StorageResult};

/// Storage file name in the data directory
const STORAGE_FILE: &str = "storage.json";

/// JSON-object file holding every key. Each mutation rewrites the whole file
/// through a temp file and a rename, so a crash never leaves half a write.
pub struct FileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles on the file
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(STORAGE_FILE),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> StorageResult<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = std::fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        let contents = serde_json::to_string_pretty(entries)?;
        std::fs::write(&tmp, contents)?;
        std::fs::rename(&tmp, &self.path)?;
        debug!(path = ?self.path, keys = entries.len(), "Storage file written");
        Ok(())
    }

    fn modify(&self, f: impl FnOnce(&mut BTreeMap<String, String>) -> bool) -> StorageResult<()> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut entries = self.read_all()?;
        if f(&mut entries) {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.set_many(&[(key, value)])
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.remove_many(&[key])
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> StorageResult<()> {
        self.modify(|map| {
            for (key, value) in entries {
                map.insert(key.to_string(), value.to_string());
            }
            true
        })
    }

    fn remove_many(&self, keys: &[&str]) -> StorageResult<()> {
        self.modify(|map| {
            let mut changed = false;
            for key in keys {
                changed |= map.remove(*key).is_some();
            }
            changed
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("taskdesk-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_missing_file_reads_empty() {
        let store = FileStore::new(temp_dir("file-missing"));
        assert_eq!(store.get("accessCredential").unwrap(), None);
    }

    #[test]
    fn test_values_survive_new_instance() {
        let dir = temp_dir("file-reload");
        let store = FileStore::new(&dir);
        store
            .set_many(&[("accessCredential", "A1"), ("renewalCredential", "R1")])
            .unwrap();

        // A second instance over the same directory sees the same data
        let reopened = FileStore::new(&dir);
        assert_eq!(reopened.get("accessCredential").unwrap().as_deref(), Some("A1"));
        assert_eq!(reopened.get("renewalCredential").unwrap().as_deref(), Some("R1"));

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_remove_keeps_other_keys() {
        let dir = temp_dir("file-remove");
        let store = FileStore::new(&dir);
        store.set("uiTheme", "dark").unwrap();
        store.set("accessCredential", "A1").unwrap();

        store.remove("accessCredential").unwrap();
        store.remove("accessCredential").unwrap(); // absent key is fine

        assert_eq!(store.get("accessCredential").unwrap(), None);
        assert_eq!(store.get("uiTheme").unwrap().as_deref(), Some("dark"));

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = temp_dir("file-corrupt");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(STORAGE_FILE), "not json").unwrap();

        let store = FileStore::new(&dir);
        assert!(store.get("identity").is_err());

        let _ = std::fs::remove_dir_all(dir);
    }
}
