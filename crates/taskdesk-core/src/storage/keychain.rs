use keyring::Entry;
use tracing::debug;

use super::{KeyValueStore, StorageResult};

/// Keychain service name used when none is configured
pub const DEFAULT_SERVICE_NAME: &str = "taskdesk";

/// Stores each key as its own entry in the OS keychain.
pub struct KeyringStore {
    service: String,
}

impl KeyringStore {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, key: &str) -> StorageResult<Entry> {
        Ok(Entry::new(&self.service, key)?)
    }
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new(DEFAULT_SERVICE_NAME)
    }
}

impl KeyValueStore for KeyringStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.entry(key)?.set_password(value)?;
        debug!(service = %self.service, key, "Keychain entry stored");
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
