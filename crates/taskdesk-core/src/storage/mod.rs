//! Durable key-value persistence for client-side state.
//!
//! The session store and the theme preference only need get/set/remove on
//! string values, so every backend implements [`KeyValueStore`]:
//! - `FileStore`: a single JSON file in the data directory
//! - `KeyringStore`: one OS keychain entry per key
//! - `MemoryStore`: in-process map, nothing survives a restart

pub mod file;
pub mod keychain;
pub mod memory;

use thiserror::Error;
use tracing::warn;

pub use self::file::FileStore;
pub use self::keychain::KeyringStore;
pub use self::memory::MemoryStore;

/// Key holding the current bearer token.
pub const ACCESS_CREDENTIAL_KEY: &str = "accessCredential";

/// Key holding the token used to obtain a new bearer token.
pub const RENEWAL_CREDENTIAL_KEY: &str = "renewalCredential";

/// Key holding the JSON-serialized identity of the signed-in user.
pub const IDENTITY_KEY: &str = "identity";

/// Key holding the last selected display theme.
pub const THEME_KEY: &str = "uiTheme";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("Keychain error: {0}")]
    Keyring(#[from] keyring::Error),
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Removing a key that is not present is not an error.
    fn remove(&self, key: &str) -> StorageResult<()>;

    /// Store several entries, all or nothing. When one write fails, the
    /// entries already written are restored to their previous values.
    /// Backends that can flush once should override this.
    fn set_many(&self, entries: &[(&str, &str)]) -> StorageResult<()> {
        let mut written: Vec<(&str, Option<String>)> = Vec::with_capacity(entries.len());
        for &(key, value) in entries {
            let previous = self.get(key)?;
            if let Err(e) = self.set(key, value) {
                for (key, previous) in written.iter().rev() {
                    let restored = match previous {
                        Some(previous) => self.set(key, previous),
                        None => self.remove(key),
                    };
                    if let Err(re) = restored {
                        warn!(key, error = %re, "Failed to roll back storage entry");
                    }
                }
                return Err(e);
            }
            written.push((key, previous));
        }
        Ok(())
    }

    fn remove_many(&self, keys: &[&str]) -> StorageResult<()> {
        for key in keys {
            self.remove(key)?;
        }
        Ok(())
    }
}
