//! Application configuration management.
//!
//! This module handles loading and saving the application configuration:
//! the API base URL, auth endpoint paths, request timeout, the storage
//! backend for the session and the last email used to sign in.
//!
//! Configuration is stored at `~/.config/taskdesk/config.json`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::pipeline::{AuthEndpoints, DEFAULT_LOGIN_PATH, DEFAULT_RENEWAL_PATH};
use crate::api::transport::DEFAULT_REQUEST_TIMEOUT_SECS;
use crate::storage::{keychain, FileStore, KeyValueStore, KeyringStore, MemoryStore};

/// Application name used for config/data directory paths
pub const APP_NAME: &str = "taskdesk";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// API used when neither the config nor the environment name one
const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Environment variable overriding `api_base_url`
pub const API_URL_ENV: &str = "TASKDESK_API_URL";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// JSON file in the data directory
    #[default]
    File,
    /// OS keychain
    Keyring,
    /// Nothing persisted; the session ends with the process
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub login_path: String,
    pub renewal_path: String,
    pub request_timeout_secs: u64,
    pub storage: StorageBackend,
    pub last_email: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            renewal_path: DEFAULT_RENEWAL_PATH.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            storage: StorageBackend::default(),
            last_email: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents).context("Failed to parse config file")
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory for the session file and logs
    pub fn data_dir(&self) -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    /// Base URL after applying the `TASKDESK_API_URL` override
    pub fn api_url(&self) -> String {
        std::env::var(API_URL_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| self.api_base_url.clone())
    }

    pub fn endpoints(&self) -> AuthEndpoints {
        AuthEndpoints {
            login_path: self.login_path.clone(),
            renewal_path: self.renewal_path.clone(),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Open the configured persistence backend
    pub fn open_storage(&self) -> Result<Arc<dyn KeyValueStore>> {
        Ok(match self.storage {
            StorageBackend::File => Arc::new(FileStore::new(self.data_dir()?)),
            StorageBackend::Keyring => Arc::new(KeyringStore::new(keychain::DEFAULT_SERVICE_NAME)),
            StorageBackend::Memory => Arc::new(MemoryStore::new()),
        })
    }
}
