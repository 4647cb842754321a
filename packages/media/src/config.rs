use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::ConfigError;

pub const DEFAULT_CONFIG_NAME: &str = "ara.media.json";

/// Media import configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaConfig {
    /// Upload endpoint (multipart POST)
    #[serde(default = "default_upload_url")]
    pub upload_url: String,

    /// Prefix prepended to the storage key returned by the endpoint
    #[serde(default = "default_public_path")]
    pub public_path: String,

    /// Largest number of files accepted from one drop, paste or pick
    #[serde(default = "default_max_files_per_batch")]
    pub max_files_per_batch: usize,

    /// Largest accepted file, in bytes
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,

    /// Upload timeout, in milliseconds
    #[serde(default = "default_upload_timeout_ms")]
    pub upload_timeout_ms: u64,

    /// Accessible text of images imported from an external URL
    #[serde(default = "default_external_alt_text")]
    pub external_alt_text: String,
}

fn default_upload_url() -> String {
    "http://localhost:8080/api/files".to_string()
}

fn default_public_path() -> String {
    "/files/".to_string()
}

fn default_max_files_per_batch() -> usize {
    5
}

fn default_max_file_size() -> u64 {
    2_000_000
}

fn default_upload_timeout_ms() -> u64 {
    15_000
}

fn default_external_alt_text() -> String {
    "Image insérée".to_string()
}

impl MediaConfig {
    /// Load config from a directory
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let config_path = Self::path_in(dir);

        let config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            serde_json::from_str(&content)?
        } else {
            // Return default config if none exists
            Self::default()
        };

        config.validate()?;
        Ok(config)
    }

    /// Write config to a directory
    pub fn save(&self, dir: &Path) -> Result<PathBuf, ConfigError> {
        let config_path = Self::path_in(dir);
        std::fs::write(&config_path, serde_json::to_string_pretty(self)?)?;
        Ok(config_path)
    }

    pub fn path_in(dir: &Path) -> PathBuf {
        dir.join(DEFAULT_CONFIG_NAME)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.upload_url.trim().is_empty() {
            return Err(ConfigError::Invalid("uploadUrl must not be empty".to_string()));
        }
        if self.max_files_per_batch == 0 {
            return Err(ConfigError::Invalid("maxFilesPerBatch must be at least 1".to_string()));
        }
        if self.max_file_size == 0 {
            return Err(ConfigError::Invalid("maxFileSize must be at least 1".to_string()));
        }
        if self.upload_timeout_ms == 0 {
            return Err(ConfigError::Invalid("uploadTimeoutMs must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_millis(self.upload_timeout_ms)
    }

    /// Servable URL of a stored object
    pub fn public_url(&self, key: &str) -> String {
        format!("{}{}", self.public_path, key)
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            upload_url: default_upload_url(),
            public_path: default_public_path(),
            max_files_per_batch: default_max_files_per_batch(),
            max_file_size: default_max_file_size(),
            upload_timeout_ms: default_upload_timeout_ms(),
            external_alt_text: default_external_alt_text(),
        }
    }
}
