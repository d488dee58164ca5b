//! # Configuration
//!
//! Stored as `config.json` in the data directory. A missing file means defaults.
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `autosave_quiet_ms` | `2000` | Quiet period after the last edit before an autosave fires |
//! | `inline_image_limit` | `102400` | Largest embedded image payload (bytes) sent to the remote store |
//! | `admin` | unset | Identity allowed to edit; unset means whoever runs folio owns the workspace |

use crate::error::{FolioError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

const CONFIG_FILENAME: &str = "config.json";
const DEFAULT_QUIET_MS: u64 = 2000;
const DEFAULT_IMAGE_LIMIT: usize = 100 * 1024;

pub const KEYS: [&str; 3] = ["autosave_quiet_ms", "inline_image_limit", "admin"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FolioConfig {
    #[serde(default = "default_quiet_ms")]
    pub autosave_quiet_ms: u64,

    #[serde(default = "default_image_limit")]
    pub inline_image_limit: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin: Option<String>,
}

fn default_quiet_ms() -> u64 {
    DEFAULT_QUIET_MS
}

fn default_image_limit() -> usize {
    DEFAULT_IMAGE_LIMIT
}

impl Default for FolioConfig {
    fn default() -> Self {
        Self {
            autosave_quiet_ms: DEFAULT_QUIET_MS,
            inline_image_limit: DEFAULT_IMAGE_LIMIT,
            admin: None,
        }
    }
}

impl FolioConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(FolioError::Io)?;
        let config: FolioConfig =
            serde_json::from_str(&content).map_err(FolioError::Serialization)?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();
        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(FolioError::Io)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(FolioError::Serialization)?;
        fs::write(config_path, content).map_err(FolioError::Io)?;
        Ok(())
    }

    pub fn autosave_quiet(&self) -> Duration {
        Duration::from_millis(self.autosave_quiet_ms)
    }

    /// Display value for a key, `None` for unknown keys.
    pub fn get(&self, key: &str) -> Option<String> {
        match normalize_key(key).as_str() {
            "autosave_quiet_ms" => Some(self.autosave_quiet_ms.to_string()),
            "inline_image_limit" => Some(self.inline_image_limit.to_string()),
            "admin" => Some(self.admin.clone().unwrap_or_else(|| "(none)".to_string())),
            _ => None,
        }
    }

    /// Set a key from its string form. An empty `admin` clears it.
    pub fn set(&mut self, key: &str, value: &str) -> std::result::Result<(), String> {
        match normalize_key(key).as_str() {
            "autosave_quiet_ms" => {
                self.autosave_quiet_ms = value
                    .trim()
                    .parse()
                    .map_err(|_| format!("Invalid number of milliseconds: {value}"))?;
            }
            "inline_image_limit" => {
                self.inline_image_limit = value
                    .trim()
                    .parse()
                    .map_err(|_| format!("Invalid byte limit: {value}"))?;
            }
            "admin" => {
                let value = value.trim();
                self.admin = (!value.is_empty()).then(|| value.to_string());
            }
            _ => return Err(format!("Unknown config key: {key}")),
        }
        Ok(())
    }
}

fn normalize_key(key: &str) -> String {
    key.trim().replace('-', "_")
}
