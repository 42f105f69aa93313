//! Configuration management
//!
//! Stores settings in ~/.config/benhan/config.json. The `GEMINI_API_KEY`
//! environment variable always takes precedence over the stored key.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable consulted before the config file.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_QUIET_MILLIS: u64 = 1500;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Stored API key. Prefer `GEMINI_API_KEY` in the environment.
    pub api_key: Option<String>,
    /// Model identifier sent to the service.
    pub model: String,
    /// Quiet interval in milliseconds before an edit triggers analysis.
    pub quiet_millis: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            quiet_millis: DEFAULT_QUIET_MILLIS,
        }
    }
}

impl Config {
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("benhan"))
    }

    fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("config.json"))
    }

    /// Load config from disk, or return defaults. A corrupt file is moved
    /// aside and replaced with defaults rather than aborting the session.
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::read_from(&path),
            None => Self::default(),
        }
    }

    fn read_from(path: &Path) -> Self {
        if let Ok(content) = fs::read_to_string(path) {
            match serde_json::from_str(&content) {
                Ok(config) => return config,
                Err(err) => {
                    preserve_corrupt_config(path, &content);
                    tracing::warn!(
                        path = %path.display(),
                        %err,
                        "config file was corrupted; a backup was saved and defaults loaded"
                    );
                }
            }
        }
        Self::default()
    }

    /// Save config to disk.
    pub fn save(&self) -> anyhow::Result<()> {
        let dir = Self::config_dir()
            .ok_or_else(|| anyhow::anyhow!("could not determine config directory"))?;
        fs::create_dir_all(&dir)?;
        self.write_to(&dir.join("config.json"))
    }

    fn write_to(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Resolve the API key: environment first, then the stored key. `None`
    /// means analysis attempts produce a config-error feedback card.
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                return Some(key);
            }
        }
        self.api_key.clone()
    }

    /// Quiet interval used by the session debouncer.
    pub fn quiet_interval(&self) -> Duration {
        Duration::from_millis(self.quiet_millis)
    }
}

fn preserve_corrupt_config(path: &Path, content: &str) {
    let corrupt_path = path.with_extension("json.corrupt");
    if fs::rename(path, &corrupt_path).is_err() {
        let _ = fs::write(&corrupt_path, content);
    }
}
