use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use super::paths::ProjectPaths;
use super::timing_config::TimingConfig;

pub const APP_NAME: &str = "script-utils";

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    Encode(#[from] toml::ser::Error),
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Also write logs to a file in the data directory
    #[serde(default)]
    pub file_logging: bool,

    /// Filter used when RUST_LOG is not set (default: "info")
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file_logging: false,
            level: default_level(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtilsConfig {
    #[serde(default)]
    pub timing: TimingConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl UtilsConfig {
    /// `<config dir>/script-utils/config.toml`, or a relative path when no
    /// home directory is available
    pub fn config_path() -> PathBuf {
        ProjectPaths::new(APP_NAME)
            .map(|p| p.config_dir())
            .unwrap_or_else(|| PathBuf::from(format!(".{}", APP_NAME)))
            .join("config.toml")
    }

    pub fn load() -> Result<Self, ConfigLoadError> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigLoadError> {
        if !path.exists() {
            return Err(ConfigLoadError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        info!(target: "config", "Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load from the default path, falling back to defaults if the file is missing
    pub fn load_or_default() -> Result<Self, ConfigLoadError> {
        match Self::load() {
            Err(ConfigLoadError::NotFound(_)) => Ok(Self::default()),
            other => other,
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigLoadError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        info!(target: "config", "Saved config to {}", path.display());
        Ok(())
    }
}
