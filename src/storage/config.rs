//! Configuration handling for shoplist
//!
//! Configuration is stored in `config.toml` inside the platform config
//! directory (`~/.config/shoplist/config.toml` on Linux). Every field is
//! optional; command-line flags and `SHOPLIST_DATA_DIR` take precedence.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    #[error("Could not determine a data directory; pass --data-dir")]
    NoDataDir,
}

/// Output format for commands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Where buckets are stored (defaults to the platform data directory)
    pub data_dir: Option<PathBuf>,

    /// Default output format (text or json)
    pub default_format: OutputFormat,

    /// Default tracing filter, overridden by `RUST_LOG`
    pub log_level: String,

    /// Prefix for generated list names ("New List 3")
    pub list_name_prefix: String,

    /// Prefix for generated group names ("Group 2")
    pub group_name_prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            default_format: OutputFormat::Text,
            log_level: "warn".to_string(),
            list_name_prefix: "New List".to_string(),
            group_name_prefix: "Group".to_string(),
        }
    }
}

impl Config {
    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("dev", "shoplist", "shoplist")
    }

    /// Returns the global config directory
    pub fn config_dir() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Returns the platform data directory
    pub fn default_data_dir() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.data_dir().to_path_buf())
    }

    /// Loads configuration from the default location
    pub fn load() -> Result<Self> {
        match Self::config_dir() {
            Some(dir) => Self::load_from(&dir.join("config.toml")),
            None => Ok(Self::default()),
        }
    }

    /// Loads configuration from a specific file; a missing file means defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse config")
    }

    /// Saves configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))
    }

    /// Resolves the data directory: explicit override, then config, then platform default
    pub fn resolve_data_dir(&self, override_dir: Option<&Path>) -> Result<PathBuf> {
        override_dir
            .map(Path::to_path_buf)
            .or_else(|| self.data_dir.clone())
            .or_else(Self::default_data_dir)
            .ok_or_else(|| ConfigError::NoDataDir.into())
    }
}
