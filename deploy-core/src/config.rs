use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{advisor::client::DEFAULT_ENDPOINT, catalog};

pub const DEFAULT_TIMEZONE: &str = "UTC";

/// Top-level configuration stored on disk. Every field is optional.
///
/// Example TOML:
/// ```toml
/// timezone = "Europe/Paris"
/// plain = true
/// timezones = ["UTC", "Europe/Paris", "Asia/Tokyo"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Default timezone used when `--tz` is not given.
    pub timezone: Option<String>,

    /// Override for the advisory service URL.
    pub endpoint: Option<String>,

    /// Print the bare message without colors or a terminal UI.
    pub plain: Option<bool>,

    /// Replaces the built-in interactive timezone catalog.
    pub timezones: Option<Vec<String>>,
}

/// Effective values after applying built-in defaults to a [`Config`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub timezone: String,
    pub endpoint: String,
    pub plain: bool,
    pub timezones: Vec<String>,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("today", "shouldideploy", "shouldideploy")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Make `timezone` the default for future runs.
    pub fn remember_timezone(&mut self, timezone: &str) {
        self.timezone = Some(timezone.to_string());
    }

    pub fn settings(&self) -> Settings {
        let timezones = match &self.timezones {
            Some(list) if !list.is_empty() => list.clone(),
            _ => catalog::default_timezones(),
        };

        Settings {
            timezone: self
                .timezone
                .clone()
                .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string()),
            endpoint: self
                .endpoint
                .clone()
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            plain: self.plain.unwrap_or(false),
            timezones,
        }
    }
}
