//! Configuration management for Lectern

pub mod progress;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Firebase / Google Cloud project holding the catalog
    pub project_id: String,

    /// Web API key of the project
    pub api_key: String,

    /// Firestore emulator `host:port`, used instead of the hosted database
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firestore_emulator: Option<String>,

    /// Auth emulator `host:port`, used instead of the hosted identity provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_emulator: Option<String>,
}

impl Config {
    /// Load configuration from disk, or create default if not exists
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config from {:?}", config_path))?;
            serde_json::from_str(&contents).with_context(|| "Failed to parse config.json")
        } else {
            let config = Self::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }

        let contents =
            serde_json::to_string_pretty(self).with_context(|| "Failed to serialize config")?;

        std::fs::write(&config_path, contents)
            .with_context(|| format!("Failed to write config to {:?}", config_path))?;

        Ok(())
    }

    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        let proj_dirs =
            ProjectDirs::from("", "", "lectern").context("Failed to determine config directory")?;
        Ok(proj_dirs.config_dir().join("config.json"))
    }

    /// Get the data directory path
    pub fn data_dir() -> Result<PathBuf> {
        let proj_dirs =
            ProjectDirs::from("", "", "lectern").context("Failed to determine data directory")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    /// Apply per-invocation overrides; empty values are ignored
    pub fn merge(&mut self, overrides: Overrides) {
        if let Some(project_id) = overrides.project_id.filter(|s| !s.is_empty()) {
            self.project_id = project_id;
        }
        if let Some(api_key) = overrides.api_key.filter(|s| !s.is_empty()) {
            self.api_key = api_key;
        }
        if let Some(host) = overrides.firestore_emulator.filter(|s| !s.is_empty()) {
            self.firestore_emulator = Some(host);
        }
        if let Some(host) = overrides.auth_emulator.filter(|s| !s.is_empty()) {
            self.auth_emulator = Some(host);
        }
    }

    /// Fail unless enough is configured to reach the remote store
    pub fn ensure_remote(&self) -> Result<()> {
        if self.project_id.trim().is_empty() {
            bail!("No project configured. Run `lectern config --project-id <ID>` first");
        }
        if self.api_key.trim().is_empty() && self.firestore_emulator.is_none() {
            bail!("No API key configured. Run `lectern config --api-key <KEY>` first");
        }
        Ok(())
    }
}

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub project_id: Option<String>,
    pub api_key: Option<String>,
    pub firestore_emulator: Option<String>,
    pub auth_emulator: Option<String>,
}
