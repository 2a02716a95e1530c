// Configuration management for the leadflow CLI
//
// Cross-platform config stored in:
// - macOS: ~/.config/leadflow/config.json
// - Linux: ~/.config/leadflow/config.json
// - Windows: %APPDATA%\leadflow\config.json

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Overrides the platform data directory when set
    pub data_dir: Option<String>,

    /// Rows shown when previewing a lead list
    pub preview_rows: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            preview_rows: 3,
        }
    }
}

impl Config {
    /// Get the config directory path (cross-platform)
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to determine config directory")?
            .join("leadflow");

        std::fs::create_dir_all(&config_dir).context("Failed to create config directory")?;

        Ok(config_dir)
    }

    /// Get the config file path
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Get the directory the sled store lives in: the configured
    /// override, or the platform data directory
    pub fn storage_dir(&self) -> Result<PathBuf> {
        let dir = match &self.data_dir {
            Some(dir) => PathBuf::from(dir),
            None => dirs::data_local_dir()
                .context("Failed to determine data directory")?
                .join("leadflow"),
        };

        std::fs::create_dir_all(&dir).context("Failed to create data directory")?;

        Ok(dir)
    }

    /// Load config from file, or create default if not exists
    pub fn load() -> Result<Self> {
        let config_file = Self::config_file()?;

        if config_file.exists() {
            let contents =
                std::fs::read_to_string(&config_file).context("Failed to read config file")?;
            let config: Config =
                serde_json::from_str(&contents).context("Failed to parse config file")?;
            Ok(config)
        } else {
            // Create default config
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let config_file = Self::config_file()?;
        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&config_file, contents).context("Failed to write config file")?;
        Ok(())
    }

    /// Set a config value
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "data_dir" => {
                self.data_dir = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                };
            }
            "preview_rows" => {
                self.preview_rows = value.parse().context("Invalid number")?;
            }
            _ => anyhow::bail!("Unknown config key: {}", key),
        }
        self.save()?;
        Ok(())
    }

    /// Get a config value
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "data_dir" => self.data_dir.clone(),
            "preview_rows" => Some(self.preview_rows.to_string()),
            _ => None,
        }
    }

    /// List all config values
    pub fn list(&self) -> Vec<(String, String)> {
        vec![
            (
                "data_dir".to_string(),
                self.data_dir
                    .clone()
                    .unwrap_or_else(|| "(auto)".to_string()),
            ),
            ("preview_rows".to_string(), self.preview_rows.to_string()),
        ]
    }
}
