//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::PathBuf;

use crate::core::review::DEFAULT_DUE_SOON_DAYS;
use crate::core::Vault;

/// FDC configuration with layered hierarchy
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default owner for new documents
    pub owner: Option<String>,

    /// Horizon in days for the "due soon" review bucket
    pub due_soon_days: Option<u32>,

    /// Output format used when --format is left at auto
    pub default_format: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/fdc/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                if let Ok(contents) = std::fs::read_to_string(&global_path) {
                    if let Ok(global) = serde_yml::from_str::<Config>(&contents) {
                        config.merge(global);
                    }
                }
            }
        }

        // 3. Vault config (.fdc/config.yaml)
        if let Ok(vault) = Vault::discover() {
            let vault_config_path = vault.fdc_dir().join("config.yaml");
            if vault_config_path.exists() {
                if let Ok(contents) = std::fs::read_to_string(&vault_config_path) {
                    if let Ok(vault_config) = serde_yml::from_str::<Config>(&contents) {
                        config.merge(vault_config);
                    }
                }
            }
        }

        // 4. Environment variables
        if let Ok(owner) = std::env::var("FDC_OWNER") {
            config.owner = Some(owner);
        }

        config
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "fdc")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.owner.is_some() {
            self.owner = other.owner;
        }
        if other.due_soon_days.is_some() {
            self.due_soon_days = other.due_soon_days;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
    }

    /// Get the owner name, falling back to git config or username
    pub fn owner(&self) -> String {
        if let Some(ref owner) = self.owner {
            return owner.clone();
        }

        if let Ok(output) = std::process::Command::new("git")
            .args(["config", "user.name"])
            .output()
        {
            if output.status.success() {
                let name = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !name.is_empty() {
                    return name;
                }
            }
        }

        std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_else(|_| "unknown".to_string())
    }

    /// Horizon for the due-soon bucket
    pub fn due_soon_days(&self) -> u32 {
        self.due_soon_days.unwrap_or(DEFAULT_DUE_SOON_DAYS)
    }
}
