//! Vault discovery and structure
//!
//! A vault is a directory tree with an `.fdc/` control directory holding the
//! registry database, the blob store, the config, and the approval roster.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Represents an FDC vault
#[derive(Debug)]
pub struct Vault {
    /// Root directory of the vault (parent of .fdc/)
    root: PathBuf,
}

impl Vault {
    /// Find the vault root by walking up from the current directory
    pub fn discover() -> Result<Self, VaultError> {
        let current =
            std::env::current_dir().map_err(|e| VaultError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find the vault root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, VaultError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| VaultError::IoError(e.to_string()))?;

        loop {
            let fdc_dir = current.join(".fdc");
            if fdc_dir.is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(VaultError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Create a new vault structure at the given path
    pub fn init(path: &Path) -> Result<Self, VaultError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        let fdc_dir = root.join(".fdc");
        if fdc_dir.exists() {
            return Err(VaultError::AlreadyExists(root.clone()));
        }

        Self::create_layout(&fdc_dir)?;
        Ok(Self { root })
    }

    /// Force initialization even if .fdc/ exists
    pub fn init_force(path: &Path) -> Result<Self, VaultError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        Self::create_layout(&root.join(".fdc"))?;
        Ok(Self { root })
    }

    fn create_layout(fdc_dir: &Path) -> Result<(), VaultError> {
        std::fs::create_dir_all(fdc_dir.join("blobs"))
            .map_err(|e| VaultError::IoError(e.to_string()))?;

        let config_path = fdc_dir.join("config.yaml");
        if !config_path.exists() {
            std::fs::write(&config_path, Self::default_config())
                .map_err(|e| VaultError::IoError(e.to_string()))?;
        }

        Ok(())
    }

    fn default_config() -> &'static str {
        r#"# FDC Vault Configuration

# Default owner for new documents (can be overridden by global config)
# owner: ""

# Horizon in days for the "due soon" review bucket (default: 30)
# due_soon_days: 30

# Default output format (auto, yaml, tsv, json, csv, md, id)
# default_format: auto
"#
    }

    /// Get the vault root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .fdc control directory
    pub fn fdc_dir(&self) -> PathBuf {
        self.root.join(".fdc")
    }

    /// Path to the registry database
    pub fn registry_path(&self) -> PathBuf {
        self.fdc_dir().join("registry.db")
    }

    /// Root of the content-addressed blob store
    pub fn blobs_dir(&self) -> PathBuf {
        self.fdc_dir().join("blobs")
    }

    /// Path of the best-effort notification log
    pub fn notifications_path(&self) -> PathBuf {
        self.fdc_dir().join("notifications.log")
    }
}

/// Errors that can occur during vault operations
#[derive(Debug, Error)]
pub enum VaultError {
    #[error("not an FDC vault (searched from {searched_from:?}). Run 'fdc init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("FDC vault already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),
}
