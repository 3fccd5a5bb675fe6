//! Platform-specific directory management
//!
//! Default locations for the config file and for the prefix and source roots.
//! Prefixes live under `~/run/<label>` and checkouts under `~/outsrc/<label>`
//! unless configured otherwise.

use std::path::PathBuf;

use crate::config::defaults::{DEFAULT_PREFIX_ROOT, DEFAULT_SOURCE_ROOT};

/// Application name used in directory paths
const APP_NAME: &str = "stackbuild";

/// Directory provider for stackbuild
#[derive(Debug, Clone)]
pub struct StackDirs {
    home_dir: PathBuf,
    config_dir: PathBuf,
}

impl StackDirs {
    /// Directories for the current user
    ///
    /// Falls back to the current directory when no home directory can be
    /// determined.
    pub fn new() -> Self {
        let home_dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        let config_dir = dirs::config_dir().unwrap_or_else(|| home_dir.join(".config"));
        Self::with_home(home_dir, config_dir)
    }

    /// Directories rooted at explicit locations
    pub fn with_home(home_dir: PathBuf, config_dir: PathBuf) -> Self {
        Self {
            home_dir,
            config_dir: config_dir.join(APP_NAME),
        }
    }

    /// `~/run`
    pub fn default_prefix_root(&self) -> PathBuf {
        self.home_dir.join(DEFAULT_PREFIX_ROOT)
    }

    /// `~/outsrc`
    pub fn default_source_root(&self) -> PathBuf {
        self.home_dir.join(DEFAULT_SOURCE_ROOT)
    }

    /// Get the config directory path
    pub fn config_dir(&self) -> PathBuf {
        self.config_dir.clone()
    }

    /// Get the global config file path
    pub fn global_config_path(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }
}

impl Default for StackDirs {
    fn default() -> Self {
        Self::new()
    }
}
