//! Global configuration management
//!
//! Reads optional settings from `config.toml` in the config directory:
//! where prefixes and checkouts live, the default version label and the
//! compile job count. Command-line flags and environment variables take
//! precedence over the file; the file takes precedence over built-in defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::defaults::{DEFAULT_BUILD_JOBS, DEFAULT_VERSION};
use crate::infra::dirs::StackDirs;

/// Global configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file '{path}': {error}")]
    ReadError { path: String, error: String },

    /// Failed to parse config file
    #[error("Failed to parse config file '{path}': {error}")]
    ParseError { path: String, error: String },
}

/// Global configuration for stackbuild
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GlobalConfig {
    /// Directory layout
    #[serde(default)]
    pub paths: PathsConfig,

    /// Build settings
    #[serde(default)]
    pub build: BuildConfig,
}

/// Directory layout
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathsConfig {
    /// Parent of all installation prefixes
    pub prefix_root: Option<PathBuf>,

    /// Parent of all source trees
    pub source_root: Option<PathBuf>,
}

/// Build settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildConfig {
    /// Parallel compile jobs
    pub jobs: Option<usize>,

    /// Version label used when none is given
    pub default_version: Option<String>,
}

impl GlobalConfig {
    /// Load global configuration from the config directory
    ///
    /// If the config file doesn't exist, returns default configuration.
    pub fn load(dirs: &StackDirs) -> Result<Self, ConfigError> {
        Self::load_from_path(&dirs.global_config_path())
    }

    /// Load global configuration from a specific path
    ///
    /// A missing file yields the defaults; an unreadable or invalid one is an error.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            error: e.to_string(),
        })
    }

    /// Prefix root: explicit value, then config file, then `~/run`
    pub fn prefix_root(&self, explicit: Option<PathBuf>, dirs: &StackDirs) -> PathBuf {
        explicit
            .or_else(|| self.paths.prefix_root.clone())
            .unwrap_or_else(|| dirs.default_prefix_root())
    }

    /// Source root: explicit value, then config file, then `~/outsrc`
    pub fn source_root(&self, explicit: Option<PathBuf>, dirs: &StackDirs) -> PathBuf {
        explicit
            .or_else(|| self.paths.source_root.clone())
            .unwrap_or_else(|| dirs.default_source_root())
    }

    /// Job count: explicit value, then config file, then 4
    pub fn jobs(&self, explicit: Option<usize>) -> usize {
        explicit.or(self.build.jobs).unwrap_or(DEFAULT_BUILD_JOBS)
    }

    /// Version label used when the command line names none
    pub fn default_version(&self) -> &str {
        self.build.default_version.as_deref().unwrap_or(DEFAULT_VERSION)
    }
}
