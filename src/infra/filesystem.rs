//! Filesystem operations
//!
//! Handles the few files and directories stackbuild creates itself.

use std::path::{Path, PathBuf};

use crate::config::defaults::SITE_CONFIG_PATH;
use crate::error::{BuildError, EnvError};

/// Path of the site configuration file under `prefix`
pub fn site_config_path(prefix: &Path) -> PathBuf {
    prefix.join(SITE_CONFIG_PATH)
}

/// Replace `$PREFIX/share/config.site` with `content`
///
/// Creates `$PREFIX/share` if needed and returns the written path.
pub fn write_site_config(prefix: &Path, content: &str) -> Result<PathBuf, EnvError> {
    let path = site_config_path(prefix);
    let write_error = |error: std::io::Error| EnvError::SiteConfigWrite {
        path: path.clone(),
        error: error.to_string(),
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(write_error)?;
    }
    std::fs::write(&path, content).map_err(write_error)?;

    tracing::info!(path = %path.display(), "wrote site configuration");
    Ok(path)
}

/// Create an out-of-tree build directory and all parent directories
pub fn create_build_dir(path: &Path) -> Result<(), BuildError> {
    std::fs::create_dir_all(path).map_err(|e| BuildError::CreateBuildDir {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}
