//! Build environment setup
//!
//! Resolves the installation prefix and source root for a version label and
//! derives the search-path variables every build step needs, so that spawned
//! tools find headers, libraries, pkg-config files and data from the private
//! prefix before anything installed system-wide.
//!
//! The variables are never exported into stackbuild's own process. They are
//! handed to each subprocess through [`BuildEnvironment::to_env_map`], and in
//! clean mode also written to `$PREFIX/share/config.site`, which `configure`
//! scripts read implicitly.

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

use crate::config::defaults::{DEFAULT_BUILD_JOBS, DEFAULT_XDG_DATA_DIRS};
use crate::error::EnvError;

/// Prefix and source locations for one version label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildTarget {
    /// Version label (e.g. "master", "2.10")
    pub label: String,
    /// Installation prefix (`<prefix root>/<label>`)
    pub prefix: PathBuf,
    /// Parent of all checkouts (`<source root>/<label>`)
    pub source_root: PathBuf,
}

impl BuildTarget {
    /// Compute the target for `label` without checking the filesystem
    pub fn new(label: &str, prefix_root: &Path, source_root: &Path) -> Self {
        Self {
            label: label.to_string(),
            prefix: prefix_root.join(label),
            source_root: source_root.join(label),
        }
    }

    /// Compute the target for `label` and require both directories to exist
    ///
    /// The label must be one plain path component, so both paths stay directly
    /// under their roots. The directories are never created here: a missing
    /// one almost always means a mistyped label.
    pub fn resolve(label: &str, prefix_root: &Path, source_root: &Path) -> Result<Self, EnvError> {
        if !is_plain_label(label) {
            return Err(EnvError::InvalidLabel {
                label: label.to_string(),
            });
        }

        let target = Self::new(label, prefix_root, source_root);

        if !target.prefix.is_dir() {
            return Err(EnvError::PrefixMissing {
                path: target.prefix,
            });
        }
        if !target.source_root.is_dir() {
            return Err(EnvError::SourceRootMissing {
                path: target.source_root,
            });
        }

        Ok(target)
    }
}

/// Whether `label` is exactly one normal path component
fn is_plain_label(label: &str) -> bool {
    let mut components = Path::new(label).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(name)), None) if name == label
    )
}

/// Join `entries` in front of an existing separator-delimited value
///
/// An unset or empty `existing` value contributes nothing, so the result never
/// ends with a dangling separator.
pub fn prepend_search_path(entries: &[String], existing: Option<&str>, separator: &str) -> String {
    let mut parts: Vec<&str> = entries.iter().map(String::as_str).collect();
    if let Some(existing) = existing.filter(|v| !v.is_empty()) {
        parts.push(existing);
    }
    parts.join(separator)
}

/// Variables whose inherited values are extended rather than replaced
pub const INHERITED_SEARCH_PATHS: [&str; 6] = [
    "PATH",
    "LD_LIBRARY_PATH",
    "PKG_CONFIG_PATH",
    "GI_TYPELIB_PATH",
    "ACLOCAL_FLAGS",
    "XDG_DATA_DIRS",
];

/// Inherited values of [`INHERITED_SEARCH_PATHS`], read through `lookup`
///
/// Other variables are never read. A value that is not valid UTF-8 is
/// skipped as if unset.
pub fn inherited_search_paths<F>(lookup: F) -> HashMap<String, String>
where
    F: Fn(&str) -> Option<OsString>,
{
    INHERITED_SEARCH_PATHS
        .iter()
        .filter_map(|&key| match lookup(key)?.into_string() {
            Ok(value) => Some((key.to_string(), value)),
            Err(_) => {
                tracing::warn!(variable = key, "ignoring inherited value that is not valid UTF-8");
                None
            }
        })
        .collect()
}

/// Search-path environment for building against a private prefix
#[derive(Debug, Clone, PartialEq)]
pub struct BuildEnvironment {
    /// Install prefix
    pub prefix: PathBuf,
    /// Executable search path
    pub path: String,
    /// Runtime library search path
    pub ld_library_path: String,
    /// pkg-config metadata search path
    pub pkg_config_path: String,
    /// GObject introspection typelib search path
    pub gi_typelib_path: String,
    /// Extra aclocal macro directories
    pub aclocal_flags: String,
    /// Shared-data search path
    pub xdg_data_dirs: String,
    /// Number of parallel compile jobs
    pub jobs: usize,
}

impl BuildEnvironment {
    /// Derive the environment for `target`, reading pre-existing values through `ambient`
    pub fn from_ambient<F>(target: &BuildTarget, ambient: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let prefix = &target.prefix;
        let at = |rel: &str| prefix.join(rel).display().to_string();
        let existing = |key: &str| ambient(key);

        let xdg_existing = existing("XDG_DATA_DIRS")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_XDG_DATA_DIRS.to_string());

        Self {
            prefix: prefix.clone(),
            path: prepend_search_path(&[at("bin")], existing("PATH").as_deref(), ":"),
            ld_library_path: prepend_search_path(
                &[at("lib")],
                existing("LD_LIBRARY_PATH").as_deref(),
                ":",
            ),
            pkg_config_path: prepend_search_path(
                &[at("lib/pkgconfig"), at("share/pkgconfig")],
                existing("PKG_CONFIG_PATH").as_deref(),
                ":",
            ),
            gi_typelib_path: prepend_search_path(
                &[at("lib/girepository-1.0")],
                existing("GI_TYPELIB_PATH").as_deref(),
                ":",
            ),
            aclocal_flags: prepend_search_path(
                &[format!("-I {}", at("share/aclocal"))],
                existing("ACLOCAL_FLAGS").as_deref(),
                " ",
            ),
            xdg_data_dirs: prepend_search_path(&[at("share")], Some(xdg_existing.as_str()), ":"),
            jobs: DEFAULT_BUILD_JOBS,
        }
    }

    /// Set the number of parallel jobs
    #[must_use]
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    /// Search-path variables in a stable order
    pub fn search_paths(&self) -> [(&'static str, &str); 6] {
        [
            ("PATH", self.path.as_str()),
            ("LD_LIBRARY_PATH", self.ld_library_path.as_str()),
            ("PKG_CONFIG_PATH", self.pkg_config_path.as_str()),
            ("GI_TYPELIB_PATH", self.gi_typelib_path.as_str()),
            ("ACLOCAL_FLAGS", self.aclocal_flags.as_str()),
            ("XDG_DATA_DIRS", self.xdg_data_dirs.as_str()),
        ]
    }

    /// Convert to environment variable map for process execution
    pub fn to_env_map(&self) -> HashMap<String, String> {
        self.search_paths()
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect()
    }

    /// Contents of `$PREFIX/share/config.site`
    pub fn render_site_config(&self) -> String {
        let mut out = format!(
            "# Generated by stackbuild for prefix {}\n# Rewritten on every clean run; local edits will be lost.\n\n",
            self.prefix.display()
        );
        for (key, value) in self.search_paths() {
            out.push_str(&format!("export {key}=\"{}\"\n", shell_escape(value)));
        }
        out
    }

    /// Check that the environment is usable
    pub fn validate(&self) -> Result<(), EnvError> {
        if self.jobs == 0 {
            return Err(EnvError::InvalidJobs { jobs: self.jobs });
        }
        Ok(())
    }
}

/// Escape a value for use inside double quotes in a POSIX shell
fn shell_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
