//! Toolchain discovery
//!
//! Checks that the external programs stackbuild drives are on `PATH`.

use std::path::PathBuf;

/// Programs every run needs
pub const REQUIRED_TOOLS: &[&str] = &["git"];

/// Programs only needed once a build is triggered
pub const BUILD_TOOLS: &[&str] = &["make", "meson", "ninja"];

/// Presence of one external program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolStatus {
    /// Program name
    pub name: &'static str,
    /// Resolved location, if found
    pub path: Option<PathBuf>,
}

impl ToolStatus {
    /// Whether the program was found
    pub fn found(&self) -> bool {
        self.path.is_some()
    }
}

/// Look up `tools` on `PATH`
pub fn probe(tools: &[&'static str]) -> Vec<ToolStatus> {
    tools
        .iter()
        .map(|&name| ToolStatus {
            name,
            path: which::which(name).ok(),
        })
        .collect()
}

/// Names of the tools in `statuses` that were not found
pub fn missing(statuses: &[ToolStatus]) -> Vec<&'static str> {
    statuses
        .iter()
        .filter(|s| !s.found())
        .map(|s| s.name)
        .collect()
}
