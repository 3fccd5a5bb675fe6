//! Projects that make up the stack
//!
//! The stack is a fixed, ordered list: every project may depend on anything
//! installed by the projects before it.

use std::fmt;

use crate::config::urls;
use crate::error::StackError;

/// Build procedure used by a project
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildSystem {
    /// autogen.sh, configure, make, make install
    Autotools,
    /// meson setup, ninja, ninja install
    Meson,
}

impl fmt::Display for BuildSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Autotools => f.write_str("autotools"),
            Self::Meson => f.write_str("meson"),
        }
    }
}

/// Branch selection for a project
///
/// Every project states its branch explicitly so that a selection can never
/// carry over from one project to the next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Branch {
    /// Whatever is checked out (the remote's default branch after a clone)
    Current,
    /// A specific remote branch
    Named(String),
}

impl Branch {
    /// Create a named branch selection
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// Branch name, or `None` for [`Branch::Current`]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Current => None,
            Self::Named(name) => Some(name),
        }
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Current => f.write_str("(current)"),
            Self::Named(name) => f.write_str(name),
        }
    }
}

/// One repository in the stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSpec {
    /// Short name used in output and for `--only`
    pub name: String,
    /// Remote repository URL
    pub url: String,
    /// Branch to track
    pub branch: Branch,
    /// Build procedure
    pub build_system: BuildSystem,
}

impl ProjectSpec {
    /// Create a project specification
    pub fn new(name: &str, url: &str, branch: Branch, build_system: BuildSystem) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            branch,
            build_system,
        }
    }
}

/// The full stack in dependency order
pub fn stack() -> Vec<ProjectSpec> {
    vec![
        ProjectSpec::new(
            "mypaint-brushes",
            urls::MYPAINT_BRUSHES,
            Branch::named(urls::MYPAINT_BRUSHES_BRANCH),
            BuildSystem::Autotools,
        ),
        ProjectSpec::new(
            "libmypaint",
            urls::LIBMYPAINT,
            Branch::named(urls::LIBMYPAINT_BRANCH),
            BuildSystem::Autotools,
        ),
        ProjectSpec::new("babl", urls::BABL, Branch::Current, BuildSystem::Meson),
        ProjectSpec::new("gegl", urls::GEGL, Branch::Current, BuildSystem::Meson),
        ProjectSpec::new("gimp", urls::GIMP, Branch::Current, BuildSystem::Autotools),
    ]
}

/// Restrict `projects` to the names in `only`, keeping dependency order
///
/// An empty `only` selects everything. Unknown names are rejected.
pub fn select(projects: Vec<ProjectSpec>, only: &[String]) -> Result<Vec<ProjectSpec>, StackError> {
    if only.is_empty() {
        return Ok(projects);
    }

    if let Some(unknown) = only
        .iter()
        .find(|name| !projects.iter().any(|p| &p.name == *name))
    {
        return Err(StackError::UnknownProject {
            name: unknown.clone(),
            known: projects
                .iter()
                .map(|p| p.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        });
    }

    Ok(projects
        .into_iter()
        .filter(|p| only.contains(&p.name))
        .collect())
}
