//! Error types for stackbuild
//!
//! Domain-specific error types using thiserror. Git and process errors live
//! next to the code that raises them in [`crate::infra`]; configuration errors
//! live in [`crate::core::global_config`].

use std::path::PathBuf;
use thiserror::Error;

use crate::core::global_config::ConfigError;
use crate::infra::git::GitError;
use crate::infra::process::ProcessError;

/// Build environment errors
///
/// These are precondition failures: they are raised before any repository is
/// contacted.
#[derive(Error, Debug)]
pub enum EnvError {
    /// Installation prefix for the version label is missing
    #[error(
        "Prefix directory '{}' does not exist. Create it (mkdir -p {}) or check the version label",
        path.display(),
        path.display()
    )]
    PrefixMissing { path: PathBuf },

    /// Source root for the version label is missing
    #[error(
        "Source directory '{}' does not exist. Create it (mkdir -p {}) or check the version label",
        path.display(),
        path.display()
    )]
    SourceRootMissing { path: PathBuf },

    /// Version label is not a single directory name
    #[error("Invalid version label '{label}': must be a single directory name such as 'master' or '2.10'")]
    InvalidLabel { label: String },

    /// Job count is unusable
    #[error("Invalid job count {jobs}: must be greater than 0")]
    InvalidJobs { jobs: usize },

    /// Writing the site configuration failed
    #[error("Failed to write site configuration '{}': {error}", path.display())]
    SiteConfigWrite { path: PathBuf, error: String },
}

/// Build errors
#[derive(Error, Debug)]
pub enum BuildError {
    /// A build stage exited unsuccessfully or could not be started
    #[error("{stage} stage failed for '{project}'")]
    StageFailed {
        project: String,
        stage: String,
        #[source]
        source: ProcessError,
    },

    /// Failed to create the out-of-tree build directory
    #[error("Failed to create build directory '{}': {error}", path.display())]
    CreateBuildDir { path: PathBuf, error: String },
}

impl BuildError {
    /// Exit code to propagate to the shell
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::StageFailed { source, .. } => source.exit_code(),
            Self::CreateBuildDir { .. } => 1,
        }
    }
}

/// Top-level stackbuild error type
#[derive(Error, Debug)]
pub enum StackError {
    /// Environment/precondition error
    #[error(transparent)]
    Env(#[from] EnvError),

    /// Repository synchronization error
    #[error(transparent)]
    Git(#[from] GitError),

    /// Build error
    #[error(transparent)]
    Build(#[from] BuildError),

    /// Configuration file error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A project name given on the command line is not part of the stack
    #[error("Unknown project '{name}'. Known projects: {known}")]
    UnknownProject { name: String, known: String },

    /// Malformed command-line invocation
    #[error("{0}")]
    Usage(String),
}

impl StackError {
    /// Exit code to propagate to the shell
    ///
    /// Subprocess failures surface the failed command's own exit code;
    /// everything else exits with 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Git(e) => e.exit_code(),
            Self::Build(e) => e.exit_code(),
            Self::Env(_) | Self::Config(_) | Self::UnknownProject { .. } | Self::Usage(_) => 1,
        }
    }
}
