//! Git operations
//!
//! Keeps one working copy per project under the source root: clones it when
//! it is missing, otherwise checks out the tracked branch and pulls. The
//! git command-line client does the work; `gix` is only used to read HEAD so
//! the revision change can be logged.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::project::ProjectSpec;
use crate::infra::process::{CommandOutput, CommandRunner, CommandSpec, ProcessError};

/// Git operation errors
#[derive(Error, Debug)]
pub enum GitError {
    /// URL has no usable repository name
    #[error("Cannot derive a directory name from repository URL '{url}'")]
    InvalidUrl { url: String },

    /// Failed to clone repository
    #[error("Failed to clone '{url}'")]
    CloneFailed {
        url: String,
        #[source]
        source: ProcessError,
    },

    /// Failed to checkout branch
    #[error("Failed to checkout branch '{branch}' in '{}'", repo.display())]
    CheckoutFailed {
        repo: PathBuf,
        branch: String,
        #[source]
        source: ProcessError,
    },

    /// Failed to pull
    #[error("Failed to pull in '{}'", repo.display())]
    PullFailed {
        repo: PathBuf,
        #[source]
        source: ProcessError,
    },

    /// Failed to remove untracked files
    #[error("Failed to clean untracked files in '{}'", repo.display())]
    CleanFailed {
        repo: PathBuf,
        #[source]
        source: ProcessError,
    },
}

impl GitError {
    /// Exit code to propagate to the shell
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidUrl { .. } => 1,
            Self::CloneFailed { source, .. }
            | Self::CheckoutFailed { source, .. }
            | Self::PullFailed { source, .. }
            | Self::CleanFailed { source, .. } => source.exit_code(),
        }
    }
}

/// Result of synchronizing one project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncResult {
    /// Whether the working copy may differ from what was last built
    pub changed: bool,
    /// The project's working copy; all later commands for the project run here
    pub path: PathBuf,
}

/// Local directory name for a repository URL
///
/// Takes the last path segment and strips its extension, so
/// `https://gitlab.gnome.org/GNOME/babl.git` becomes `babl`. A URL that names
/// only a host has no such segment.
pub fn repo_dir_name(url: &str) -> Option<&str> {
    let trimmed = url.trim_end_matches('/');
    if let Some((_, rest)) = trimmed.split_once("://") {
        if !rest.contains('/') {
            return None;
        }
    }
    let last = trimmed.rsplit(|c: char| c == '/' || c == ':').next()?;
    let name = match last.rsplit_once('.') {
        Some((stem, _)) => stem,
        None => last,
    };

    if name.is_empty() || name == "." {
        None
    } else {
        Some(name)
    }
}

/// Whether `git pull` output says nothing was fetched
///
/// Git has printed both spellings over the years.
pub fn pull_reported_up_to_date(stdout: &str) -> bool {
    let lower = stdout.to_ascii_lowercase();
    lower.contains("already up to date") || lower.contains("already up-to-date")
}

/// Short HEAD revision of the repository at `path`, if it can be read
pub fn head_revision(path: &Path) -> Option<String> {
    let repo = gix::open(path).ok()?;
    let id = repo.head_id().ok()?;
    Some(id.to_hex_with_len(10).to_string())
}

/// Git repository operations
pub struct GitOperations<'a> {
    /// Directory holding one checkout per project
    source_root: PathBuf,
    /// Runs the git client
    runner: &'a dyn CommandRunner,
}

impl<'a> GitOperations<'a> {
    /// Create a new git operations handler
    pub fn new(source_root: PathBuf, runner: &'a dyn CommandRunner) -> Self {
        Self {
            source_root,
            runner,
        }
    }

    /// Clone or update the working copy of `project`
    ///
    /// With `clean`, untracked and ignored files are purged before updating
    /// and the project is always reported as changed.
    pub fn sync(&self, project: &ProjectSpec, clean: bool) -> Result<SyncResult, GitError> {
        let name = repo_dir_name(&project.url).ok_or_else(|| GitError::InvalidUrl {
            url: project.url.clone(),
        })?;
        let path = self.source_root.join(name);

        if path.is_dir() {
            self.update(project, path, clean)
        } else {
            self.clone_fresh(project, name, path)
        }
    }

    fn update(&self, project: &ProjectSpec, path: PathBuf, clean: bool) -> Result<SyncResult, GitError> {
        if clean {
            self.git(&path, &["clean", "-dfx"])
                .map_err(|source| GitError::CleanFailed {
                    repo: path.clone(),
                    source,
                })?;
        }

        if let Some(branch) = project.branch.name() {
            self.git(&path, &["checkout", branch])
                .map_err(|source| GitError::CheckoutFailed {
                    repo: path.clone(),
                    branch: branch.to_string(),
                    source,
                })?;
        }

        let before = head_revision(&path);
        let pulled = self
            .git(&path, &["pull"])
            .map_err(|source| GitError::PullFailed {
                repo: path.clone(),
                source,
            })?;
        let up_to_date = pull_reported_up_to_date(&pulled.stdout);

        if up_to_date {
            tracing::info!(project = %project.name, "already up to date");
        } else {
            tracing::info!(
                project = %project.name,
                from = before.as_deref().unwrap_or("?"),
                to = head_revision(&path).as_deref().unwrap_or("?"),
                "pulled new commits"
            );
        }

        Ok(SyncResult {
            changed: clean || !up_to_date,
            path,
        })
    }

    fn clone_fresh(&self, project: &ProjectSpec, name: &str, path: PathBuf) -> Result<SyncResult, GitError> {
        self.git(&self.source_root, &["clone", project.url.as_str(), name])
            .map_err(|source| GitError::CloneFailed {
                url: project.url.clone(),
                source,
            })?;

        if let Some(branch) = project.branch.name() {
            let remote_branch = format!("origin/{branch}");
            self.git(&path, &["checkout", "--track", remote_branch.as_str()])
                .map_err(|source| GitError::CheckoutFailed {
                    repo: path.clone(),
                    branch: branch.to_string(),
                    source,
                })?;
        }

        tracing::info!(
            project = %project.name,
            head = head_revision(&path).as_deref().unwrap_or("?"),
            "cloned"
        );

        Ok(SyncResult {
            changed: true,
            path,
        })
    }

    fn git(&self, cwd: &Path, args: &[&str]) -> Result<CommandOutput, ProcessError> {
        let cmd = CommandSpec::new("git", cwd)
            .args(args.iter().copied())
            .env("LC_ALL", "C")
            .env("GIT_TERMINAL_PROMPT", "0");
        self.runner.capture(&cmd)
    }
}
