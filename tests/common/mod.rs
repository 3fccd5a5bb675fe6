//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Test workspace context
///
/// Creates a temporary home holding a prefix root, a source root and a
/// config file location, and runs the stackbuild binary against them.
pub struct TestWorkspace {
    /// Temporary directory for the workspace
    pub dir: TempDir,
}

impl TestWorkspace {
    /// Create a new workspace in a temporary directory
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Get the path to the workspace directory
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Parent of all prefixes
    pub fn prefix_root(&self) -> PathBuf {
        self.dir.path().join("run")
    }

    /// Parent of all source trees
    pub fn source_root(&self) -> PathBuf {
        self.dir.path().join("outsrc")
    }

    /// Config file location (may not exist)
    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join("config.toml")
    }

    /// Create the prefix and source directories for `label`
    pub fn create_label(&self, label: &str) {
        std::fs::create_dir_all(self.prefix_root().join(label)).expect("Failed to create prefix");
        std::fs::create_dir_all(self.source_root().join(label)).expect("Failed to create source dir");
    }

    /// Create a file in the workspace
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Check if a file exists in the workspace
    pub fn file_exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }

    /// Run stackbuild with the workspace roots
    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_stackbuild"))
            .current_dir(self.dir.path())
            .env("STACKBUILD_PREFIX_ROOT", self.prefix_root())
            .env("STACKBUILD_SOURCE_ROOT", self.source_root())
            .env("STACKBUILD_CONFIG", self.config_path())
            .env_remove("RUST_LOG")
            .args(args)
            .output()
            .expect("Failed to execute stackbuild")
    }
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether a git client is available
pub fn git_available() -> bool {
    which::which("git").is_ok()
}

/// Run git in `dir` with a fixed identity, panicking on failure
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .current_dir(dir)
        .env("LC_ALL", "C")
        .env("GIT_TERMINAL_PROMPT", "0")
        .args(["-c", "user.name=Stack Tester", "-c", "user.email=tester@example.com"])
        .args(args)
        .output()
        .expect("Failed to execute git");
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Initialize a repository at `dir` holding one commit
pub fn init_origin(dir: &Path) {
    std::fs::create_dir_all(dir).expect("Failed to create origin directory");
    git(dir, &["init", "--quiet"]);
    std::fs::write(dir.join("README"), "first\n").expect("Failed to write file");
    git(dir, &["add", "README"]);
    git(dir, &["commit", "--quiet", "-m", "first"]);
}

/// Add a commit to the repository at `dir`
pub fn commit_change(dir: &Path, file: &str, content: &str) {
    std::fs::write(dir.join(file), content).expect("Failed to write file");
    git(dir, &["add", file]);
    git(dir, &["commit", "--quiet", "-m", &format!("update {file}")]);
}

/// Sample global config TOML for testing
pub const SAMPLE_CONFIG: &str = r#"
[paths]
prefix_root = "/opt/gimp/run"
source_root = "/opt/gimp/src"

[build]
jobs = 12
default_version = "2.10"
"#;
