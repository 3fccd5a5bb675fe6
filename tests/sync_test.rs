//! Integration tests for repository synchronization against real git
//!
//! - A missing checkout is cloned and reported as changed
//! - Pulling with nothing new reports unchanged; new commits report changed
//! - Named branches are checked out and tracked
//! - Clean mode purges untracked files and forces a rebuild
//! - The pipeline only rebuilds what changed

mod common;

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;

use stackbuild::core::pipeline::{Pipeline, ProjectOutcome, StackSettings};
use stackbuild::core::project::{Branch, BuildSystem, ProjectSpec};
use stackbuild::infra::git::GitOperations;
use stackbuild::infra::process::{CommandOutput, CommandRunner, CommandSpec, ProcessError, SystemRunner};
use tempfile::TempDir;

/// Runs git for real and only records everything else
#[derive(Default)]
struct GitOnlyRunner {
    builds: RefCell<Vec<String>>,
}

impl CommandRunner for GitOnlyRunner {
    fn run(&self, spec: &CommandSpec) -> Result<(), ProcessError> {
        if spec.program == "git" {
            return SystemRunner.run(spec);
        }
        self.builds.borrow_mut().push(spec.to_string());
        Ok(())
    }

    fn capture(&self, spec: &CommandSpec) -> Result<CommandOutput, ProcessError> {
        if spec.program == "git" {
            return SystemRunner.capture(spec);
        }
        self.builds.borrow_mut().push(spec.to_string());
        Ok(CommandOutput::default())
    }
}

fn project(origin: &Path, branch: Branch) -> ProjectSpec {
    ProjectSpec::new(
        "babl",
        &origin.display().to_string(),
        branch,
        BuildSystem::Meson,
    )
}

#[test]
fn test_clone_then_pull_reports_changes() {
    if !common::git_available() {
        eprintln!("git not available, skipping");
        return;
    }
    let temp = TempDir::new().unwrap();
    let origin = temp.path().join("origin").join("babl");
    let source_root = temp.path().join("src");
    std::fs::create_dir_all(&source_root).unwrap();
    common::init_origin(&origin);

    let runner = SystemRunner;
    let git = GitOperations::new(source_root.clone(), &runner);
    let spec = project(&origin, Branch::Current);

    let first = git.sync(&spec, false).unwrap();
    assert!(first.changed);
    assert_eq!(first.path, source_root.join("babl"));
    assert!(first.path.join("README").is_file());

    let second = git.sync(&spec, false).unwrap();
    assert!(!second.changed);

    common::commit_change(&origin, "NEWS", "second\n");
    let third = git.sync(&spec, false).unwrap();
    assert!(third.changed);
    assert!(third.path.join("NEWS").is_file());
}

#[test]
fn test_named_branch_is_tracked() {
    if !common::git_available() {
        eprintln!("git not available, skipping");
        return;
    }
    let temp = TempDir::new().unwrap();
    let origin = temp.path().join("origin").join("babl");
    let source_root = temp.path().join("src");
    std::fs::create_dir_all(&source_root).unwrap();
    common::init_origin(&origin);
    common::git(&origin, &["branch", "v1.3.x"]);

    let runner = SystemRunner;
    let git = GitOperations::new(source_root, &runner);
    let spec = project(&origin, Branch::named("v1.3.x"));

    let result = git.sync(&spec, false).unwrap();
    let branch = common::git(&result.path, &["rev-parse", "--abbrev-ref", "HEAD"]);
    assert_eq!(branch.trim(), "v1.3.x");

    // Updating an existing checkout switches back to the branch before pulling
    let again = git.sync(&spec, false).unwrap();
    assert!(!again.changed);
}

#[test]
fn test_clean_purges_untracked_files() {
    if !common::git_available() {
        eprintln!("git not available, skipping");
        return;
    }
    let temp = TempDir::new().unwrap();
    let origin = temp.path().join("origin").join("babl");
    let source_root = temp.path().join("src");
    std::fs::create_dir_all(&source_root).unwrap();
    common::init_origin(&origin);

    let runner = SystemRunner;
    let git = GitOperations::new(source_root, &runner);
    let spec = project(&origin, Branch::Current);

    let checkout = git.sync(&spec, false).unwrap().path;
    std::fs::create_dir_all(checkout.join("obj-x86_64")).unwrap();
    std::fs::write(checkout.join("obj-x86_64").join("build.ninja"), "").unwrap();

    let result = git.sync(&spec, true).unwrap();
    assert!(result.changed);
    assert!(!checkout.join("obj-x86_64").exists());
    assert!(checkout.join("README").is_file());
}

#[test]
fn test_pull_failure_is_reported() {
    if !common::git_available() {
        eprintln!("git not available, skipping");
        return;
    }
    let temp = TempDir::new().unwrap();
    let source_root = temp.path().join("src");
    std::fs::create_dir_all(&source_root).unwrap();

    let runner = SystemRunner;
    let git = GitOperations::new(source_root, &runner);
    let spec = project(&temp.path().join("nowhere").join("babl"), Branch::Current);

    let err = git.sync(&spec, false).unwrap_err();
    assert!(err.to_string().contains("Failed to clone"));
    assert_ne!(err.exit_code(), 0);
}

#[test]
fn test_pipeline_rebuilds_only_changed_projects() {
    if !common::git_available() {
        eprintln!("git not available, skipping");
        return;
    }
    let temp = TempDir::new().unwrap();
    let prefix_root = temp.path().join("run");
    let source_root = temp.path().join("outsrc");
    std::fs::create_dir_all(prefix_root.join("master")).unwrap();
    std::fs::create_dir_all(source_root.join("master")).unwrap();

    let babl_origin = temp.path().join("origin").join("babl");
    let gegl_origin = temp.path().join("origin").join("gegl");
    common::init_origin(&babl_origin);
    common::init_origin(&gegl_origin);
    let projects = vec![
        ProjectSpec::new("babl", &babl_origin.display().to_string(), Branch::Current, BuildSystem::Meson),
        ProjectSpec::new("gegl", &gegl_origin.display().to_string(), Branch::Current, BuildSystem::Meson),
    ];

    let settings = StackSettings {
        label: "master".to_string(),
        prefix_root,
        source_root: source_root.clone(),
        clean: false,
        force: false,
        jobs: 2,
    };

    // First run clones and builds both
    let runner = GitOnlyRunner::default();
    let pipeline = Pipeline::new(settings.clone(), &runner)
        .with_ambient_env(HashMap::new())
        .with_arch("x86_64");
    let report = pipeline.run(&projects, &mut |_| {}).unwrap();
    assert_eq!(report.built_count(), 2);
    assert!(source_root.join("master").join("gegl").join("README").is_file());

    // Only gegl moves upstream
    common::commit_change(&gegl_origin, "NEWS", "second\n");
    let runner = GitOnlyRunner::default();
    let pipeline = Pipeline::new(settings, &runner)
        .with_ambient_env(HashMap::new())
        .with_arch("x86_64");
    let report = pipeline.run(&projects, &mut |_| {}).unwrap();

    assert_eq!(
        report.outcomes,
        vec![
            ("babl".to_string(), ProjectOutcome::UpToDate),
            ("gegl".to_string(), ProjectOutcome::Built),
        ]
    );
    let builds = runner.builds.borrow();
    // setup, compile and install for gegl alone
    assert_eq!(builds.len(), 3);
    assert_eq!(builds.last().map(String::as_str), Some("ninja -C obj-x86_64 install"));
}
