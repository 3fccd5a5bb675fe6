//! Build orchestration
//!
//! Drives the stack in dependency order: resolve the target, derive the build
//! environment, optionally rewrite the site configuration, then sync each
//! project and build it when its checkout changed. The first error stops the
//! run; partially installed prefixes are left in place for inspection.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::core::build_env::{inherited_search_paths, BuildEnvironment, BuildTarget};
use crate::core::builder::BuildDispatcher;
use crate::core::project::{BuildSystem, ProjectSpec};
use crate::error::StackError;
use crate::infra::filesystem::write_site_config;
use crate::infra::git::GitOperations;
use crate::infra::process::CommandRunner;

/// Everything a run needs to know, fixed for the whole run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackSettings {
    /// Version label
    pub label: String,
    /// Parent of all installation prefixes
    pub prefix_root: PathBuf,
    /// Parent of all source trees
    pub source_root: PathBuf,
    /// Purge untracked files, rebuild everything, rewrite the site configuration
    pub clean: bool,
    /// Rebuild even when nothing changed
    pub force: bool,
    /// Parallel compile jobs
    pub jobs: usize,
}

/// Progress notifications emitted while the stack is processed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent<'a> {
    /// Site configuration was rewritten (clean mode)
    SiteConfigWritten { path: &'a Path },
    /// About to sync a project
    SyncStarted { project: &'a str },
    /// Project synced
    Synced { project: &'a str, changed: bool },
    /// About to build a project
    BuildStarted {
        project: &'a str,
        build_system: BuildSystem,
    },
    /// A build stage is starting
    StageStarted { project: &'a str, stage: &'a str },
    /// Project finished building and installing
    Built { project: &'a str },
    /// Project was unchanged and not rebuilt
    Skipped { project: &'a str },
}

/// What happened to one project
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectOutcome {
    /// Synced and rebuilt
    Built,
    /// Synced, nothing new, not rebuilt
    UpToDate,
}

/// Outcome of a completed run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Per-project outcome in build order
    pub outcomes: Vec<(String, ProjectOutcome)>,
    /// Site configuration written this run, if any
    pub site_config: Option<PathBuf>,
}

impl RunReport {
    /// Number of projects that were rebuilt
    pub fn built_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| *outcome == ProjectOutcome::Built)
            .count()
    }
}

/// Sequential sync-and-build driver
pub struct Pipeline<'a> {
    settings: StackSettings,
    runner: &'a dyn CommandRunner,
    ambient: HashMap<String, String>,
    arch: Option<String>,
}

impl<'a> Pipeline<'a> {
    /// Create a pipeline that inherits search paths from the process environment
    pub fn new(settings: StackSettings, runner: &'a dyn CommandRunner) -> Self {
        Self {
            settings,
            runner,
            ambient: inherited_search_paths(|key| std::env::var_os(key)),
            arch: None,
        }
    }

    /// Replace the environment that pre-existing search paths are read from
    #[must_use]
    pub fn with_ambient_env(mut self, ambient: HashMap<String, String>) -> Self {
        self.ambient = ambient;
        self
    }

    /// Override the architecture used for meson build directories
    #[must_use]
    pub fn with_arch(mut self, arch: &str) -> Self {
        self.arch = Some(arch.to_string());
        self
    }

    /// Process `projects` in the given order
    pub fn run(
        &self,
        projects: &[ProjectSpec],
        events: &mut dyn FnMut(PipelineEvent<'_>),
    ) -> Result<RunReport, StackError> {
        let settings = &self.settings;
        let target = BuildTarget::resolve(&settings.label, &settings.prefix_root, &settings.source_root)?;
        let env = BuildEnvironment::from_ambient(&target, |key| self.ambient.get(key).cloned())
            .with_jobs(settings.jobs);
        env.validate()?;

        tracing::info!(
            label = %target.label,
            prefix = %target.prefix.display(),
            source_root = %target.source_root.display(),
            clean = settings.clean,
            force = settings.force,
            "starting stack build"
        );

        let mut report = RunReport::default();

        if settings.clean {
            let path = write_site_config(&target.prefix, &env.render_site_config())?;
            events(PipelineEvent::SiteConfigWritten { path: &path });
            report.site_config = Some(path);
        }

        let git = GitOperations::new(target.source_root.clone(), self.runner);
        let mut dispatcher = BuildDispatcher::new(self.runner, &env);
        if let Some(arch) = &self.arch {
            dispatcher = dispatcher.with_arch(arch);
        }

        for project in projects {
            let name = project.name.as_str();

            events(PipelineEvent::SyncStarted { project: name });
            let synced = git.sync(project, settings.clean)?;
            events(PipelineEvent::Synced {
                project: name,
                changed: synced.changed,
            });

            if !synced.changed && !settings.force {
                events(PipelineEvent::Skipped { project: name });
                report.outcomes.push((project.name.clone(), ProjectOutcome::UpToDate));
                continue;
            }

            events(PipelineEvent::BuildStarted {
                project: name,
                build_system: project.build_system,
            });
            dispatcher.build(name, project.build_system, &synced.path, &mut |stage| {
                events(PipelineEvent::StageStarted {
                    project: name,
                    stage,
                });
            })?;
            events(PipelineEvent::Built { project: name });
            report.outcomes.push((project.name.clone(), ProjectOutcome::Built));
        }

        Ok(report)
    }
}
