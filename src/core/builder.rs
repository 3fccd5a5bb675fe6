//! Build dispatch
//!
//! Turns a synchronized project into an ordered list of build stages and runs
//! them one after another. The first failing stage stops the build; nothing
//! already installed into the prefix is rolled back.

use std::path::{Path, PathBuf};

use crate::config::defaults::{MESON_BUILD_DIR_PREFIX, MESON_LIBDIR};
use crate::core::build_env::BuildEnvironment;
use crate::core::project::BuildSystem;
use crate::error::BuildError;
use crate::infra::filesystem::create_build_dir;
use crate::infra::process::{CommandRunner, CommandSpec};

/// Host CPU architecture, as used in build directory names
pub fn host_arch() -> &'static str {
    std::env::consts::ARCH
}

/// Name of the meson build directory for `arch`
pub fn meson_build_dir_name(arch: &str) -> String {
    format!("{MESON_BUILD_DIR_PREFIX}{arch}")
}

/// One step of a build procedure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildStage {
    /// Stage name shown to the user (bootstrap, configure, compile, install)
    pub name: &'static str,
    /// Command to run
    pub command: CommandSpec,
}

impl BuildStage {
    fn new(name: &'static str, command: CommandSpec) -> Self {
        Self { name, command }
    }
}

/// Ordered build stages for one project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPlan {
    /// Out-of-tree build directory to create first, if the procedure needs one
    pub build_dir: Option<PathBuf>,
    /// Stages, in execution order
    pub stages: Vec<BuildStage>,
}

impl BuildPlan {
    /// Plan the autotools procedure: bootstrap, configure, compile, install
    pub fn autotools(project_dir: &Path, env: &BuildEnvironment) -> Self {
        let vars = env.to_env_map();
        let prefix = format!("--prefix={}", env.prefix.display());
        let in_tree = |program: &str| CommandSpec::new(program, project_dir).envs(vars.clone());

        Self {
            build_dir: None,
            stages: vec![
                BuildStage::new("bootstrap", in_tree("./autogen.sh").env("NOCONFIGURE", "1")),
                BuildStage::new("configure", in_tree("./configure").arg(prefix)),
                BuildStage::new("compile", in_tree("make").arg(format!("-j{}", env.jobs))),
                BuildStage::new("install", in_tree("make").arg("install")),
            ],
        }
    }

    /// Plan the meson/ninja procedure in an architecture-named build directory
    ///
    /// `reconfigure` must be set when the build directory already holds a
    /// configured meson tree, otherwise `meson setup` refuses to run.
    pub fn meson(project_dir: &Path, env: &BuildEnvironment, arch: &str, reconfigure: bool) -> Self {
        let vars = env.to_env_map();
        let build_dir_name = meson_build_dir_name(arch);
        let in_tree = |program: &str| CommandSpec::new(program, project_dir).envs(vars.clone());

        let mut setup = in_tree("meson").args([
            "setup".to_string(),
            format!("--prefix={}", env.prefix.display()),
            format!("--libdir={MESON_LIBDIR}"),
        ]);
        if reconfigure {
            setup = setup.arg("--reconfigure");
        }
        setup = setup.arg(build_dir_name.as_str());

        Self {
            build_dir: Some(project_dir.join(&build_dir_name)),
            stages: vec![
                BuildStage::new("configure", setup),
                BuildStage::new("compile", in_tree("ninja").args(["-C", build_dir_name.as_str()])),
                BuildStage::new(
                    "install",
                    in_tree("ninja").args(["-C", build_dir_name.as_str(), "install"]),
                ),
            ],
        }
    }
}

/// Runs build procedures against the prefix
pub struct BuildDispatcher<'a> {
    runner: &'a dyn CommandRunner,
    env: &'a BuildEnvironment,
    arch: String,
}

impl<'a> BuildDispatcher<'a> {
    /// Create a dispatcher for the host architecture
    pub fn new(runner: &'a dyn CommandRunner, env: &'a BuildEnvironment) -> Self {
        Self {
            runner,
            env,
            arch: host_arch().to_string(),
        }
    }

    /// Override the architecture used for build directory names
    #[must_use]
    pub fn with_arch(mut self, arch: &str) -> Self {
        self.arch = arch.to_string();
        self
    }

    /// Plan the build of the project checked out at `project_dir`
    pub fn plan(&self, build_system: BuildSystem, project_dir: &Path) -> BuildPlan {
        match build_system {
            BuildSystem::Autotools => BuildPlan::autotools(project_dir, self.env),
            BuildSystem::Meson => {
                let build_dir = project_dir.join(meson_build_dir_name(&self.arch));
                let reconfigure = build_dir.join("meson-private").is_dir();
                BuildPlan::meson(project_dir, self.env, &self.arch, reconfigure)
            }
        }
    }

    /// Build and install one project, calling `on_stage` as each stage starts
    pub fn build(
        &self,
        project: &str,
        build_system: BuildSystem,
        project_dir: &Path,
        on_stage: &mut dyn FnMut(&str),
    ) -> Result<(), BuildError> {
        let plan = self.plan(build_system, project_dir);

        if let Some(build_dir) = &plan.build_dir {
            create_build_dir(build_dir)?;
        }

        for stage in &plan.stages {
            on_stage(stage.name);
            tracing::info!(project, stage = stage.name, command = %stage.command, "build stage");
            self.runner
                .run(&stage.command)
                .map_err(|source| BuildError::StageFailed {
                    project: project.to_string(),
                    stage: stage.name.to_string(),
                    source,
                })?;
        }

        Ok(())
    }
}
