//! Command-line interface module
//!
//! This module handles argument parsing and output formatting.
//! It contains no business logic - that belongs in the [`crate::core`] module.

pub mod output;

use std::path::PathBuf;
use std::sync::OnceLock;

use anyhow::Result;
use clap::Parser;

use crate::config::defaults::CLEAN_MARKER;
use crate::core::global_config::GlobalConfig;
use crate::core::pipeline::{Pipeline, RunReport, StackSettings};
use crate::core::project;
use crate::error::StackError;
use crate::infra::dirs::StackDirs;
use crate::infra::process::SystemRunner;
use crate::infra::toolchain;

use output::{status, Narrator};

fn long_version() -> &'static str {
    static VERSION: OnceLock<String> = OnceLock::new();
    VERSION.get_or_init(|| {
        format!(
            "{} (git {}, built {})",
            env!("CARGO_PKG_VERSION"),
            option_env!("VERGEN_GIT_SHA").unwrap_or("unknown"),
            option_env!("VERGEN_BUILD_TIMESTAMP").unwrap_or("unknown"),
        )
    })
}

/// Stackbuild - check out and build the GIMP dependency stack
///
/// Syncs mypaint-brushes, libmypaint, babl, gegl and gimp under
/// `<source root>/<VERSION>` and installs each into `<prefix root>/<VERSION>`,
/// rebuilding only what changed upstream.
#[derive(Parser, Debug)]
#[command(name = "stackbuild")]
#[command(author, version, long_version = long_version(), about, long_about = None)]
pub struct Cli {
    /// Version label (default: master)
    #[arg(value_name = "VERSION")]
    pub version_label: Option<String>,

    /// `clean` purges untracked files, rebuilds everything and rewrites the
    /// site configuration
    #[arg(value_name = "clean")]
    pub clean_marker: Option<String>,

    /// Enable verbose output (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors and build tool output
    #[arg(short, long)]
    pub quiet: bool,

    /// Rebuild projects even when nothing changed upstream
    #[arg(short, long)]
    pub force: bool,

    /// Number of parallel compile jobs for make
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Only process these projects (repeatable), keeping dependency order
    #[arg(long, value_name = "PROJECT")]
    pub only: Vec<String>,

    /// Parent directory of installation prefixes
    #[arg(long, env = "STACKBUILD_PREFIX_ROOT", value_name = "DIR")]
    pub prefix_root: Option<PathBuf>,

    /// Parent directory of source checkouts
    #[arg(long, env = "STACKBUILD_SOURCE_ROOT", value_name = "DIR")]
    pub source_root: Option<PathBuf>,

    /// Configuration file
    #[arg(long, env = "STACKBUILD_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Version label and clean flag taken from the positional arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Version label
    pub label: String,
    /// Clean mode
    pub clean: bool,
}

impl Invocation {
    /// Interpret `[VERSION] [clean]`
    ///
    /// A lone `clean` selects the default label in clean mode.
    pub fn from_positionals(args: &[String], default_label: &str) -> Result<Self, StackError> {
        let clean = args.last().is_some_and(|a| a == CLEAN_MARKER);
        let label = match args {
            [] => default_label,
            [_, other] if other != CLEAN_MARKER => {
                return Err(StackError::Usage(format!(
                    "Unexpected argument '{other}': the second argument can only be '{CLEAN_MARKER}'"
                )))
            }
            [label] | [label, _] => {
                if label == CLEAN_MARKER {
                    default_label
                } else {
                    label.as_str()
                }
            }
            _ => {
                return Err(StackError::Usage(
                    "Expected at most two arguments: [VERSION] [clean]".to_string(),
                ))
            }
        };

        Ok(Self {
            label: label.to_string(),
            clean,
        })
    }
}

impl Cli {
    /// Positional arguments in command-line order
    pub fn positionals(&self) -> Vec<String> {
        self.version_label
            .iter()
            .chain(self.clean_marker.iter())
            .cloned()
            .collect()
    }

    /// Execute the build
    pub fn run(self) -> Result<RunReport> {
        let dirs = StackDirs::new();
        let config = match &self.config {
            Some(path) => GlobalConfig::load_from_path(path),
            None => GlobalConfig::load(&dirs),
        }
        .map_err(StackError::from)?;

        let invocation = Invocation::from_positionals(&self.positionals(), config.default_version())?;
        let projects = project::select(project::stack(), &self.only)?;

        let settings = StackSettings {
            label: invocation.label,
            prefix_root: config.prefix_root(self.prefix_root, &dirs),
            source_root: config.source_root(self.source_root, &dirs),
            clean: invocation.clean,
            force: self.force,
            jobs: config.jobs(self.jobs),
        };

        preflight(self.quiet)?;

        let runner = SystemRunner;
        let pipeline = Pipeline::new(settings, &runner);
        let mut narrator = Narrator::new(self.quiet);
        let report = pipeline.run(&projects, &mut |event| narrator.handle(&event))?;
        narrator.summary(&report);

        Ok(report)
    }
}

/// Check for external tools before touching any repository
fn preflight(quiet: bool) -> Result<()> {
    let required = toolchain::missing(&toolchain::probe(toolchain::REQUIRED_TOOLS));
    if !required.is_empty() {
        anyhow::bail!("Required tools not found on PATH: {}", required.join(", "));
    }

    let optional = toolchain::missing(&toolchain::probe(toolchain::BUILD_TOOLS));
    if !optional.is_empty() {
        tracing::warn!(missing = ?optional, "build tools not found on PATH");
        if !quiet {
            println!(
                "{} Not found on PATH: {} (needed once a project has to be rebuilt)",
                status::WARNING,
                optional.join(", ")
            );
        }
    }

    Ok(())
}
