//! Output formatting and progress indicators
//!
//! This module turns pipeline events into console narration: a spinner while
//! git runs with captured output, a header before each build, one line per
//! build stage, and a summary at the end.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::core::pipeline::{PipelineEvent, ProjectOutcome, RunReport};
use crate::error::StackError;

/// Status message prefixes
pub mod status {
    /// Success prefix (green checkmark)
    pub const SUCCESS: &str = "✓";

    /// Error prefix (red X)
    pub const ERROR: &str = "✗";

    /// Warning prefix (yellow triangle)
    pub const WARNING: &str = "⚠";

    /// Info prefix (blue circle)
    pub const INFO: &str = "ℹ";

    /// Stage prefix
    pub const STAGE: &str = "→";
}

/// Create a spinner for operations with unknown duration
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
        .template("{spinner:.blue} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Console narrator for pipeline events
pub struct Narrator {
    quiet: bool,
    spinner: Option<ProgressBar>,
}

impl Narrator {
    /// Create a narrator; a quiet one prints nothing
    pub fn new(quiet: bool) -> Self {
        Self {
            quiet,
            spinner: None,
        }
    }

    /// React to one pipeline event
    pub fn handle(&mut self, event: &PipelineEvent<'_>) {
        if self.quiet {
            return;
        }

        match event {
            PipelineEvent::SiteConfigWritten { path } => {
                println!("{} Wrote {}", status::INFO, path.display());
            }
            PipelineEvent::SyncStarted { project } => {
                self.spinner = Some(create_spinner(&format!("Syncing {project}...")));
            }
            PipelineEvent::Synced { project, changed } => {
                self.finish_spinner();
                let state = if *changed { "updated" } else { "up to date" };
                println!("{} {project}: {state}", status::SUCCESS);
            }
            PipelineEvent::BuildStarted {
                project,
                build_system,
            } => {
                println!();
                println!("{} Building {project} ({build_system})", status::INFO);
            }
            PipelineEvent::StageStarted { project, stage } => {
                println!("{} {project}: {stage}", status::STAGE);
            }
            PipelineEvent::Built { project } => {
                println!("{} {project}: installed", status::SUCCESS);
            }
            PipelineEvent::Skipped { project } => {
                println!("  {project}: nothing to build");
            }
        }
    }

    /// Print the final summary
    pub fn summary(&self, report: &RunReport) {
        if self.quiet {
            return;
        }

        println!();
        if report.built_count() == 0 {
            println!("{} Everything up to date", status::SUCCESS);
            return;
        }

        println!("{} Built {} project(s):", status::SUCCESS, report.built_count());
        for (name, outcome) in &report.outcomes {
            if *outcome == ProjectOutcome::Built {
                println!("  {name}");
            }
        }
    }

    fn finish_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }
}

impl Drop for Narrator {
    fn drop(&mut self) {
        self.finish_spinner();
    }
}

/// Print an error and its causes to stderr
pub fn display_error(error: &anyhow::Error) {
    eprintln!("{} {error}", status::ERROR);
    for cause in error.chain().skip(1) {
        eprintln!("  caused by: {cause}");
    }
}

/// Exit code for an error that reached `main`
pub fn exit_code(error: &anyhow::Error) -> i32 {
    error
        .downcast_ref::<StackError>()
        .map_or(1, StackError::exit_code)
}
