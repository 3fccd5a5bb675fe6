//! Test utilities
//!
//! A [`CommandRunner`] that records commands instead of running them.

use std::cell::RefCell;

use crate::infra::process::{CommandOutput, CommandRunner, CommandSpec, ProcessError};

/// Records every command and answers with canned results
#[derive(Debug, Default)]
pub struct RecordingRunner {
    calls: RefCell<Vec<CommandSpec>>,
    pull_output: String,
    failure: Option<(String, i32)>,
}

impl RecordingRunner {
    /// Runner where every command succeeds with empty output
    pub fn new() -> Self {
        Self::default()
    }

    /// Stdout returned for `git pull`
    #[must_use]
    pub fn with_pull_output(mut self, stdout: &str) -> Self {
        self.pull_output = stdout.to_string();
        self
    }

    /// Fail commands whose command line starts with `prefix`
    #[must_use]
    pub fn failing_on(mut self, prefix: &str, code: i32) -> Self {
        self.failure = Some((prefix.to_string(), code));
        self
    }

    /// Commands seen so far
    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.borrow().clone()
    }

    fn record(&self, cmd: &CommandSpec) -> Result<CommandOutput, ProcessError> {
        self.calls.borrow_mut().push(cmd.clone());

        let line = cmd.to_string();
        if let Some((prefix, code)) = &self.failure {
            if line.starts_with(prefix.as_str()) {
                return Err(ProcessError::Failed {
                    command: line,
                    code: Some(*code),
                    stderr: "simulated failure".to_string(),
                });
            }
        }

        let stdout = if line == "git pull" {
            self.pull_output.clone()
        } else {
            String::new()
        };
        Ok(CommandOutput {
            stdout,
            stderr: String::new(),
        })
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, cmd: &CommandSpec) -> Result<(), ProcessError> {
        self.record(cmd).map(|_| ())
    }

    fn capture(&self, cmd: &CommandSpec) -> Result<CommandOutput, ProcessError> {
        self.record(cmd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_runner_records_and_fails() {
        let runner = RecordingRunner::new()
            .with_pull_output("Already up to date.\n")
            .failing_on("make install", 2);

        let pull = runner.capture(&CommandSpec::new("git", "/src").arg("pull")).unwrap();
        assert_eq!(pull.stdout, "Already up to date.\n");

        let err = runner
            .run(&CommandSpec::new("make", "/src").arg("install"))
            .unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert_eq!(runner.calls().len(), 2);
    }
}
