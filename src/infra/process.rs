//! Subprocess execution
//!
//! Every external tool (git, autotools, meson, ninja) is started through a
//! [`CommandRunner`]. Commands always carry an explicit working directory, so
//! nothing in stackbuild ever changes the process-wide current directory.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use thiserror::Error;

/// Subprocess errors
#[derive(Error, Debug)]
pub enum ProcessError {
    /// The program could not be started at all
    #[error("Failed to run `{program}`: {error}")]
    Spawn { program: String, error: String },

    /// The program ran and exited unsuccessfully
    #[error("`{command}` {}{}", describe_code(*code), describe_stderr(stderr))]
    Failed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
}

fn describe_code(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exited with status {code}"),
        None => "was terminated by a signal".to_string(),
    }
}

fn describe_stderr(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}

impl ProcessError {
    /// Exit code to hand back to the shell
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Failed {
                code: Some(code), ..
            } if *code != 0 => *code,
            _ => 1,
        }
    }
}

/// A fully-specified external command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Program name or path
    pub program: String,
    /// Arguments
    pub args: Vec<String>,
    /// Working directory the program runs in
    pub cwd: PathBuf,
    /// Environment overrides layered over the inherited environment
    pub env: BTreeMap<String, String>,
}

impl CommandSpec {
    /// Create a command that runs `program` inside `cwd`
    pub fn new(program: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.into(),
            env: BTreeMap::new(),
        }
    }

    /// Append one argument
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set one environment variable
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Set several environment variables
    #[must_use]
    pub fn envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Working directory
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).current_dir(&self.cwd).envs(&self.env);
        cmd
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Captured output of a command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Standard output, lossily decoded
    pub stdout: String,
    /// Standard error, lossily decoded
    pub stderr: String,
}

/// Runs external commands
pub trait CommandRunner {
    /// Run a command with inherited stdio, failing on a non-zero exit
    fn run(&self, cmd: &CommandSpec) -> Result<(), ProcessError>;

    /// Run a command and capture its output, failing on a non-zero exit
    fn capture(&self, cmd: &CommandSpec) -> Result<CommandOutput, ProcessError>;
}

/// [`CommandRunner`] backed by real subprocesses
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    fn spawn_error(cmd: &CommandSpec, error: &std::io::Error) -> ProcessError {
        ProcessError::Spawn {
            program: cmd.program.clone(),
            error: error.to_string(),
        }
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, cmd: &CommandSpec) -> Result<(), ProcessError> {
        tracing::debug!(command = %cmd, cwd = %cmd.cwd.display(), "running");

        let status = cmd
            .to_command()
            .stdin(Stdio::null())
            .status()
            .map_err(|e| Self::spawn_error(cmd, &e))?;

        if status.success() {
            Ok(())
        } else {
            Err(ProcessError::Failed {
                command: cmd.to_string(),
                code: status.code(),
                stderr: String::new(),
            })
        }
    }

    fn capture(&self, cmd: &CommandSpec) -> Result<CommandOutput, ProcessError> {
        tracing::debug!(command = %cmd, cwd = %cmd.cwd.display(), "capturing");

        let Output {
            status,
            stdout,
            stderr,
        } = cmd
            .to_command()
            .stdin(Stdio::null())
            .output()
            .map_err(|e| Self::spawn_error(cmd, &e))?;

        let output = CommandOutput {
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
        };

        if status.success() {
            Ok(output)
        } else {
            Err(ProcessError::Failed {
                command: cmd.to_string(),
                code: status.code(),
                stderr: output.stderr,
            })
        }
    }
}
