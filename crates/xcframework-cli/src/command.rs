//! External tool invocation
//!
//! Every tool (`rustup`, `cargo`, `ar`, `vtool`, `lipo`) runs through a
//! [`CommandRunner`]. Invocations block until the tool exits and capture its
//! output in full; there are no timeouts.

use crate::config::ToolEnv;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

/// One external command, fully described.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    /// Replaces the inherited environment when set.
    pub env: Option<ToolEnv>,
}

impl Invocation {
    pub fn new(program: &str, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.to_string(),
            args: Vec::new(),
            cwd: cwd.into(),
            env: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn path_arg(self, path: &Path) -> Self {
        self.arg(path.to_string_lossy().into_owned())
    }

    pub fn env(mut self, env: ToolEnv) -> Self {
        self.env = Some(env);
        self
    }

    /// Value following `flag` in the argument list.
    #[must_use]
    pub fn arg_after(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Captured output of a successful command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Errors raised by external commands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The program could not be started.
    #[error("Failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The program ran and exited unsuccessfully.
    #[error("Command failed: `{command}` (exit code {code:?})\nstdout: {stdout}\nstderr: {stderr}")]
    Failed {
        command: String,
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },
}

/// Runs external commands.
pub trait CommandRunner {
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput, CommandError>;
}

/// Runs commands as real child processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput, CommandError> {
        tracing::info!("Running: {invocation}");

        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args).current_dir(&invocation.cwd);
        if let Some(env) = &invocation.env {
            cmd.env_clear().envs(env.iter());
        }

        let output = cmd.output().map_err(|source| CommandError::Spawn {
            command: invocation.to_string(),
            source,
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            return Err(CommandError::Failed {
                command: invocation.to_string(),
                code: output.status.code(),
                stdout,
                stderr,
            });
        }

        Ok(CommandOutput { stdout, stderr })
    }
}
