//! Command execution boundary
//!
//! Client commands run through `sh -c` with stderr merged into stdout and
//! the locale pinned to `C`, so the classifier always sees English,
//! unlocalized messages in one stream.

use std::process::{Command, Stdio};

use crate::{Error, Result};

/// Captured result of one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when the process was killed by a signal
    pub exit_code: Option<i32>,
    /// Merged stdout/stderr, UTF-8 lossy decoded and trimmed
    pub output: String,
}

impl CommandOutput {
    pub fn new(exit_code: Option<i32>, output: impl Into<String>) -> Self {
        Self {
            exit_code,
            output: output.into(),
        }
    }
}

/// Executes a shell command line and captures its merged output.
pub trait CommandRunner: Send + Sync {
    /// Run `command` to completion.
    ///
    /// # Errors
    ///
    /// Only when the command cannot be started; a command that runs and
    /// fails is reported through [`CommandOutput::exit_code`].
    fn run(&self, command: &str) -> Result<CommandOutput>;
}

/// Runs commands with `/bin/sh`.
#[derive(Debug, Clone)]
pub struct ShellRunner {
    shell: String,
}

impl ShellRunner {
    pub fn new() -> Self {
        Self {
            shell: "/bin/sh".to_string(),
        }
    }

    /// Use a different POSIX shell.
    pub fn with_shell(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
        }
    }
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRunner for ShellRunner {
    fn run(&self, command: &str) -> Result<CommandOutput> {
        let output = Command::new(&self.shell)
            .arg("-c")
            .arg(format!("exec 2>&1; {command}"))
            .env("LANG", "C")
            .env("LC_ALL", "C")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| Error::CommandSpawn {
                command: command.to_string(),
                source: e.into(),
            })?;

        let merged = String::from_utf8_lossy(&output.stdout);
        Ok(CommandOutput {
            exit_code: output.status.code(),
            output: merged.trim().to_string(),
        })
    }
}

impl<R: CommandRunner + ?Sized> CommandRunner for Box<R> {
    fn run(&self, command: &str) -> Result<CommandOutput> {
        (**self).run(command)
    }
}

impl<R: CommandRunner + ?Sized> CommandRunner for std::sync::Arc<R> {
    fn run(&self, command: &str) -> Result<CommandOutput> {
        (**self).run(command)
    }
}
