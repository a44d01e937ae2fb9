//! External command execution.
//!
//! All version-control and environment queries go through [`CommandRunner`]
//! so the resolution pass can be driven by a scripted fake in tests.

use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::error::{Result, SweVersionError};

/// Runs one external command and returns its trimmed stdout.
pub trait CommandRunner {
    /// Execute `command` (program followed by arguments), optionally inside
    /// `cwd`. A non-zero exit status is a [`SweVersionError::CommandExecution`].
    fn run(&self, command: &[&str], cwd: Option<&Path>) -> Result<String>;
}

/// Runs commands as real child processes, without a shell.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemCommandRunner;

impl SystemCommandRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemCommandRunner {
    fn run(&self, command: &[&str], cwd: Option<&Path>) -> Result<String> {
        let command_line = command.join(" ");
        let (program, args) = command
            .split_first()
            .ok_or_else(|| SweVersionError::UnexpectedOutput {
                command: command_line.clone(),
                output: "empty command".to_string(),
            })?;

        debug!(event = "command.run", command = %command_line, cwd = ?cwd);

        let mut cmd = Command::new(program);
        cmd.args(args);
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }

        let output = cmd.output().map_err(|source| SweVersionError::CommandSpawn {
            command: command_line.clone(),
            source,
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        if !output.status.success() {
            return Err(SweVersionError::CommandExecution {
                command: command_line,
                exit_code: output.status.code().unwrap_or(-1),
                stdout,
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }

        Ok(stdout.trim().to_string())
    }
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(&self, command: &[&str], cwd: Option<&Path>) -> Result<String> {
        (**self).run(command, cwd)
    }
}
