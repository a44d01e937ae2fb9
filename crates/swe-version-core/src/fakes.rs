//! In-memory fakes for the injected collaborators (testing only)
//!
//! [`ScriptedCommandRunner`] answers commands from a script and records every
//! call, so the version-control layer and the orchestrator can be exercised
//! without a checkout or a manifest tool on the machine.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, FixedOffset};

use crate::environment::Clock;
use crate::error::{Result, SweVersionError};
use crate::runner::CommandRunner;

#[derive(Debug, Clone)]
enum Reply {
    Stdout(String),
    Failure { exit_code: i32, stderr: String },
}

/// One recorded invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub command: String,
    pub cwd: Option<PathBuf>,
}

/// Command runner that replies from a fixed script.
///
/// Replies registered with a working directory take precedence over replies
/// registered for the bare command. An unscripted command fails like a
/// program exiting with status 127.
#[derive(Debug, Default)]
pub struct ScriptedCommandRunner {
    replies: HashMap<(String, Option<PathBuf>), Reply>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedCommandRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply with `stdout` to `command` run from any directory.
    pub fn on(mut self, command: &str, stdout: &str) -> Self {
        self.replies
            .insert((command.to_string(), None), Reply::Stdout(stdout.to_string()));
        self
    }

    /// Reply with `stdout` to `command` run inside `cwd`.
    pub fn on_in(mut self, command: &str, cwd: impl Into<PathBuf>, stdout: &str) -> Self {
        self.replies.insert(
            (command.to_string(), Some(cwd.into())),
            Reply::Stdout(stdout.to_string()),
        );
        self
    }

    /// Make `command` exit with `exit_code` and `stderr`.
    pub fn fail(mut self, command: &str, exit_code: i32, stderr: &str) -> Self {
        self.replies.insert(
            (command.to_string(), None),
            Reply::Failure {
                exit_code,
                stderr: stderr.to_string(),
            },
        );
        self
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of calls whose command line equals `command`.
    pub fn call_count(&self, command: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.command == command)
            .count()
    }
}

impl CommandRunner for ScriptedCommandRunner {
    fn run(&self, command: &[&str], cwd: Option<&Path>) -> Result<String> {
        let line = command.join(" ");
        let cwd = cwd.map(Path::to_path_buf);
        self.calls.lock().unwrap().push(RecordedCall {
            command: line.clone(),
            cwd: cwd.clone(),
        });

        let reply = self
            .replies
            .get(&(line.clone(), cwd))
            .or_else(|| self.replies.get(&(line.clone(), None)));

        match reply {
            Some(Reply::Stdout(out)) => Ok(out.trim().to_string()),
            Some(Reply::Failure { exit_code, stderr }) => Err(SweVersionError::CommandExecution {
                command: line,
                exit_code: *exit_code,
                stdout: String::new(),
                stderr: stderr.clone(),
            }),
            None => Err(SweVersionError::CommandExecution {
                command: line.clone(),
                exit_code: 127,
                stdout: String::new(),
                stderr: format!("no scripted reply for `{line}`"),
            }),
        }
    }
}

/// Clock pinned to one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl FixedClock {
    /// Parse an RFC 3339 timestamp; panics on malformed input.
    pub fn at(rfc3339: &str) -> Self {
        Self(DateTime::parse_from_rfc3339(rfc3339).unwrap())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cwd_specific_reply_wins() {
        let runner = ScriptedCommandRunner::new()
            .on("git log -1 HEAD --pretty=%H", "root")
            .on_in("git log -1 HEAD --pretty=%H", "/src/v8", "v8");

        let root = runner.run(&["git", "log", "-1", "HEAD", "--pretty=%H"], None);
        let v8 = runner.run(
            &["git", "log", "-1", "HEAD", "--pretty=%H"],
            Some(Path::new("/src/v8")),
        );
        assert_eq!(root.unwrap(), "root");
        assert_eq!(v8.unwrap(), "v8");
        assert_eq!(runner.call_count("git log -1 HEAD --pretty=%H"), 2);
    }

    #[test]
    fn unscripted_command_fails() {
        let runner = ScriptedCommandRunner::new();
        let err = runner.run(&["hostname"], None).unwrap_err();
        assert!(matches!(
            err,
            SweVersionError::CommandExecution { exit_code: 127, .. }
        ));
    }

    #[test]
    fn scripted_failure_carries_stderr() {
        let runner = ScriptedCommandRunner::new().fail("gclient revinfo", 1, "not a gclient checkout");
        let err = runner.run(&["gclient", "revinfo"], None).unwrap_err();
        assert!(err.to_string().contains("not a gclient checkout"));
    }
}
