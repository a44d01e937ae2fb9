//! Error taxonomy for build metadata resolution.

use std::path::PathBuf;

/// Errors produced while resolving build metadata.
///
/// Every variant is fatal to the resolution pass; nothing in this crate
/// retries or recovers locally.
#[derive(Debug, thiserror::Error)]
pub enum SweVersionError {
    #[error("`{command}` failed with exit code {exit_code}\n  stdout: {stdout:?}\n  stderr: {stderr:?}")]
    CommandExecution {
        command: String,
        exit_code: i32,
        stdout: String,
        stderr: String,
    },

    #[error("failed to spawn `{command}`: {source}")]
    CommandSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unexpected output from `{command}`: {output:?}")]
    UnexpectedOutput { command: String, output: String },

    #[error("invalid major version: {0}")]
    InvalidMajorVersion(String),

    #[error("version code exceeds the max ({max}) value: {code}")]
    VersionCodeOverflow { code: u64, max: u32 },

    #[error("minutes since epoch out of the 23-bit range: {minutes}")]
    EpochMinutesOutOfRange { minutes: i64 },

    #[error("invalid build id in {path:?}: {content:?}")]
    InvalidBuildId { path: PathBuf, content: String },

    #[error("missing required key: {0}")]
    MissingRequiredKey(String),

    #[error("malformed line {line} in seed file {path:?}: {content:?}")]
    MalformedSeedLine {
        path: PathBuf,
        line: usize,
        content: String,
    },

    #[error("failed to read {path:?}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path:?}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for build metadata operations.
pub type Result<T> = std::result::Result<T, SweVersionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_execution_error_surfaces_stderr() {
        let err = SweVersionError::CommandExecution {
            command: "git merge-base HEAD remotes/origin/master".to_string(),
            exit_code: 128,
            stdout: String::new(),
            stderr: "fatal: Not a valid object name".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("git merge-base"));
        assert!(msg.contains("128"));
        assert!(msg.contains("Not a valid object name"));
    }

    #[test]
    fn overflow_error_displays_code_and_max() {
        let err = SweVersionError::VersionCodeOverflow {
            code: 2_147_483_648,
            max: i32::MAX as u32,
        };
        let msg = err.to_string();
        assert!(msg.contains("2147483648"));
        assert!(msg.contains("2147483647"));
    }

    #[test]
    fn missing_key_names_the_key() {
        let err = SweVersionError::MissingRequiredKey("PATCH".to_string());
        assert_eq!(err.to_string(), "missing required key: PATCH");
    }
}
