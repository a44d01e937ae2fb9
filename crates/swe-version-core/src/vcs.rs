//! Version-control queries for the umbrella checkout.
//!
//! Everything here is a thin parse over [`CommandRunner`] output: `git` for
//! the checkout itself and the manifest tool (`gclient revinfo` by default)
//! for the list of pinned sub-repositories. Command failures propagate
//! unchanged.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::error::{Result, SweVersionError};
use crate::runner::CommandRunner;

/// Branch used for the merge-base when the manifest pins no branch.
pub const DEFAULT_REMOTE_BRANCH: &str = "remotes/origin/master";

/// Manifest label of the umbrella repository.
pub const ROOT_LABEL: &str = "src";

pub const SHORT_HASH_LEN: usize = 7;

/// A full 40-character commit hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitHash(String);

impl CommitHash {
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        (raw.len() == 40 && raw.chars().all(|c| c.is_ascii_hexdigit()))
            .then(|| Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The 7-character abbreviation.
    pub fn short(&self) -> &str {
        &self.0[..SHORT_HASH_LEN]
    }
}

impl fmt::Display for CommitHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One sub-repository tracked by the umbrella project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestEntry {
    /// Logical root, e.g. `src/v8`.
    pub label: String,
    /// Checkout location, `<toplevel>/../<label>`.
    pub path: PathBuf,
    pub url: String,
    /// Pinned revision: a commit hash or a `refs/...` name.
    pub pinned_ref: Option<String>,
}

impl ManifestEntry {
    /// Parse one `<label>: <url>@<ref>` line.
    pub fn parse(line: &str, toplevel: &Path) -> Option<Self> {
        static LINE: OnceLock<Regex> = OnceLock::new();
        let re = LINE.get_or_init(|| {
            Regex::new(r"^(?P<label>[^:\s]+):\s*(?P<url>[^@]*)(?:@(?P<rev>.*))?$")
                .expect("manifest line pattern is valid")
        });
        let caps = re.captures(line.trim())?;
        let label = caps["label"].to_string();
        Some(Self {
            path: toplevel.join("..").join(&label),
            url: caps["url"].trim().to_string(),
            pinned_ref: caps
                .name("rev")
                .map(|m| m.as_str().trim().to_string())
                .filter(|r| !r.is_empty()),
            label,
        })
    }

    /// Branch name when this is the root entry pinned to `refs/<branch>`.
    pub fn tracked_branch(&self) -> Option<&str> {
        if self.label != ROOT_LABEL || self.url.is_empty() {
            return None;
        }
        self.pinned_ref
            .as_deref()?
            .strip_prefix("refs/")
            .filter(|b| !b.is_empty())
    }
}

/// Best-guess upstream branch for `manifest`.
pub fn tracking_branch(manifest: &[ManifestEntry]) -> &str {
    manifest
        .iter()
        .find_map(ManifestEntry::tracked_branch)
        .unwrap_or(DEFAULT_REMOTE_BRANCH)
}

/// Query layer over one checkout.
pub struct GitRepository<R> {
    runner: R,
    repo_dir: PathBuf,
    manifest_command: Vec<String>,
}

impl<R: CommandRunner> GitRepository<R> {
    pub fn new(runner: R, repo_dir: impl Into<PathBuf>, manifest_command: Vec<String>) -> Self {
        Self {
            runner,
            repo_dir: repo_dir.into(),
            manifest_command,
        }
    }

    fn git(&self, args: &[&str], cwd: &Path) -> Result<String> {
        let mut command = Vec::with_capacity(args.len() + 1);
        command.push("git");
        command.extend_from_slice(args);
        self.runner.run(&command, Some(cwd))
    }

    /// Full hash of `HEAD`.
    pub fn current_commit_hash(&self) -> Result<CommitHash> {
        let out = self.git(&["log", "-1", "HEAD", "--pretty=%H"], &self.repo_dir)?;
        CommitHash::parse(&out).ok_or_else(|| SweVersionError::UnexpectedOutput {
            command: "git log -1 HEAD --pretty=%H".to_string(),
            output: out,
        })
    }

    /// Committer timestamp of the tip commit, seconds since the Unix epoch.
    pub fn commit_timestamp_utc(&self) -> Result<i64> {
        let out = self.git(&["log", "-1", "--pretty=%ct"], &self.repo_dir)?;
        out.parse::<i64>()
            .map_err(|_| SweVersionError::UnexpectedOutput {
                command: "git log -1 --pretty=%ct".to_string(),
                output: out,
            })
    }

    pub fn toplevel(&self) -> Result<PathBuf> {
        self.git(&["rev-parse", "--show-toplevel"], &self.repo_dir)
            .map(PathBuf::from)
    }

    /// Every sub-repository listed by the manifest tool, in listing order.
    pub fn manifest(&self) -> Result<Vec<ManifestEntry>> {
        let toplevel = self.toplevel()?;
        let command: Vec<&str> = self.manifest_command.iter().map(String::as_str).collect();
        let out = self.runner.run(&command, Some(&self.repo_dir))?;

        out.lines()
            .filter(|l| !l.trim().is_empty())
            .map(|line| {
                ManifestEntry::parse(line, &toplevel).ok_or_else(|| {
                    SweVersionError::UnexpectedOutput {
                        command: command.join(" "),
                        output: line.to_string(),
                    }
                })
            })
            .collect()
    }

    /// Merge-base between `HEAD` and the branch the manifest pins.
    pub fn merge_base(&self) -> Result<String> {
        let manifest = self.manifest()?;
        let branch = tracking_branch(&manifest);
        tracing::debug!(event = "vcs.tracking_branch", branch = %branch);
        self.git(&["merge-base", "HEAD", branch], &self.repo_dir)
    }

    /// Tip hash of the sub-repository at `<toplevel>/../<relative>`.
    pub fn lookup_commit_hash(&self, relative: &str) -> Result<String> {
        let dir = self.toplevel()?.join("..").join(relative);
        self.git(&["log", "-1", "HEAD", "--pretty=%H"], &dir)
    }

    /// One-line summaries (`<short hash> <subject>`) of the last `count`
    /// commits in `path`.
    pub fn recent_commits(&self, path: &Path, count: usize) -> Result<Vec<String>> {
        let n = count.to_string();
        let out = self.git(&["log", "-n", n.as_str(), "--pretty=%h %s"], path)?;
        Ok(out.lines().map(str::to_string).collect())
    }
}
