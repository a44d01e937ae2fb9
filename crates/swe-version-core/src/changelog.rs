//! Changelog across every sub-repository of the checkout.

use serde::{Deserialize, Serialize};

use crate::channel::split_channels;
use crate::error::Result;
use crate::runner::CommandRunner;
use crate::vcs::{GitRepository, ManifestEntry};

const COMMIT_INDENT: &str = "     ";

/// Which builds get a changelog and how deep it goes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangelogConfig {
    /// Commits listed per repository.
    pub commit_count: usize,
    /// Channels whose builds ship a changelog.
    pub eligible_channels: Vec<String>,
}

impl Default for ChangelogConfig {
    fn default() -> Self {
        Self {
            commit_count: 10,
            eligible_channels: vec!["internal".to_string(), "beta".to_string()],
        }
    }
}

impl ChangelogConfig {
    /// True when any entry of `channel_arg` is eligible.
    pub fn is_eligible(&self, channel_arg: &str) -> bool {
        split_channels(channel_arg)
            .iter()
            .any(|c| self.eligible_channels.iter().any(|e| e == c))
    }
}

/// One header per repository followed by its last `commit_count` commits.
/// A failing repository aborts the whole report.
pub fn render_changelog<R: CommandRunner>(
    repo: &GitRepository<R>,
    manifest: &[ManifestEntry],
    commit_count: usize,
) -> Result<String> {
    let mut out = String::new();
    for entry in manifest {
        let commits = repo.recent_commits(&entry.path, commit_count)?;
        out.push_str(&format!("{}:\n", entry.label));
        for line in commits {
            out.push_str(&format!("{COMMIT_INDENT}{line}\n"));
        }
        out.push('\n');
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SweVersionError;
    use crate::fakes::ScriptedCommandRunner;
    use std::path::{Path, PathBuf};

    fn entry(label: &str, path: &str) -> ManifestEntry {
        ManifestEntry {
            label: label.to_string(),
            path: PathBuf::from(path),
            url: String::new(),
            pinned_ref: None,
        }
    }

    fn repo(runner: &ScriptedCommandRunner) -> GitRepository<&ScriptedCommandRunner> {
        GitRepository::new(runner, "/a", vec!["gclient".into(), "revinfo".into()])
    }

    #[test]
    fn groups_commits_per_repository() {
        let runner = ScriptedCommandRunner::new().on_in(
            "git log -n 2 --pretty=%h %s",
            "/a",
            "h1 msgA\nh2 msgB",
        );
        let text = render_changelog(&repo(&runner), &[entry("src", "/a")], 2).unwrap();
        assert_eq!(text, "src:\n     h1 msgA\n     h2 msgB\n\n");
    }

    #[test]
    fn keeps_manifest_order() {
        let runner = ScriptedCommandRunner::new()
            .on_in("git log -n 1 --pretty=%h %s", "/a", "h1 root")
            .on_in("git log -n 1 --pretty=%h %s", "/v8", "h9 engine");
        let manifest = [entry("src", "/a"), entry("src/v8", "/v8")];
        let text = render_changelog(&repo(&runner), &manifest, 1).unwrap();
        assert_eq!(text, "src:\n     h1 root\n\nsrc/v8:\n     h9 engine\n\n");
        let cwds: Vec<_> = runner.calls().into_iter().filter_map(|c| c.cwd).collect();
        assert_eq!(cwds, [Path::new("/a"), Path::new("/v8")]);
    }

    #[test]
    fn one_failing_repository_aborts() {
        let runner = ScriptedCommandRunner::new()
            .on_in("git log -n 1 --pretty=%h %s", "/a", "h1 root");
        let manifest = [entry("src", "/a"), entry("src/gone", "/gone")];
        let err = render_changelog(&repo(&runner), &manifest, 1).unwrap_err();
        assert!(matches!(err, SweVersionError::CommandExecution { .. }));
    }

    #[test]
    fn eligibility_checks_every_channel_entry() {
        let config = ChangelogConfig::default();
        assert!(config.is_eligible("stable, beta"));
        assert!(!config.is_eligible("stable"));
        assert!(!config.is_eligible(""));
    }
}
