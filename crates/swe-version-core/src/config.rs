//! Resolver configuration.
//!
//! Defaults match the browser checkout layout. A JSON file can override any
//! field; the CLI applies its flags on top.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::changelog::ChangelogConfig;
use crate::channel::{ChannelLayout, MatchPolicy};
use crate::error::{Result, SweVersionError};

/// A dependency whose tip hash is stamped into the build info.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyProject {
    /// Build-info key, e.g. `V8_HASH`.
    pub key: String,
    /// Checkout path relative to the parent of the repository toplevel.
    pub path: String,
}

impl DependencyProject {
    pub fn new(key: &str, path: &str) -> Self {
        Self {
            key: key.to_string(),
            path: path.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Directory holding the public channel tree and its `internal` subtree.
    pub channels_dir: PathBuf,
    pub match_policy: MatchPolicy,
    pub changelog: ChangelogConfig,
    pub dependencies: Vec<DependencyProject>,
    /// Command that lists pinned sub-repositories.
    pub manifest_command: Vec<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            channels_dir: PathBuf::from("swe/channels"),
            match_policy: MatchPolicy::LastMatch,
            changelog: ChangelogConfig::default(),
            dependencies: vec![
                DependencyProject::new("SKIA_HASH", "src/third_party/skia"),
                DependencyProject::new("V8_HASH", "src/v8"),
            ],
            manifest_command: vec!["gclient".to_string(), "revinfo".to_string()],
        }
    }
}

impl ResolverConfig {
    pub fn from_json(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| SweVersionError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.manifest_command.is_empty() {
            return Err(SweVersionError::Config(
                "manifest_command must not be empty".to_string(),
            ));
        }
        if self.changelog.commit_count == 0 {
            return Err(SweVersionError::Config(
                "changelog.commit_count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Channel layout; a relative `channels_dir` is taken from `repo_dir`.
    pub fn channel_layout(&self, repo_dir: &Path) -> ChannelLayout {
        ChannelLayout::new(repo_dir.join(&self.channels_dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_known_dependencies() {
        let config = ResolverConfig::default();
        let keys: Vec<&str> = config.dependencies.iter().map(|d| d.key.as_str()).collect();
        assert_eq!(keys, ["SKIA_HASH", "V8_HASH"]);
        assert_eq!(config.changelog.commit_count, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = ResolverConfig::from_json(
            r#"{ "match_policy": "first_match", "changelog": { "eligible_channels": ["nightly"] } }"#,
        )
        .unwrap();
        assert_eq!(config.match_policy, MatchPolicy::FirstMatch);
        assert_eq!(config.changelog.eligible_channels, ["nightly"]);
        assert_eq!(config.changelog.commit_count, 10);
        assert_eq!(config.channels_dir, PathBuf::from("swe/channels"));
    }

    #[test]
    fn rejects_empty_manifest_command() {
        let err = ResolverConfig::from_json(r#"{ "manifest_command": [] }"#).unwrap_err();
        assert!(matches!(err, SweVersionError::Config(_)));
    }

    #[test]
    fn malformed_json_is_serialization_error() {
        let err = ResolverConfig::from_json("{ nope").unwrap_err();
        assert!(matches!(err, SweVersionError::Serialization(_)));
    }

    #[test]
    fn layout_puts_internal_under_channels_dir() {
        let config = ResolverConfig {
            channels_dir: PathBuf::from("/c"),
            ..ResolverConfig::default()
        };
        let layout = config.channel_layout(Path::new("/w/src"));
        assert_eq!(layout.internal_base, PathBuf::from("/c/internal"));
        assert_eq!(layout.public_base, PathBuf::from("/c"));
    }

    #[test]
    fn relative_channels_dir_follows_repo_dir() {
        let layout = ResolverConfig::default().channel_layout(Path::new("/w/src"));
        assert_eq!(layout.public_base, PathBuf::from("/w/src/swe/channels"));
        assert_eq!(
            layout.internal_base,
            PathBuf::from("/w/src/swe/channels/internal")
        );
    }
}
