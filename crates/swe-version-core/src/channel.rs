//! Release channel and branding resolution.
//!
//! A channel directory may carry a `VERSION` file (authoritative build id)
//! and a `branding/BRANDING` file (product identity). Each channel is looked
//! up under the restricted `internal` tree before the public tree.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Result, SweVersionError};

pub const DEFAULT_CHANNEL: &str = "default";
pub const VERSION_FILE_NAME: &str = "VERSION";
pub const BRANDING_FILE_SUB_PATH: &str = "branding/BRANDING";
pub const PACKAGE_NAME_KEY: &str = "PACKAGE_NAME";
pub const NAME_NOT_FOUND: &str = "Unknown";

/// How a `VERSION` file is picked when several channel directories have one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// Every channel is probed under both bases; the last hit wins. A public
    /// `VERSION` therefore shadows an internal one for the same channel, and a
    /// later channel shadows an earlier one.
    #[default]
    LastMatch,
    /// The first hit in probe order wins.
    FirstMatch,
}

/// The two base directories channels are looked up in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelLayout {
    pub internal_base: PathBuf,
    pub public_base: PathBuf,
}

impl ChannelLayout {
    /// Layout rooted at `channels_dir`, with the restricted tree in
    /// `channels_dir/internal`.
    pub fn new(channels_dir: impl AsRef<Path>) -> Self {
        let root = channels_dir.as_ref();
        Self {
            internal_base: root.join("internal"),
            public_base: root.to_path_buf(),
        }
    }

    fn bases(&self) -> [&Path; 2] {
        [&self.internal_base, &self.public_base]
    }
}

/// Outcome of resolving a channel argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelSearchResult {
    pub version_file: Option<PathBuf>,
    pub branding_file: Option<PathBuf>,
    /// Channel whose branding is used.
    pub channel_name: String,
}

/// Split a comma-separated channel argument into trimmed entries.
pub fn split_channels(raw: &str) -> Vec<String> {
    raw.split(',').map(|c| c.trim().to_string()).collect()
}

/// Resolve the `VERSION` file, branding file and branding channel name for
/// `channel_arg`. A blank argument counts as no channel.
pub fn resolve(
    channel_arg: Option<&str>,
    layout: &ChannelLayout,
    policy: MatchPolicy,
) -> ChannelSearchResult {
    let (channel_name, version_file) = match channel_arg.filter(|raw| !raw.trim().is_empty()) {
        None => (DEFAULT_CHANNEL.to_string(), None),
        Some(raw) => {
            let channels = split_channels(raw);
            let hits = version_file_hits(&channels, layout);
            let first = hits.first().cloned();
            let last = hits.last().cloned();
            if first != last {
                warn!(
                    event = "channel.version_policy_disagreement",
                    first_match = ?first,
                    last_match = ?last,
                    active = ?policy,
                    "channel VERSION files disagree between first-match and last-match"
                );
            }
            let chosen = match policy {
                MatchPolicy::LastMatch => last,
                MatchPolicy::FirstMatch => first,
            };
            // split always yields at least one entry
            (channels[0].clone(), chosen)
        }
    };

    let branding_file = layout
        .bases()
        .iter()
        .map(|base| base.join(&channel_name).join(BRANDING_FILE_SUB_PATH))
        .find(|p| p.is_file());

    tracing::debug!(
        event = "channel.resolved",
        channel = %channel_name,
        version_file = ?version_file,
        branding_file = ?branding_file,
    );

    ChannelSearchResult {
        version_file,
        branding_file,
        channel_name,
    }
}

/// Every existing `<base>/<channel>/VERSION`, channels in argument order and
/// the internal base before the public one.
fn version_file_hits(channels: &[String], layout: &ChannelLayout) -> Vec<PathBuf> {
    channels
        .iter()
        .flat_map(|channel| {
            layout
                .bases()
                .map(|base| base.join(channel).join(VERSION_FILE_NAME))
        })
        .filter(|p| p.is_file())
        .collect()
}

/// Value of `PACKAGE_NAME` in a branding file, or [`NAME_NOT_FOUND`].
pub fn package_name(branding_file: Option<&Path>) -> String {
    branding_file
        .and_then(|p| fs::read_to_string(p).ok())
        .and_then(|content| lookup_value(&content, PACKAGE_NAME_KEY))
        .unwrap_or_else(|| NAME_NOT_FOUND.to_string())
}

/// First value whose trimmed key equals `name`. Lines split at their last
/// `=`.
pub fn lookup_value(content: &str, name: &str) -> Option<String> {
    content.lines().find_map(|line| {
        let (key, value) = line.rsplit_once('=')?;
        (key.trim() == name).then(|| value.trim().to_string())
    })
}

/// Build id stored in a channel `VERSION` file.
pub fn read_build_id(path: &Path) -> Result<i64> {
    let content = fs::read_to_string(path).map_err(|source| SweVersionError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    content
        .trim()
        .parse::<i64>()
        .map_err(|_| SweVersionError::InvalidBuildId {
            path: path.to_path_buf(),
            content: content.trim().to_string(),
        })
}
