//! The resolved build record and the seed file that feeds it.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::environment::EnvironmentSnapshot;
use crate::error::{Result, SweVersionError};

/// Commit hash of a named dependency, e.g. `V8_HASH`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyHash {
    pub key: String,
    pub hash: String,
}

/// Product version numbers supplied by the seed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeedVersion {
    pub major: String,
    pub minor: String,
    pub build: String,
    /// Only the build-info template needs it.
    pub patch: Option<String>,
    /// Seed keys with no dedicated field.
    pub extra: BTreeMap<String, String>,
}

impl SeedVersion {
    /// Pull the version keys out of parsed seed values. `MAJOR`, `MINOR` and
    /// `BUILD` are required.
    pub fn from_values(mut values: BTreeMap<String, String>) -> Result<Self> {
        let mut take = |key: &str| {
            values
                .remove(key)
                .ok_or_else(|| SweVersionError::MissingRequiredKey(key.to_string()))
        };
        let major = take("MAJOR")?;
        let minor = take("MINOR")?;
        let build = take("BUILD")?;
        let patch = take("PATCH").ok();
        Ok(Self {
            major,
            minor,
            build,
            patch,
            extra: values,
        })
    }
}

/// Parse `KEY=VALUE` lines. Lines split at the first `=`, values are kept
/// verbatim, blank lines are skipped and later keys win.
pub fn parse_seed(content: &str, path: &Path) -> Result<BTreeMap<String, String>> {
    let mut values = BTreeMap::new();
    for (idx, raw) in content.lines().enumerate() {
        let line = raw.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        let (key, value) = line
            .split_once('=')
            .ok_or_else(|| SweVersionError::MalformedSeedLine {
                path: path.to_path_buf(),
                line: idx + 1,
                content: line.to_string(),
            })?;
        values.insert(key.to_string(), value.to_string());
    }
    Ok(values)
}

pub fn read_seed_file(path: &Path) -> Result<BTreeMap<String, String>> {
    let content = fs::read_to_string(path).map_err(|source| SweVersionError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_seed(&content, path)
}

/// Everything known about one build once resolution has finished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildInfo {
    pub major: String,
    pub minor: String,
    pub build: String,
    pub patch: Option<String>,
    pub build_id: i64,
    pub build_version_code: i64,
    /// Full hash of the tip commit.
    pub last_change: String,
    /// Merge-base with the tracked upstream branch.
    pub last_swe_change: String,
    /// Raw channel argument.
    pub channel: Option<String>,
    pub branding_channel_name: String,
    pub package_name: String,
    pub swe_version: String,
    pub swe_build_hash: String,
    pub environment: EnvironmentSnapshot,
    pub dependency_hashes: Vec<DependencyHash>,
    pub extra: BTreeMap<String, String>,
}

/// `MAJOR.MINOR.BUILD.BUILDID`.
pub fn swe_version(seed: &SeedVersion, build_id: i64) -> String {
    format!("{}.{}.{}.{}", seed.major, seed.minor, seed.build, build_id)
}

/// `<short hash> (<BUILD>)`.
pub fn swe_build_hash(short_hash: &str, build: &str) -> String {
    format!("{short_hash} ({build})")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed(content: &str) -> Result<BTreeMap<String, String>> {
        parse_seed(content, Path::new("VERSION.in"))
    }

    #[test]
    fn parses_key_values_and_keeps_last() {
        let values = seed("MAJOR=46\nMINOR=0\r\nMAJOR=47\n\nNOTE=a=b\n").unwrap();
        assert_eq!(values["MAJOR"], "47");
        assert_eq!(values["MINOR"], "0");
        assert_eq!(values["NOTE"], "a=b");
    }

    #[test]
    fn line_without_separator_is_malformed() {
        let err = seed("MAJOR=46\nbogus\n").unwrap_err();
        match err {
            SweVersionError::MalformedSeedLine { line, content, .. } => {
                assert_eq!(line, 2);
                assert_eq!(content, "bogus");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn seed_version_requires_major_minor_build() {
        let version = SeedVersion::from_values(seed("MAJOR=46\nMINOR=0\nBUILD=2490\nX=1").unwrap())
            .unwrap();
        assert_eq!(version.major, "46");
        assert_eq!(version.patch, None);
        assert_eq!(version.extra.get("X").map(String::as_str), Some("1"));

        let err = SeedVersion::from_values(seed("MAJOR=46\nMINOR=0").unwrap()).unwrap_err();
        assert!(matches!(err, SweVersionError::MissingRequiredKey(k) if k == "BUILD"));
    }

    #[test]
    fn derived_strings() {
        let version =
            SeedVersion::from_values(seed("MAJOR=46\nMINOR=0\nBUILD=2490\nPATCH=86").unwrap())
                .unwrap();
        assert_eq!(swe_version(&version, 385_877_992), "46.0.2490.385877992");
        assert_eq!(swe_build_hash("0123456", &version.build), "0123456 (2490)");
    }

    #[test]
    fn missing_seed_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_seed_file(&dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, SweVersionError::FileRead { .. }));
    }
}
