//! Rendering and writing of the build artifacts.
//!
//! Renderers are pure functions of [`BuildInfo`]. [`write_if_changed`] leaves
//! an unchanged file untouched so its modification time does not re-trigger
//! downstream build steps.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::build_info::BuildInfo;
use crate::error::{Result, SweVersionError};

/// Write `content` to `path` unless the file already holds exactly that.
///
/// Returns whether a write happened. Missing parent directories are created
/// when the file did not exist yet.
pub fn write_if_changed(path: &Path, content: &str) -> Result<bool> {
    let (current, existed) = match fs::read(path) {
        Ok(bytes) => (bytes, true),
        Err(e) if e.kind() == ErrorKind::NotFound => (Vec::new(), false),
        Err(source) => {
            return Err(SweVersionError::FileRead {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    if !existed {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| SweVersionError::FileWrite {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    if existed && current == content.as_bytes() {
        return Ok(false);
    }

    fs::write(path, content).map_err(|source| SweVersionError::FileWrite {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(true)
}

/// Flat `KEY=VALUE` build-info file.
pub fn render_build_info(info: &BuildInfo) -> Result<String> {
    let patch = info
        .patch
        .as_deref()
        .ok_or_else(|| SweVersionError::MissingRequiredKey("PATCH".to_string()))?;

    let mut lines: Vec<(&str, String)> = vec![
        ("MAJOR", info.major.clone()),
        ("MINOR", info.minor.clone()),
        ("BUILD", info.build.clone()),
        ("PATCH", patch.to_string()),
        ("SWE_MAJOR", info.major.clone()),
        ("SWE_MINOR", info.minor.clone()),
        ("SWE_BUILD", info.build.clone()),
        ("SWE_PATCH", info.build_id.to_string()),
        ("LASTSWECHANGE", info.last_swe_change.clone()),
        ("LASTCHANGE", info.last_change.clone()),
        ("CHANNEL", info.channel.clone().unwrap_or_default()),
        ("SWE_BUILD_DATE", info.environment.build_date.clone()),
    ];
    for dep in &info.dependency_hashes {
        lines.push((dep.key.as_str(), dep.hash.clone()));
    }
    lines.push(("SWE_PACKAGE_NAME", info.package_name.clone()));
    lines.push((
        "SWE_BRANDING_CHANNEL_NAME",
        info.branding_channel_name.clone(),
    ));

    let mut out = String::new();
    for (key, value) in lines {
        out.push_str(&format!("{key}={value}\n"));
    }
    Ok(out)
}

/// Invitation to contact the team, shown at the top of the about text.
pub fn contact_block(email: &str) -> String {
    format!(
        "Please help us make your experience better by contacting the team\n           at <a href=\"mailto:{email}\">{email}</a>\n        "
    )
}

/// Android string resource with the about-dialog text.
pub fn render_about_xml(info: &BuildInfo) -> String {
    let env = &info.environment;
    let contact = env
        .support_contact
        .as_deref()
        .map(contact_block)
        .unwrap_or_default();

    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<resources xmlns:xliff="urn:oasis:names:tc:xliff:document:1.2">
<!-- Text to display in about dialog -->
<string name="about_text" formatted="false">
{contact}
Version: {version}\n
Built: {date}\n
Host: {host}\n
User: {user}\n
Hash: {hash}\n
</string>
</resources>
"#,
        version = info.swe_version,
        date = env.build_date,
        host = env.host_name,
        user = env.user_name,
        hash = info.swe_build_hash,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build_info::DependencyHash;
    use crate::environment::EnvironmentSnapshot;
    use std::collections::BTreeMap;

    fn info() -> BuildInfo {
        BuildInfo {
            major: "46".to_string(),
            minor: "0".to_string(),
            build: "2490".to_string(),
            patch: Some("86".to_string()),
            build_id: 1000,
            build_version_code: (46 << 23) | 1000,
            last_change: "a".repeat(40),
            last_swe_change: "b".repeat(40),
            channel: Some("beta,internal".to_string()),
            branding_channel_name: "beta".to_string(),
            package_name: "com.example.browser".to_string(),
            swe_version: "46.0.2490.1000".to_string(),
            swe_build_hash: "aaaaaaa (2490)".to_string(),
            environment: EnvironmentSnapshot {
                build_date: "Tue Mar  1 09:05:00 +00:00 2016".to_string(),
                host_name: "buildbox".to_string(),
                user_name: "builder".to_string(),
                support_contact: None,
            },
            dependency_hashes: vec![
                DependencyHash {
                    key: "SKIA_HASH".to_string(),
                    hash: "c".repeat(40),
                },
                DependencyHash {
                    key: "V8_HASH".to_string(),
                    hash: "d".repeat(40),
                },
            ],
            extra: BTreeMap::new(),
        }
    }

    #[test]
    fn build_info_lines_in_order() {
        let text = render_build_info(&info()).unwrap();
        let keys: Vec<&str> = text
            .lines()
            .map(|l| l.split_once('=').unwrap().0)
            .collect();
        assert_eq!(
            keys,
            [
                "MAJOR",
                "MINOR",
                "BUILD",
                "PATCH",
                "SWE_MAJOR",
                "SWE_MINOR",
                "SWE_BUILD",
                "SWE_PATCH",
                "LASTSWECHANGE",
                "LASTCHANGE",
                "CHANNEL",
                "SWE_BUILD_DATE",
                "SKIA_HASH",
                "V8_HASH",
                "SWE_PACKAGE_NAME",
                "SWE_BRANDING_CHANNEL_NAME",
            ]
        );
        assert!(text.contains("SWE_PATCH=1000\n"));
        assert!(text.contains("CHANNEL=beta,internal\n"));
        assert!(text.ends_with("SWE_BRANDING_CHANNEL_NAME=beta\n"));
    }

    #[test]
    fn build_info_requires_patch() {
        let mut info = info();
        info.patch = None;
        let err = render_build_info(&info).unwrap_err();
        assert!(matches!(err, SweVersionError::MissingRequiredKey(k) if k == "PATCH"));
    }

    #[test]
    fn absent_channel_renders_empty() {
        let mut info = info();
        info.channel = None;
        assert!(render_build_info(&info).unwrap().contains("\nCHANNEL=\n"));
    }

    #[test]
    fn about_xml_without_contact() {
        let xml = render_about_xml(&info());
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n"));
        assert!(xml.contains("<string name=\"about_text\" formatted=\"false\">\n\nVersion:"));
        assert!(xml.contains("Version: 46.0.2490.1000\\n\n"));
        assert!(xml.contains("Host: buildbox\\n\n"));
        assert!(xml.contains("Hash: aaaaaaa (2490)\\n\n</string>"));
        assert!(!xml.contains("mailto"));
    }

    #[test]
    fn about_xml_with_contact() {
        let mut info = info();
        info.environment.support_contact = Some("help@example.com".to_string());
        let xml = render_about_xml(&info);
        assert!(xml.contains("<a href=\"mailto:help@example.com\">help@example.com</a>"));
    }

    #[test]
    fn write_if_changed_writes_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gen/res/values/about.xml");

        assert!(write_if_changed(&path, "v1").unwrap());
        assert!(!write_if_changed(&path, "v1").unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "v1");

        assert!(write_if_changed(&path, "v2").unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "v2");
    }

    #[test]
    fn unchanged_file_keeps_mtime() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("VERSION");
        fs::write(&path, "same").unwrap();
        let before = fs::metadata(&path).unwrap().modified().unwrap();

        assert!(!write_if_changed(&path, "same").unwrap());
        let after = fs::metadata(&path).unwrap().modified().unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn unreadable_target_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be read as a file.
        let err = write_if_changed(dir.path(), "x").unwrap_err();
        assert!(matches!(err, SweVersionError::FileRead { .. }));
    }
}
