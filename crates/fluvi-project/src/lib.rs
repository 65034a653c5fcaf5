//! Project-level SDK version discovery.
//!
//! Flutter projects can pin an SDK version in up to three places:
//! `pubspec.yaml` (`environment.flutter`), an FVM config file (`.fvmrc` or
//! the legacy `.fvm/fvm_config.json`) and an asdf `.tool-versions` file.
//! All three are read independently; a missing or malformed file never
//! fails the scan, it just contributes nothing.

use std::fs;
use std::path::Path;

use log::{debug, warn};
use serde::Deserialize;

use fluvi_backend::{Channel, InstallSource, VersionSpec, parse_one};

/// The SDK versions pinned by a project, one slot per pinning mechanism.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectSdkVersions {
    pub pubspec: Option<VersionSpec>,
    pub fvm: Option<VersionSpec>,
    pub asdf: Option<VersionSpec>,
}

impl ProjectSdkVersions {
    /// The single version to act on when a project pins more than one:
    /// `pubspec.yaml` wins over FVM config, which wins over
    /// `.tool-versions`.
    #[must_use]
    pub fn preferred(&self) -> Option<&VersionSpec> {
        self.pubspec
            .as_ref()
            .or(self.fvm.as_ref())
            .or(self.asdf.as_ref())
    }
}

/// Scan `root` for every supported SDK pinning file.
#[must_use]
pub fn find_sdk_versions(root: &Path) -> ProjectSdkVersions {
    ProjectSdkVersions {
        pubspec: read_pubspec(root),
        fvm: read_fvm_config(root),
        asdf: read_tool_versions(root),
    }
}

#[derive(Debug, Deserialize)]
struct Pubspec {
    #[serde(default)]
    environment: PubspecEnvironment,
}

#[derive(Debug, Default, Deserialize)]
struct PubspecEnvironment {
    flutter: Option<String>,
}

/// `environment.flutter` in `pubspec.yaml` is usually a range constraint
/// (`>=3.0.0`), which does not name an installable version. Only exact
/// tokens are used here.
fn read_pubspec(root: &Path) -> Option<VersionSpec> {
    let content = read_if_present(&root.join("pubspec.yaml"))?;
    let pubspec: Pubspec = match serde_yaml::from_str(&content) {
        Ok(pubspec) => pubspec,
        Err(err) => {
            warn!("ignoring unreadable pubspec.yaml: {err}");
            return None;
        }
    };

    let constraint = pubspec.environment.flutter?;
    if !is_exact_version_token(&constraint) {
        debug!("pubspec.yaml pins a version range, not an exact version: {constraint}");
        return None;
    }
    parse_token(&constraint, "pubspec.yaml", InstallSource::Unknown)
}

fn is_exact_version_token(token: &str) -> bool {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) if first.is_ascii_digit() => true,
        Some('v') => chars.next().is_some_and(|c| c.is_ascii_digit()),
        _ => false,
    }
}

#[derive(Debug, Deserialize)]
struct FvmRc {
    flutter: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FvmConfig {
    flutter_sdk_version: Option<String>,
    flutter_sdk_channel: Option<String>,
}

fn read_fvm_config(root: &Path) -> Option<VersionSpec> {
    if let Some(content) = read_if_present(&root.join(".fvmrc")) {
        let rc: FvmRc = match serde_json::from_str(&content) {
            Ok(rc) => rc,
            Err(err) => {
                warn!("ignoring unreadable .fvmrc: {err}");
                return None;
            }
        };
        return parse_token(&rc.flutter?, ".fvmrc", InstallSource::Fvm);
    }

    let content = read_if_present(&root.join(".fvm").join("fvm_config.json"))?;
    let config: FvmConfig = match serde_json::from_str(&content) {
        Ok(config) => config,
        Err(err) => {
            warn!("ignoring unreadable fvm_config.json: {err}");
            return None;
        }
    };

    let mut spec = parse_token(
        &config.flutter_sdk_version?,
        "fvm_config.json",
        InstallSource::Fvm,
    )?;
    if spec.channel.is_none()
        && let Some(channel) = config.flutter_sdk_channel
    {
        spec.channel = channel.parse::<Channel>().ok();
    }
    Some(spec)
}

fn read_tool_versions(root: &Path) -> Option<VersionSpec> {
    let content = read_if_present(&root.join(".tool-versions"))?;
    for line in content.lines() {
        let mut tokens = line.split_whitespace();
        if tokens.next() != Some("flutter") {
            continue;
        }
        let token = tokens.next()?;
        return parse_token(token, ".tool-versions", InstallSource::Asdf);
    }
    None
}

fn read_if_present(path: &Path) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(content) => Some(content),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
        Err(err) => {
            warn!("could not read {}: {err}", path.display());
            None
        }
    }
}

fn parse_token(token: &str, origin: &str, source: InstallSource) -> Option<VersionSpec> {
    match parse_one(token) {
        Ok(mut spec) => {
            spec.source = source;
            debug!("{origin} pins Flutter {spec}");
            Some(spec)
        }
        Err(err) => {
            warn!("could not parse the version in {origin}: {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn project(files: &[(&str, &str)]) -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (name, content) in files {
            let path = dir.path().join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(path, content).unwrap();
        }
        dir
    }

    #[test]
    fn empty_project_pins_nothing() {
        let dir = project(&[]);
        let versions = find_sdk_versions(dir.path());
        assert_eq!(versions, ProjectSdkVersions::default());
        assert!(versions.preferred().is_none());
    }

    #[test]
    fn exact_pubspec_version_is_used() {
        let dir = project(&[(
            "pubspec.yaml",
            "name: app\nenvironment:\n  sdk: '>=3.0.0 <4.0.0'\n  flutter: 3.19.0\n",
        )]);
        let versions = find_sdk_versions(dir.path());
        assert_eq!(
            versions.pubspec,
            Some(VersionSpec::new(Some("3.19.0".to_string()), None))
        );
    }

    #[test]
    fn pubspec_range_constraints_are_skipped() {
        let dir = project(&[(
            "pubspec.yaml",
            "name: app\nenvironment:\n  flutter: '>=3.19.0'\n",
        )]);
        assert!(find_sdk_versions(dir.path()).pubspec.is_none());
    }

    #[test]
    fn fvmrc_wins_over_legacy_fvm_config() {
        let dir = project(&[
            (".fvmrc", r#"{"flutter": "3.22.1"}"#),
            (
                ".fvm/fvm_config.json",
                r#"{"flutterSdkVersion": "3.10.0", "flutterSdkChannel": "stable"}"#,
            ),
        ]);
        let fvm = find_sdk_versions(dir.path()).fvm.unwrap();
        assert_eq!(fvm.version.as_deref(), Some("3.22.1"));
        assert_eq!(fvm.source, InstallSource::Fvm);
    }

    #[test]
    fn legacy_fvm_config_merges_version_and_channel() {
        let dir = project(&[(
            ".fvm/fvm_config.json",
            r#"{"flutterSdkVersion": "3.10.0", "flutterSdkChannel": "beta"}"#,
        )]);
        let fvm = find_sdk_versions(dir.path()).fvm.unwrap();
        assert_eq!(fvm.version.as_deref(), Some("3.10.0"));
        assert_eq!(fvm.channel, Some(Channel::Beta));
        assert_eq!(fvm.source, InstallSource::Fvm);
    }

    #[test]
    fn tool_versions_line_is_found_among_other_tools() {
        let dir = project(&[(
            ".tool-versions",
            "nodejs 20.11.0\nflutter 3.19.0-stable\nruby 3.3.0\n",
        )]);
        let asdf = find_sdk_versions(dir.path()).asdf.unwrap();
        assert_eq!(asdf.version.as_deref(), Some("3.19.0"));
        assert_eq!(asdf.channel, Some(Channel::Stable));
        assert_eq!(asdf.source, InstallSource::Asdf);
    }

    #[test]
    fn preferred_follows_pubspec_fvm_asdf_order() {
        let dir = project(&[
            (
                "pubspec.yaml",
                "name: app\nenvironment:\n  flutter: 3.19.0\n",
            ),
            (".fvmrc", r#"{"flutter": "3.22.1"}"#),
            (".tool-versions", "flutter 3.16.0\n"),
        ]);
        let versions = find_sdk_versions(dir.path());
        assert_eq!(
            versions.preferred().and_then(|s| s.version.as_deref()),
            Some("3.19.0")
        );

        let without_pubspec = ProjectSdkVersions {
            pubspec: None,
            ..versions.clone()
        };
        assert_eq!(
            without_pubspec.preferred().and_then(|s| s.version.as_deref()),
            Some("3.22.1")
        );

        let asdf_only = ProjectSdkVersions {
            pubspec: None,
            fvm: None,
            ..versions
        };
        assert_eq!(
            asdf_only.preferred().and_then(|s| s.version.as_deref()),
            Some("3.16.0")
        );
    }

    #[test]
    fn malformed_files_contribute_nothing() {
        let dir = project(&[
            ("pubspec.yaml", "environment: [not, a, map]\n"),
            (".fvmrc", "{broken"),
            (".tool-versions", "flutter\n"),
        ]);
        assert_eq!(find_sdk_versions(dir.path()), ProjectSdkVersions::default());
    }
}
