use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// A named Flutter release track, orthogonal to a concrete version number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Stable,
    Beta,
    Dev,
    Main,
    Master,
}

impl Channel {
    pub const ALL: [Channel; 5] = [
        Channel::Stable,
        Channel::Beta,
        Channel::Dev,
        Channel::Main,
        Channel::Master,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Channel::Stable => "stable",
            Channel::Beta => "beta",
            Channel::Dev => "dev",
            Channel::Main => "main",
            Channel::Master => "master",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown channel: {0}")]
pub struct UnknownChannel(pub String);

impl FromStr for Channel {
    type Err = UnknownChannel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Channel::ALL
            .into_iter()
            .find(|channel| channel.as_str() == lowered)
            .ok_or_else(|| UnknownChannel(s.to_string()))
    }
}

/// The tool-chain that produced or owns a version value. `Unknown` covers
/// manual installs and output that carries no manager fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InstallSource {
    Fvm,
    Asdf,
    #[default]
    Unknown,
}

impl fmt::Display for InstallSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallSource::Fvm => f.write_str("fvm"),
            InstallSource::Asdf => f.write_str("asdf"),
            InstallSource::Unknown => f.write_str("unknown"),
        }
    }
}

/// The closed set of installation strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyName {
    Fvm,
    Asdf,
    Manual,
}

impl fmt::Display for StrategyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyName::Fvm => f.write_str("fvm"),
            StrategyName::Asdf => f.write_str("asdf"),
            StrategyName::Manual => f.write_str("manual"),
        }
    }
}

/// A Flutter SDK version requirement or observation.
///
/// Both fields are optional: a spec with only a channel means "any version
/// on that channel", and an empty field in a *required* spec is a
/// don't-care when matched against a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VersionSpec {
    /// Dotted numeric version, optionally with a pre-release suffix
    /// (for example `3.33.0-0.2.pre`). Never carries a leading `v`.
    pub version: Option<String>,
    pub channel: Option<Channel>,
    pub source: InstallSource,
}

impl VersionSpec {
    #[must_use]
    pub fn new(version: Option<String>, channel: Option<Channel>) -> Self {
        Self {
            version,
            channel,
            source: InstallSource::Unknown,
        }
    }

    /// True when at least one of version/channel is known.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.version.is_some() || self.channel.is_some()
    }

    /// Partial equality: every field this (required) spec pins must equal
    /// the candidate's field; an unset field matches anything. An entirely
    /// empty requirement is satisfied by every candidate.
    #[must_use]
    pub fn satisfied_by(&self, candidate: &VersionSpec) -> bool {
        let version_ok = self
            .version
            .as_ref()
            .is_none_or(|required| candidate.version.as_deref() == Some(required));
        let channel_ok = self
            .channel
            .is_none_or(|required| candidate.channel == Some(required));
        version_ok && channel_ok
    }
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.version, self.channel) {
            (Some(version), Some(channel)) => write!(f, "{version} ({channel})"),
            (Some(version), None) => f.write_str(version),
            (None, Some(channel)) => write!(f, "channel {channel}"),
            (None, None) => f.write_str("unspecified"),
        }
    }
}

/// A deferred environment mutation produced by an install step and applied
/// once by the caller, so strategies never touch process-global state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvDelta {
    /// Prepend a directory to the `PATH`-like search variable.
    PrependPath(PathBuf),
    Set {
        key: String,
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(version: Option<&str>, channel: Option<Channel>) -> VersionSpec {
        VersionSpec::new(version.map(str::to_string), channel)
    }

    #[test]
    fn channel_parses_case_insensitively() {
        assert_eq!("Stable".parse::<Channel>().unwrap(), Channel::Stable);
        assert_eq!("BETA".parse::<Channel>().unwrap(), Channel::Beta);
        assert_eq!(" master ".parse::<Channel>().unwrap(), Channel::Master);
        assert!("nightly".parse::<Channel>().is_err());
    }

    #[test]
    fn channel_displays_lowercase() {
        assert_eq!(Channel::Dev.to_string(), "dev");
        assert_eq!(Channel::Main.to_string(), "main");
    }

    #[test]
    fn empty_requirement_is_satisfied_by_everything() {
        let required = spec(None, None);
        assert!(required.satisfied_by(&spec(Some("3.32.5"), Some(Channel::Stable))));
        assert!(required.satisfied_by(&spec(None, None)));
    }

    #[test]
    fn channel_only_requirement_matches_any_version_on_channel() {
        let required = spec(None, Some(Channel::Stable));
        assert!(required.satisfied_by(&spec(Some("3.32.5"), Some(Channel::Stable))));
        assert!(!required.satisfied_by(&spec(Some("3.32.5"), Some(Channel::Beta))));
        assert!(!required.satisfied_by(&spec(Some("3.32.5"), None)));
    }

    #[test]
    fn pinned_fields_must_match_exactly() {
        let required = spec(Some("3.33.0-0.2.pre"), Some(Channel::Beta));
        assert!(required.satisfied_by(&spec(Some("3.33.0-0.2.pre"), Some(Channel::Beta))));
        assert!(!required.satisfied_by(&spec(Some("3.33.0"), Some(Channel::Beta))));
        assert!(!required.satisfied_by(&spec(Some("3.33.0-0.2.pre"), Some(Channel::Stable))));
    }

    #[test]
    fn satisfaction_ignores_install_source() {
        let required = spec(Some("3.32.5"), None);
        let mut candidate = spec(Some("3.32.5"), Some(Channel::Stable));
        candidate.source = InstallSource::Fvm;
        assert!(required.satisfied_by(&candidate));
    }

    #[test]
    fn display_covers_all_shapes() {
        assert_eq!(
            spec(Some("3.32.5"), Some(Channel::Stable)).to_string(),
            "3.32.5 (stable)"
        );
        assert_eq!(spec(Some("3.32.5"), None).to_string(), "3.32.5");
        assert_eq!(spec(None, Some(Channel::Beta)).to_string(), "channel beta");
        assert_eq!(spec(None, None).to_string(), "unspecified");
    }
}
