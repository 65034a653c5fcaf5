//! Step inputs, read from the environment.

use std::env;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("either the `version` or the `installation_bundle_url` input must be provided")]
    MissingVersionInput,
}

/// All caller-supplied inputs. Empty strings count as unset.
#[derive(Debug, Clone)]
pub struct Config {
    /// Requested version token: an exact version, a `version@channel` /
    /// `version-channel` pair, or a bare channel name.
    pub version: Option<String>,
    /// Installation-bundle URL override. When set, the manual strategy is
    /// tried first and downloads this bundle instead of cloning git.
    pub bundle_url: Option<String>,
    /// Install the requested version even when a channel match would
    /// normally skip the work.
    pub is_update: bool,
    pub is_debug: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let config = Self {
            version: non_empty(lookup("version")),
            bundle_url: non_empty(lookup("installation_bundle_url")),
            is_update: flag(lookup("is_update")),
            is_debug: flag(lookup("is_debug")),
        };

        if config.version.is_none() && config.bundle_url.is_none() {
            return Err(ConfigError::MissingVersionInput);
        }
        Ok(config)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn flag(value: Option<String>) -> bool {
    value.is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<&str, &str> = vars.iter().copied().collect();
        Config::from_lookup(|name| vars.get(name).map(|v| (*v).to_string()))
    }

    #[test]
    fn version_alone_is_enough() {
        let config = config(&[("version", "3.19.0")]).unwrap();
        assert_eq!(config.version.as_deref(), Some("3.19.0"));
        assert!(config.bundle_url.is_none());
        assert!(!config.is_update);
        assert!(!config.is_debug);
    }

    #[test]
    fn bundle_url_alone_is_enough() {
        let config = config(&[(
            "installation_bundle_url",
            "https://storage.googleapis.com/flutter_infra/releases/x.zip",
        )])
        .unwrap();
        assert!(config.version.is_none());
        assert!(config.bundle_url.is_some());
    }

    #[test]
    fn missing_both_inputs_is_an_error() {
        assert!(matches!(
            config(&[("is_debug", "true")]),
            Err(ConfigError::MissingVersionInput)
        ));
    }

    #[test]
    fn blank_inputs_count_as_unset() {
        assert!(matches!(
            config(&[("version", "   ")]),
            Err(ConfigError::MissingVersionInput)
        ));
    }

    #[test]
    fn flags_parse_true_case_insensitively_and_default_to_false() {
        let config = config(&[
            ("version", "stable"),
            ("is_update", "True"),
            ("is_debug", "yes"),
        ])
        .unwrap();
        assert!(config.is_update);
        assert!(!config.is_debug);
    }
}
