use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::{debug, info, warn};

use fluvi_backend::{
    EnvDelta, InstallError, InstallStrategy, StrategyCapabilities, StrategyName, VersionSpec,
    format_for_manager, parse_all,
};
use fluvi_platform::CommandLine;

use crate::bundle;

const FLUTTER_REPO_URL: &str = "https://github.com/flutter/flutter.git";
const SDK_DIR_NAME: &str = "flutter-sdk";

/// From-scratch installation into `$HOME/flutter-sdk/flutter`, either by
/// unpacking an installation bundle or by shallow-cloning the upstream
/// repository at the requested branch/tag.
///
/// There is no set-default step: activation happens through the `PATH`
/// deltas returned from [`InstallStrategy::install`].
#[derive(Debug, Clone)]
pub struct ManualStrategy {
    bundle_url: Option<String>,
    home: PathBuf,
}

impl ManualStrategy {
    /// Always available as the last-resort strategy, as long as a home
    /// directory exists to install into.
    pub fn new(bundle_url: Option<String>) -> Option<Self> {
        let Some(home) = dirs::home_dir() else {
            warn!("manual install is not available: no home directory");
            return None;
        };
        Some(Self { bundle_url, home })
    }

    fn sdk_parent(&self) -> PathBuf {
        self.home.join(SDK_DIR_NAME)
    }

    fn sdk_path(&self) -> PathBuf {
        self.sdk_parent().join("flutter")
    }
}

/// Search-path additions for a freshly unpacked SDK, in resulting order:
/// the Flutter and bundled Dart binaries first, then both pub caches.
fn sdk_env_deltas(sdk_path: &Path, home: &Path) -> Vec<EnvDelta> {
    vec![
        EnvDelta::PrependPath(sdk_path.join("bin")),
        EnvDelta::PrependPath(sdk_path.join("bin").join("cache").join("dart-sdk").join("bin")),
        EnvDelta::PrependPath(sdk_path.join(".pub-cache").join("bin")),
        EnvDelta::PrependPath(home.join(".pub-cache").join("bin")),
    ]
}

#[async_trait]
impl InstallStrategy for ManualStrategy {
    fn name(&self) -> StrategyName {
        StrategyName::Manual
    }

    fn capabilities(&self) -> StrategyCapabilities {
        StrategyCapabilities::default()
    }

    /// The only "listing" a manual install has is whatever `flutter`
    /// itself reports.
    async fn list_installed(&self) -> Result<Vec<VersionSpec>, InstallError> {
        let output = CommandLine::new("flutter", ["--version"])
            .run_trimmed_combined()
            .await?;
        parse_all(&output)
    }

    async fn install(&self, spec: &VersionSpec) -> Result<Vec<EnvDelta>, InstallError> {
        let sdk_parent = self.sdk_parent();
        let sdk_path = self.sdk_path();

        info!("Installing Flutter {spec} manually");
        debug!("Cleaning SDK target path: {}", sdk_parent.display());
        match tokio::fs::remove_dir_all(&sdk_parent).await {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }
        tokio::fs::create_dir_all(&sdk_parent).await?;

        if let Some(bundle_url) = &self.bundle_url {
            bundle::download_and_unarchive(bundle_url, &sdk_parent).await?;
        } else {
            let git_ref = format_for_manager(spec, StrategyName::Manual);
            info!("Cloning Flutter from {FLUTTER_REPO_URL} at {git_ref}");

            let sdk_path_str = sdk_path.to_string_lossy();
            CommandLine::new(
                "git",
                [
                    "clone",
                    FLUTTER_REPO_URL,
                    sdk_path_str.as_ref(),
                    "--depth",
                    "1",
                    "--branch",
                    git_ref.as_str(),
                ],
            )
            .run_trimmed_combined()
            .await?;
        }

        Ok(sdk_env_deltas(&sdk_path, &self.home))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_deltas_expose_sdk_and_pub_caches_in_order() {
        let sdk = Path::new("/home/ci/flutter-sdk/flutter");
        let home = Path::new("/home/ci");

        let deltas = sdk_env_deltas(sdk, home);

        assert_eq!(
            deltas,
            vec![
                EnvDelta::PrependPath(PathBuf::from("/home/ci/flutter-sdk/flutter/bin")),
                EnvDelta::PrependPath(PathBuf::from(
                    "/home/ci/flutter-sdk/flutter/bin/cache/dart-sdk/bin"
                )),
                EnvDelta::PrependPath(PathBuf::from(
                    "/home/ci/flutter-sdk/flutter/.pub-cache/bin"
                )),
                EnvDelta::PrependPath(PathBuf::from("/home/ci/.pub-cache/bin")),
            ]
        );
    }

    #[test]
    fn strategy_has_no_optional_capabilities() {
        let strategy = ManualStrategy {
            bundle_url: None,
            home: PathBuf::from("/home/ci"),
        };
        assert_eq!(strategy.name(), StrategyName::Manual);
        assert_eq!(strategy.capabilities(), StrategyCapabilities::default());
    }

    #[test]
    fn sdk_lives_under_the_home_directory() {
        let strategy = ManualStrategy {
            bundle_url: None,
            home: PathBuf::from("/home/ci"),
        };
        assert_eq!(
            strategy.sdk_path(),
            PathBuf::from("/home/ci/flutter-sdk/flutter")
        );
    }
}
