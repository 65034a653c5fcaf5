use async_trait::async_trait;
use log::{debug, info, warn};

use fluvi_backend::{
    EnvDelta, InstallError, InstallStrategy, StrategyCapabilities, StrategyName, VersionSpec,
    format_for_manager, parse_all,
};
use fluvi_platform::CommandLine;

use crate::features::{FvmFeatures, detect_features};

#[derive(Debug, Clone)]
pub struct FvmStrategy {
    features: FvmFeatures,
}

impl FvmStrategy {
    /// Probe `fvm --version` once. Returns `None` when the tool is missing
    /// or broken; the strategy is then left out of the run entirely.
    pub async fn detect() -> Option<Self> {
        let output = match CommandLine::new("fvm", ["--version"])
            .run_trimmed_combined()
            .await
        {
            Ok(output) => output,
            Err(err) => {
                warn!("fvm is not available: {err}");
                return None;
            }
        };

        let features = match detect_features(&output) {
            Ok(features) => features,
            Err(err) => {
                warn!("failed to read fvm feature gates, assuming none: {err}");
                FvmFeatures::default()
            }
        };

        debug!("fvm detected: {output}, features: {features:?}");
        Some(Self { features })
    }

    #[cfg(test)]
    fn with_features(features: FvmFeatures) -> Self {
        Self { features }
    }

    fn token(spec: &VersionSpec) -> String {
        format_for_manager(spec, StrategyName::Fvm)
    }
}

fn list_args(features: FvmFeatures) -> Vec<&'static str> {
    if features.api_listing {
        vec!["api", "list", "--skip-size-calculation"]
    } else {
        vec!["list"]
    }
}

fn install_args(token: &str, features: FvmFeatures) -> Vec<String> {
    let mut args = vec!["install".to_string(), token.to_string()];
    if features.setup_flag {
        args.push("--setup".to_string());
    }
    if features.skip_input_flag {
        args.push("--fvm-skip-input".to_string());
    }
    args
}

fn set_default_args(token: &str, features: FvmFeatures) -> Vec<String> {
    let mut args = vec!["global".to_string(), token.to_string()];
    if features.skip_input_flag {
        args.push("--fvm-skip-input".to_string());
    }
    args
}

#[async_trait]
impl InstallStrategy for FvmStrategy {
    fn name(&self) -> StrategyName {
        StrategyName::Fvm
    }

    fn capabilities(&self) -> StrategyCapabilities {
        StrategyCapabilities {
            lists_releases: true,
            sets_default: true,
        }
    }

    async fn list_installed(&self) -> Result<Vec<VersionSpec>, InstallError> {
        let output = CommandLine::new("fvm", list_args(self.features))
            .run_trimmed_combined()
            .await?;
        parse_all(&output)
    }

    async fn list_releases(&self) -> Result<Vec<VersionSpec>, InstallError> {
        let output = CommandLine::new("fvm", ["releases"])
            .run_trimmed_combined()
            .await?;
        parse_all(&output)
    }

    async fn install(&self, spec: &VersionSpec) -> Result<Vec<EnvDelta>, InstallError> {
        let token = Self::token(spec);
        info!("Installing Flutter {spec} with fvm");
        CommandLine::new("fvm", install_args(&token, self.features))
            .ci()
            .run_trimmed_combined()
            .await?;
        Ok(Vec::new())
    }

    async fn set_default(&self, spec: &VersionSpec) -> Result<(), InstallError> {
        let token = Self::token(spec);
        debug!("Setting Flutter {spec} as default with fvm");
        CommandLine::new("fvm", set_default_args(&token, self.features))
            .ci()
            .run_trimmed_combined()
            .await?;
        Ok(())
    }
}
