use async_trait::async_trait;
use log::{debug, info, warn};

use fluvi_backend::{
    EnvDelta, InstallError, InstallStrategy, StrategyCapabilities, StrategyName, VersionSpec,
    format_for_manager, parse_all,
};
use fluvi_platform::CommandLine;

#[derive(Debug, Clone)]
pub struct AsdfStrategy {
    _private: (),
}

impl AsdfStrategy {
    /// Probe `asdf plugin-list` once; the flutter plugin must be installed
    /// for this strategy to be usable at all.
    pub async fn detect() -> Option<Self> {
        match CommandLine::new("asdf", ["plugin-list"])
            .run_trimmed_combined()
            .await
        {
            Ok(output) if output.contains("flutter") => {
                debug!("asdf detected with flutter plugin");
                Some(Self { _private: () })
            }
            Ok(output) => {
                warn!("asdf is available but the flutter plugin is not: {output}");
                None
            }
            Err(err) => {
                warn!("asdf is not available: {err}");
                None
            }
        }
    }

    fn token(spec: &VersionSpec) -> String {
        format_for_manager(spec, StrategyName::Asdf)
    }
}

#[async_trait]
impl InstallStrategy for AsdfStrategy {
    fn name(&self) -> StrategyName {
        StrategyName::Asdf
    }

    fn capabilities(&self) -> StrategyCapabilities {
        StrategyCapabilities {
            lists_releases: true,
            sets_default: true,
        }
    }

    async fn list_installed(&self) -> Result<Vec<VersionSpec>, InstallError> {
        let output = CommandLine::new("asdf", ["list", "flutter"])
            .run_trimmed_combined()
            .await?;
        parse_all(&output)
    }

    async fn list_releases(&self) -> Result<Vec<VersionSpec>, InstallError> {
        let output = CommandLine::new("asdf", ["list", "all", "flutter"])
            .run_trimmed_combined()
            .await?;
        parse_all(&output)
    }

    async fn install(&self, spec: &VersionSpec) -> Result<Vec<EnvDelta>, InstallError> {
        let token = Self::token(spec);
        info!("Installing Flutter {spec} with asdf");
        CommandLine::new("asdf", ["install", "flutter", token.as_str()])
            .ci()
            .run_trimmed_combined()
            .await?;
        Ok(Vec::new())
    }

    async fn set_default(&self, spec: &VersionSpec) -> Result<(), InstallError> {
        let token = Self::token(spec);
        debug!("Setting Flutter {spec} as default with asdf");
        CommandLine::new("asdf", ["global", "flutter", token.as_str()])
            .ci()
            .run_trimmed_combined()
            .await?;
        Ok(())
    }
}
