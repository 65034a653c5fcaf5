use async_trait::async_trait;
use log::info;

use fluvi_backend::{InstallError, SdkProbe, VersionSpec, parse_one};
use fluvi_platform::CommandLine;

/// The `flutter` binary on `PATH`, used as the single source of truth for
/// which SDK version is currently active.
pub struct FlutterCli;

impl FlutterCli {
    pub fn preinstalled() -> bool {
        which::which("flutter").is_ok()
    }

    /// `flutter doctor`, surfaced verbatim. Only run in debug mode.
    pub async fn doctor(&self) -> Result<(), InstallError> {
        let output = CommandLine::new("flutter", ["doctor"])
            .run_trimmed_combined()
            .await?;
        info!("flutter doctor:\n{output}");
        Ok(())
    }
}

#[async_trait]
impl SdkProbe for FlutterCli {
    async fn current(&self) -> Result<VersionSpec, InstallError> {
        let output = CommandLine::new("flutter", ["--version", "--machine"])
            .run_trimmed_combined()
            .await?;
        parse_one(&output)
    }
}
