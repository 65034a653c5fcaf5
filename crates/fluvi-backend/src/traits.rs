use async_trait::async_trait;

use crate::error::InstallError;
use crate::types::{EnvDelta, StrategyName, VersionSpec};

/// What a strategy can do beyond the mandatory install/list-installed pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StrategyCapabilities {
    /// The tool can enumerate all remotely available releases.
    pub lists_releases: bool,
    /// The tool can make an installed version the active default.
    pub sets_default: bool,
}

/// One interchangeable tool-chain capable of installing and activating a
/// Flutter SDK version.
///
/// Availability is probed once at construction: strategies that fail their
/// self-check are never constructed, so the orchestrator only ever holds
/// usable instances. Optional operations default to
/// [`InstallError::Unsupported`] and are guarded by [`StrategyCapabilities`].
#[async_trait]
pub trait InstallStrategy: Send + Sync {
    fn name(&self) -> StrategyName;

    fn capabilities(&self) -> StrategyCapabilities;

    /// Versions already installed by this tool, parsed from its listing.
    async fn list_installed(&self) -> Result<Vec<VersionSpec>, InstallError>;

    /// All remotely available releases. Only meaningful when
    /// `capabilities().lists_releases` is set.
    async fn list_releases(&self) -> Result<Vec<VersionSpec>, InstallError> {
        Err(InstallError::Unsupported {
            operation: "list_releases",
        })
    }

    /// Install the given spec. Returns environment deltas the caller must
    /// apply before re-verifying; most strategies return none.
    async fn install(&self, spec: &VersionSpec) -> Result<Vec<EnvDelta>, InstallError>;

    /// Make an already-installed spec the active default. Only meaningful
    /// when `capabilities().sets_default` is set.
    async fn set_default(&self, _spec: &VersionSpec) -> Result<(), InstallError> {
        Err(InstallError::Unsupported {
            operation: "set_default",
        })
    }
}

/// Probe for the currently active SDK version, independent of any strategy.
#[async_trait]
pub trait SdkProbe: Send + Sync {
    async fn current(&self) -> Result<VersionSpec, InstallError>;
}
