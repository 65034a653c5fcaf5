//! The resolution orchestrator: make the required Flutter version the
//! active one using the cheapest strategy that works.
//!
//! Two passes over the priority-ordered strategies: first try to activate
//! an already-installed match (set-default only), then fall back to a full
//! install. Every claimed success is re-verified against the live probe
//! before the run ends.

use log::{debug, info, warn};

use fluvi_backend::{
    InstallError, InstallSource, InstallStrategy, SdkProbe, StrategyName, VersionSpec,
};
use fluvi_platform::apply_env_deltas;

/// Priority order for the closed strategy set.
///
/// A bundle override forces the manual strategy first since it is the only
/// one that can consume a bundle; otherwise the manager that owns the
/// currently active SDK goes first, its counterpart second, and the manual
/// install stays the last resort. FVM is the primary default when no
/// manager fingerprint is known.
#[must_use]
pub fn strategy_order(active: InstallSource, bundle_override: bool) -> [StrategyName; 3] {
    let primary = if active == InstallSource::Asdf {
        StrategyName::Asdf
    } else {
        StrategyName::Fvm
    };
    let secondary = if primary == StrategyName::Fvm {
        StrategyName::Asdf
    } else {
        StrategyName::Fvm
    };

    if bundle_override {
        [StrategyName::Manual, secondary, primary]
    } else {
        [primary, secondary, StrategyName::Manual]
    }
}

/// Drive the strategies until `required` is the active SDK version.
///
/// # Errors
/// Returns [`InstallError::Exhausted`] when every available strategy has
/// failed both the activation and the installation pass.
pub async fn ensure_version(
    required: &VersionSpec,
    strategies: &[Box<dyn InstallStrategy>],
    probe: &dyn SdkProbe,
) -> Result<(), InstallError> {
    if let Ok(current) = probe.current().await
        && required.satisfied_by(&current)
    {
        info!("The active Flutter SDK ({current}) already satisfies {required}");
        return Ok(());
    }

    // Pass 1: a matching version may already be installed somewhere and
    // only needs to be made the default.
    for strategy in strategies {
        if !strategy.capabilities().sets_default {
            continue;
        }

        let installed = match strategy.list_installed().await {
            Ok(installed) => installed,
            Err(err) => {
                warn!(
                    "{} could not list installed versions: {err}",
                    strategy.name()
                );
                continue;
            }
        };
        if !installed
            .iter()
            .any(|candidate| required.satisfied_by(candidate))
        {
            debug!(
                "{} has no installed version matching {required}",
                strategy.name()
            );
            continue;
        }

        info!(
            "Flutter {required} is already installed by {}, setting it as default",
            strategy.name()
        );
        if let Err(err) = strategy.set_default(required).await {
            warn!("{} could not set the default version: {err}", strategy.name());
            continue;
        }
        if confirmed_active(probe, required).await {
            return Ok(());
        }
        warn!(
            "{} set the default but the active SDK still does not match",
            strategy.name()
        );
    }

    // Pass 2: full installation.
    for strategy in strategies {
        if strategy.capabilities().lists_releases {
            match strategy.list_releases().await {
                Ok(releases) if !releases.iter().any(|r| required.satisfied_by(r)) => {
                    let err = InstallError::NotOffered {
                        tool: strategy.name(),
                        requested: required.to_string(),
                    };
                    warn!("{err}");
                    continue;
                }
                Ok(_) => {}
                // An unreadable release listing is not proof of absence.
                Err(err) => debug!(
                    "{} release listing failed, installing anyway: {err}",
                    strategy.name()
                ),
            }
        }

        info!("Installing Flutter {required} with {}", strategy.name());
        let deltas = match strategy.install(required).await {
            Ok(deltas) => deltas,
            Err(err) => {
                warn!("{} failed to install {required}: {err}", strategy.name());
                continue;
            }
        };
        apply_env_deltas(&deltas);

        if strategy.capabilities().sets_default
            && let Err(err) = strategy.set_default(required).await
        {
            warn!(
                "{} installed {required} but could not set it as default: {err}",
                strategy.name()
            );
            continue;
        }

        if confirmed_active(probe, required).await {
            info!("Flutter {required} installed with {}", strategy.name());
            return Ok(());
        }
        warn!(
            "{} reported success but the active SDK does not match {required}",
            strategy.name()
        );
    }

    Err(InstallError::Exhausted {
        requested: required.to_string(),
    })
}

async fn confirmed_active(probe: &dyn SdkProbe, required: &VersionSpec) -> bool {
    match probe.current().await {
        Ok(current) => {
            debug!("Active Flutter SDK after the attempt: {current}");
            required.satisfied_by(&current)
        }
        Err(err) => {
            warn!("could not verify the active Flutter SDK: {err}");
            false
        }
    }
}
