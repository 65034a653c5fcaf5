//! Resolve the required Flutter SDK version and make it the active one.

mod config;
mod ensure;
mod logging;
mod probe;

use std::path::Path;
use std::process::ExitCode;

use log::{debug, error, info, warn};

use fluvi_asdf::AsdfStrategy;
use fluvi_backend::{Channel, InstallError, InstallSource, InstallStrategy, SdkProbe, StrategyName, VersionSpec, parse_one};
use fluvi_fvm::FvmStrategy;
use fluvi_manual::ManualStrategy;

use crate::config::Config;
use crate::probe::FlutterCli;

// Strategies run external installers one at a time and the run applies
// environment mutations between steps, so everything stays on one thread.
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    logging::init(config.is_debug);

    match run(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &Config) -> Result<(), InstallError> {
    if config.version.is_some() && config.bundle_url.is_some() {
        warn!("both `version` and `installation_bundle_url` are set; the bundle URL takes precedence");
    }

    let probe = FlutterCli;
    let current = if FlutterCli::preinstalled() {
        match probe.current().await {
            Ok(current) => {
                info!("Preinstalled Flutter SDK: {current}");
                Some(current)
            }
            Err(err) => {
                debug!("could not probe the preinstalled Flutter SDK: {err}");
                None
            }
        }
    } else {
        info!("No preinstalled Flutter SDK found");
        None
    };

    let project_root = std::env::current_dir()?;
    let required = resolve_required(config, &project_root)?;
    info!("Required Flutter SDK: {required}");

    if channel_already_active(config, current.as_ref()) {
        info!("The preinstalled Flutter SDK is already on the requested channel, nothing to install");
        if config.is_debug {
            probe.doctor().await?;
        }
        return Ok(());
    }

    let active = current.as_ref().map_or(InstallSource::Unknown, |c| c.source);
    let order = ensure::strategy_order(active, config.bundle_url.is_some());
    debug!("Strategy priority: {order:?}");

    let mut strategies: Vec<Box<dyn InstallStrategy>> = Vec::new();
    for name in order {
        match name {
            StrategyName::Fvm => {
                if let Some(strategy) = FvmStrategy::detect().await {
                    strategies.push(Box::new(strategy));
                }
            }
            StrategyName::Asdf => {
                if let Some(strategy) = AsdfStrategy::detect().await {
                    strategies.push(Box::new(strategy));
                }
            }
            StrategyName::Manual => {
                if let Some(strategy) = ManualStrategy::new(config.bundle_url.clone()) {
                    strategies.push(Box::new(strategy));
                }
            }
        }
    }

    ensure::ensure_version(&required, &strategies, &probe).await?;

    if config.is_debug {
        probe.doctor().await?;
    }
    Ok(())
}

/// Requirement sources in priority order: the bundle URL (its file name
/// embeds a version), the caller's version token, then the project's own
/// pinning files.
fn resolve_required(config: &Config, project_root: &Path) -> Result<VersionSpec, InstallError> {
    if let Some(bundle_url) = &config.bundle_url {
        match parse_one(bundle_url) {
            Ok(spec) => return Ok(spec),
            Err(err) => debug!("the bundle URL does not name a version: {err}"),
        }
    }

    if let Some(version) = &config.version {
        match parse_one(version) {
            Ok(spec) => return Ok(spec),
            Err(err) => warn!("could not parse the `version` input: {err}"),
        }
    }

    let project = fluvi_project::find_sdk_versions(project_root);
    if let Some(spec) = project.preferred() {
        info!("Using the Flutter version pinned by the project");
        return Ok(spec.clone());
    }

    Err(InstallError::NoRequiredVersion)
}

/// A bare channel request is already satisfied when the preinstalled SDK
/// sits on that channel; tracking channels have no exact version to pin.
/// An explicit update request or a bundle override always installs.
fn channel_already_active(config: &Config, current: Option<&VersionSpec>) -> bool {
    if config.is_update || config.bundle_url.is_some() {
        return false;
    }
    let Some(requested) = &config.version else {
        return false;
    };
    let Some(channel) = current.and_then(|spec| spec.channel) else {
        return false;
    };

    matches!(
        channel,
        Channel::Stable | Channel::Beta | Channel::Dev | Channel::Master
    ) && requested.trim().eq_ignore_ascii_case(channel.as_str())
}
