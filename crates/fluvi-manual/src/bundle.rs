//! Installation bundle download and extraction.
//!
//! The download uses bounded retries with fixed delays; nothing else in
//! the run is ever retried in place.

use std::path::{Path, PathBuf};
use std::time::Duration;

use futures_util::StreamExt;
use log::{debug, info};
use tokio::io::AsyncWriteExt;

use fluvi_backend::InstallError;
use fluvi_platform::CommandLine;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const RETRY_DELAYS_SECS: [u64; 3] = [0, 2, 5];

const BUNDLE_HOST: &str = "storage.googleapis.com";
const BUNDLE_PATH_PREFIXES: [&str; 2] = ["flutter_infra", "flutter_infra_release"];

/// Accepts URLs like
/// `https://storage.googleapis.com/flutter_infra/releases/beta/macos/flutter_macos_v1.6.3-beta.zip`.
///
/// # Errors
/// Returns [`InstallError::InvalidBundleUrl`] when the scheme, host or
/// leading path segment does not match the official release bucket.
pub fn validate_bundle_url(bundle_url: &str) -> Result<(), InstallError> {
    let url = reqwest::Url::parse(bundle_url).map_err(|err| InstallError::InvalidBundleUrl {
        reason: err.to_string(),
    })?;

    if url.scheme() != "https" {
        return Err(InstallError::InvalidBundleUrl {
            reason: format!("invalid URL scheme: {}, expecting https", url.scheme()),
        });
    }

    if url.host_str() != Some(BUNDLE_HOST) {
        return Err(InstallError::InvalidBundleUrl {
            reason: format!("invalid hostname, expecting {BUNDLE_HOST}"),
        });
    }

    let first_segment = url
        .path_segments()
        .and_then(|mut segments| segments.next())
        .unwrap_or_default();
    if !BUNDLE_PATH_PREFIXES.contains(&first_segment) {
        return Err(InstallError::InvalidBundleUrl {
            reason: format!(
                "invalid path, expecting it to begin with one of: {BUNDLE_PATH_PREFIXES:?}"
            ),
        });
    }

    Ok(())
}

/// Download the bundle at `bundle_url` and unpack it under `target_dir`.
///
/// # Errors
/// Fails on an invalid URL, a download that keeps failing after the retry
/// budget, or a `tar` exit failure.
pub async fn download_and_unarchive(
    bundle_url: &str,
    target_dir: &Path,
) -> Result<(), InstallError> {
    validate_bundle_url(bundle_url)?;

    // Keep the temp dir alive until tar is done with the archive.
    let staging = tempfile::tempdir()?;
    let archive_path = download_bundle(bundle_url, staging.path()).await?;
    unarchive_bundle(&archive_path, target_dir).await
}

async fn download_bundle(bundle_url: &str, staging_dir: &Path) -> Result<PathBuf, InstallError> {
    info!("Downloading installation bundle: {bundle_url}");

    let client = reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .user_agent(format!("fluvi/{}", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|err| InstallError::network("bundle download", err))?;

    let archive_path = staging_dir.join("flutter.tar");
    let mut last_error = None;

    for delay_secs in RETRY_DELAYS_SECS {
        if delay_secs > 0 {
            debug!("retrying bundle download in {delay_secs}s");
            tokio::time::sleep(Duration::from_secs(delay_secs)).await;
        }

        match download_once(&client, bundle_url, &archive_path).await {
            Ok(()) => return Ok(archive_path),
            Err(err) => {
                debug!("bundle download attempt failed: {err}");
                last_error = Some(err);
            }
        }
    }

    Err(last_error
        .unwrap_or_else(|| InstallError::network("bundle download", "no attempts were made")))
}

async fn download_once(
    client: &reqwest::Client,
    bundle_url: &str,
    archive_path: &Path,
) -> Result<(), InstallError> {
    let response = client
        .get(bundle_url)
        .send()
        .await
        .map_err(|err| InstallError::network("bundle download", err))?;

    if !response.status().is_success() {
        return Err(InstallError::network(
            "bundle download",
            format!("HTTP {} for {bundle_url}", response.status()),
        ));
    }

    let mut file = tokio::fs::File::create(archive_path).await?;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|err| InstallError::network("bundle download", err))?;
        file.write_all(&chunk).await?;
    }
    file.flush().await?;

    Ok(())
}

async fn unarchive_bundle(archive_path: &Path, target_dir: &Path) -> Result<(), InstallError> {
    // -J supports tar.xz; --no-same-owner keeps the current user as owner
    // so git does not reject the SDK checkout as an unsafe directory when
    // the step runs as root.
    let archive = archive_path.to_string_lossy();
    let target = target_dir.to_string_lossy();
    let output = CommandLine::new(
        "tar",
        ["--no-same-owner", "-xJf", archive.as_ref(), "-C", target.as_ref()],
    )
    .run_trimmed_combined()
    .await?;

    if !output.is_empty() {
        debug!("{output}");
    }

    Ok(())
}
