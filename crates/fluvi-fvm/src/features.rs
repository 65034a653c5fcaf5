use std::sync::LazyLock;

use regex::Regex;
use semver::Version;

use fluvi_backend::InstallError;

static TOOL_VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\.\d+\.\d+").expect("tool version pattern is a valid regex"));

/// Capability record derived once from FVM's self-reported version.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FvmFeatures {
    /// `fvm install --setup` builds the SDK after download.
    pub setup_flag: bool,
    /// `fvm api list` replaced the human table as the reliable listing.
    pub api_listing: bool,
    /// `--fvm-skip-input` suppresses interactive prompts.
    pub skip_input_flag: bool,
}

#[derive(Debug, Clone, Copy)]
enum Feature {
    SetupFlag,
    ApiListing,
    SkipInputFlag,
}

/// The flags did not all land on the same FVM release, so each gate
/// carries its own minimum version.
const FEATURE_THRESHOLDS: [((u64, u64, u64), Feature); 3] = [
    ((3, 0, 0), Feature::SetupFlag),
    ((3, 1, 0), Feature::ApiListing),
    ((3, 2, 1), Feature::SkipInputFlag),
];

/// Derive the feature gates from the output of `fvm --version`.
///
/// # Errors
/// Returns [`InstallError::Parse`] when no `x.y.z` token can be found in
/// the output; the caller treats this as "all gates off".
pub fn detect_features(version_output: &str) -> Result<FvmFeatures, InstallError> {
    let raw = TOOL_VERSION_RE
        .find(version_output)
        .map(|m| m.as_str())
        .ok_or_else(|| InstallError::parse(version_output.trim()))?;
    let version =
        Version::parse(raw).map_err(|_| InstallError::parse(version_output.trim()))?;

    let mut features = FvmFeatures::default();
    for ((major, minor, patch), feature) in FEATURE_THRESHOLDS {
        if (version.major, version.minor, version.patch) >= (major, minor, patch) {
            match feature {
                Feature::SetupFlag => features.setup_flag = true,
                Feature::ApiListing => features.api_listing = true,
                Feature::SkipInputFlag => features.skip_input_flag = true,
            }
        }
    }

    Ok(features)
}
