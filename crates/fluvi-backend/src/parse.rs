//! Parsers that extract version specs from heterogeneous tool output.
//!
//! Two paths are tried in sequence: machine-readable JSON (the
//! `flutter --version --machine` schema and the FVM `api list` envelope),
//! then a line-oriented text scanner for human-readable listings, bundle
//! file names and bare version tokens.

use std::sync::LazyLock;

use log::debug;
use regex::Regex;
use serde::Deserialize;

use crate::error::InstallError;
use crate::types::{Channel, InstallSource, VersionSpec};

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"v?[0-9]+\.[0-9]+\.[0-9]+(?:[-.][A-Za-z0-9.\-]+)?")
        .expect("version pattern is a valid regex")
});

static CHANNEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    let alternatives = Channel::ALL.map(Channel::as_str).join("|");
    Regex::new(&format!(r"(?i)\b({alternatives})\b")).expect("channel pattern is a valid regex")
});

/// Parse the single best version/channel match out of `input`.
///
/// # Errors
/// Returns [`InstallError::Parse`] when neither the JSON decoders nor the
/// text scanner find a version or channel.
pub fn parse_one(input: &str) -> Result<VersionSpec, InstallError> {
    parse(input, true)?
        .into_iter()
        .next()
        .ok_or_else(|| InstallError::parse(input.trim()))
}

/// Parse every version/channel match out of `input`, in input order.
/// Used against listings that enumerate many entries.
///
/// # Errors
/// Returns [`InstallError::Parse`] when no entry could be extracted.
pub fn parse_all(input: &str) -> Result<Vec<VersionSpec>, InstallError> {
    let specs = parse(input, false)?;
    if specs.is_empty() {
        return Err(InstallError::parse(input.trim()));
    }
    Ok(specs)
}

fn parse(input: &str, single: bool) -> Result<Vec<VersionSpec>, InstallError> {
    if input.trim().is_empty() {
        return Err(InstallError::parse(""));
    }

    if let Some(specs) = parse_json(input, single) {
        return Ok(specs);
    }

    Ok(parse_text_lines(input, single))
}

/// Which manager's fingerprint, if any, appears anywhere in the raw text.
/// Used as a fallback when a record carries no path of its own.
fn infer_source(text: &str) -> InstallSource {
    if text.contains("fvm") {
        InstallSource::Fvm
    } else if text.contains("asdf") {
        InstallSource::Asdf
    } else {
        InstallSource::Unknown
    }
}

/// Fields of the `flutter --version --machine` output schema.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MachineVersionRecord {
    flutter_version: Option<String>,
    framework_version: Option<String>,
    channel: Option<String>,
    flutter_root: Option<String>,
}

/// Fields of an entry in the FVM `api list` cache listing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FvmCacheRecord {
    name: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    release_from_channel: Option<String>,
    flutter_sdk_version: Option<String>,
    bin_path: Option<String>,
}

fn parse_json(input: &str, single: bool) -> Option<Vec<VersionSpec>> {
    let value: serde_json::Value = serde_json::from_str(input.trim()).ok()?;
    let fallback = infer_source(input);

    // FVM's `api list` wraps entries in a "versions" array; parse each
    // element independently and skip the ones that resolve nothing.
    if let Some(entries) = value.get("versions").and_then(serde_json::Value::as_array) {
        let mut specs = Vec::new();
        for entry in entries {
            if let Some(spec) = decode_record(entry, fallback) {
                specs.push(spec);
                if single {
                    return Some(specs);
                }
            } else {
                debug!("skipping listing entry without version or channel: {entry}");
            }
        }
        if !specs.is_empty() {
            return Some(specs);
        }
    }

    decode_record(&value, fallback).map(|spec| vec![spec])
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn decode_record(value: &serde_json::Value, fallback: InstallSource) -> Option<VersionSpec> {
    let machine: MachineVersionRecord = serde_json::from_value(value.clone()).ok()?;
    let cache: FvmCacheRecord = serde_json::from_value(value.clone()).ok()?;

    let is_release = cache.kind.as_deref() == Some("release");
    let is_channel = cache.kind.as_deref() == Some("channel");

    let version = non_empty(machine.flutter_version)
        .or_else(|| non_empty(cache.flutter_sdk_version))
        .or_else(|| non_empty(machine.framework_version))
        .or_else(|| {
            if is_release {
                non_empty(cache.name.clone())
            } else {
                None
            }
        });

    let channel = machine
        .channel
        .and_then(|c| c.parse::<Channel>().ok())
        .or_else(|| {
            cache
                .release_from_channel
                .and_then(|c| c.parse::<Channel>().ok())
        })
        .or_else(|| {
            if is_channel {
                cache.name.as_deref().and_then(|n| n.parse::<Channel>().ok())
            } else {
                None
            }
        });

    if version.is_none() && channel.is_none() {
        return None;
    }

    let source = match (machine.flutter_root.as_deref(), cache.bin_path.as_deref()) {
        (Some(root), _) if !root.is_empty() => infer_source(root),
        (_, Some(bin)) if !bin.is_empty() => infer_source(bin),
        _ => InstallSource::Unknown,
    };

    Some(VersionSpec {
        version,
        channel,
        source: if source == InstallSource::Unknown {
            fallback
        } else {
            source
        },
    })
}

/// Strip a leading `v` and a trailing `-<channel>` from a raw version
/// match; the suffix is channel information, not part of the version.
fn normalize_version(raw: &str) -> String {
    let version = raw.strip_prefix('v').unwrap_or(raw);
    for channel in Channel::ALL {
        let suffix = format!("-{channel}");
        let mut search_start = 0;
        while let Some(offset) = version[search_start..].find(&suffix) {
            let index = search_start + offset;
            if channel_token_ends_at(&version[index + suffix.len()..]) {
                return version[..index].to_string();
            }
            search_start = index + 1;
        }
    }
    version.to_string()
}

/// A `-<channel>` hit only counts when the channel name is a complete
/// trailing token: end of string, or a separator introducing non-numeric
/// text such as a file extension (`1.6.3-beta.zip`). A digit after the
/// separator means the segment is a pre-release component
/// (`2.3.2-dev.0.0`), not a channel.
fn channel_token_ends_at(rest: &str) -> bool {
    let mut chars = rest.chars();
    match chars.next() {
        None => true,
        Some('.' | '-') => !chars.next().is_some_and(|c| c.is_ascii_digit()),
        Some(_) => false,
    }
}

fn parse_text_lines(input: &str, single: bool) -> Vec<VersionSpec> {
    let fallback = infer_source(input);
    let mut specs = Vec::new();
    let mut version: Option<String> = None;
    let mut channel: Option<Channel> = None;

    for line in input.lines() {
        // Never match the embedded Dart runtime version printed alongside
        // Flutter's own.
        if line.to_lowercase().contains("dart") {
            continue;
        }

        let line_version = VERSION_RE.find(line).map(|m| normalize_version(m.as_str()));
        let line_channel = CHANNEL_RE
            .find(line)
            .and_then(|m| m.as_str().parse::<Channel>().ok());

        if single {
            // Version and channel may live on different lines; the first
            // hit for each field wins independently.
            if version.is_none() {
                version = line_version;
            }
            if channel.is_none() {
                channel = line_channel;
            }
            if version.is_some() && channel.is_some() {
                break;
            }
        } else if line_version.is_some() || line_channel.is_some() {
            specs.push(VersionSpec {
                version: line_version,
                channel: line_channel,
                source: fallback,
            });
        }
    }

    if single && (version.is_some() || channel.is_some()) {
        specs.push(VersionSpec {
            version,
            channel,
            source: fallback,
        });
    }

    specs
}
