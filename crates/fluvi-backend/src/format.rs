use crate::types::{Channel, StrategyName, VersionSpec};

/// Render the version token in the syntax a specific tool expects.
///
/// FVM joins version and channel with `@`, asdf and the manual git path
/// with `-`. When the spec is entirely empty a manager-specific default is
/// substituted (`stable`, or `latest` for asdf). A channel suffix already
/// embedded in the version string is never duplicated.
#[must_use]
pub fn format_for_manager(spec: &VersionSpec, manager: StrategyName) -> String {
    let separator = match manager {
        StrategyName::Fvm => '@',
        StrategyName::Asdf | StrategyName::Manual => '-',
    };

    match (&spec.version, spec.channel) {
        (Some(version), Some(channel)) if has_embedded_channel(version, channel) => {
            version.clone()
        }
        (Some(version), Some(channel)) => format!("{version}{separator}{channel}"),
        (Some(version), None) => version.clone(),
        (None, Some(channel)) => channel.to_string(),
        (None, None) => match manager {
            StrategyName::Asdf => "latest".to_string(),
            StrategyName::Fvm | StrategyName::Manual => "stable".to_string(),
        },
    }
}

fn has_embedded_channel(version: &str, channel: Channel) -> bool {
    let name = channel.as_str();
    version.ends_with(&format!("@{name}")) || version.ends_with(&format!("-{name}"))
}
