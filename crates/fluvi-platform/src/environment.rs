use std::ffi::{OsStr, OsString};
use std::path::PathBuf;

use log::debug;

use fluvi_backend::EnvDelta;

/// Apply deferred environment deltas to the process environment.
///
/// Path prepends are collected and applied as one block so the deltas'
/// order is the resulting search order. Child processes spawned afterwards
/// see the updated environment.
pub fn apply_env_deltas(deltas: &[EnvDelta]) {
    let prepends: Vec<PathBuf> = deltas
        .iter()
        .filter_map(|delta| match delta {
            EnvDelta::PrependPath(dir) => Some(dir.clone()),
            EnvDelta::Set { .. } => None,
        })
        .collect();

    if !prepends.is_empty() {
        let current = std::env::var_os("PATH").unwrap_or_default();
        if let Some(joined) = prepended_path(&current, &prepends) {
            debug!("PATH: {}", joined.to_string_lossy());
            // SAFETY: the orchestrator is strictly sequential on a
            // single-threaded runtime; no other thread reads or writes the
            // environment while deltas are applied.
            unsafe { std::env::set_var("PATH", &joined) };
        }
    }

    for delta in deltas {
        if let EnvDelta::Set { key, value } = delta {
            debug!("{key}={value}");
            // SAFETY: see above.
            unsafe { std::env::set_var(key, value) };
        }
    }
}

fn prepended_path(current: &OsStr, prepends: &[PathBuf]) -> Option<OsString> {
    let mut parts: Vec<PathBuf> = prepends.to_vec();
    parts.extend(std::env::split_paths(current));
    std::env::join_paths(parts).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prepends_keep_delta_order_ahead_of_existing_entries() {
        let current = std::env::join_paths([PathBuf::from("/usr/bin"), PathBuf::from("/bin")])
            .expect("joinable test paths");
        let prepends = vec![
            PathBuf::from("/sdk/bin"),
            PathBuf::from("/sdk/bin/cache/dart-sdk/bin"),
        ];

        let joined = prepended_path(&current, &prepends).expect("paths should join");
        let entries: Vec<PathBuf> = std::env::split_paths(&joined).collect();

        assert_eq!(
            entries,
            vec![
                PathBuf::from("/sdk/bin"),
                PathBuf::from("/sdk/bin/cache/dart-sdk/bin"),
                PathBuf::from("/usr/bin"),
                PathBuf::from("/bin"),
            ]
        );
    }

    #[test]
    fn set_delta_updates_the_process_environment() {
        let deltas = vec![EnvDelta::Set {
            key: "FLUVI_ENV_DELTA_TEST".to_string(),
            value: "on".to_string(),
        }];

        apply_env_deltas(&deltas);

        assert_eq!(
            std::env::var("FLUVI_ENV_DELTA_TEST").as_deref(),
            Ok("on")
        );
    }
}
