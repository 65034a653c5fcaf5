use thiserror::Error;

use crate::types::StrategyName;

/// Failure taxonomy for the resolution/installation pipeline.
///
/// Everything except `Exhausted` is recoverable at the orchestrator level:
/// parse failures move on to the next input source, unavailable tools are
/// excluded, and failed commands trigger strategy fallback rather than a
/// retry in place.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InstallError {
    #[error("no Flutter version or channel could be parsed from input: {input}")]
    Parse { input: String },

    #[error("{tool} is not available: {details}")]
    ToolUnavailable {
        tool: StrategyName,
        details: String,
    },

    #[error("{tool} does not offer Flutter {requested}")]
    NotOffered {
        tool: StrategyName,
        requested: String,
    },

    /// External tool exited non-zero or could not be spawned. Carries the
    /// tool's trimmed combined output, the only diagnostic a human gets.
    #[error("command failed: {command}: {output}")]
    CommandFailed { command: String, output: String },

    #[error("operation not supported by this strategy: {operation}")]
    Unsupported { operation: &'static str },

    #[error("no Flutter version specified in the configuration or project files")]
    NoRequiredVersion,

    #[error("Flutter {requested} could not be installed or set as default by any available tool")]
    Exhausted { requested: String },

    #[error("invalid installation bundle URL: {reason}")]
    InvalidBundleUrl { reason: String },

    #[error("network error during {operation}: {details}")]
    Network {
        operation: &'static str,
        details: String,
    },

    #[error("IO error ({kind}): {message}")]
    Io {
        kind: std::io::ErrorKind,
        message: String,
    },
}

impl InstallError {
    pub fn parse(input: impl Into<String>) -> Self {
        Self::Parse {
            input: input.into(),
        }
    }

    pub fn command_failed(command: impl Into<String>, output: impl Into<String>) -> Self {
        Self::CommandFailed {
            command: command.into(),
            output: output.into(),
        }
    }

    pub fn network<E: std::fmt::Display>(operation: &'static str, error: E) -> Self {
        Self::Network {
            operation,
            details: error.to_string(),
        }
    }
}

impl From<std::io::Error> for InstallError {
    fn from(err: std::io::Error) -> Self {
        InstallError::Io {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_failed_display_includes_tool_output() {
        let error = InstallError::command_failed("fvm install 3.2.1", "No releases found");
        assert_eq!(
            error.to_string(),
            "command failed: fvm install 3.2.1: No releases found"
        );
    }

    #[test]
    fn io_error_conversion_keeps_kind() {
        let mapped = InstallError::from(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing dir",
        ));
        assert!(
            matches!(mapped, InstallError::Io { kind, ref message }
                if kind == std::io::ErrorKind::NotFound && message.contains("missing dir"))
        );
    }

    #[test]
    fn not_offered_names_the_tool() {
        let error = InstallError::NotOffered {
            tool: StrategyName::Asdf,
            requested: "3.99.0".to_string(),
        };
        assert_eq!(error.to_string(), "asdf does not offer Flutter 3.99.0");
    }
}
