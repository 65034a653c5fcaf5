//! Core model and logic shared by every installation strategy:
//! - The `(version, channel, install source)` triple and its partial
//!   equality rules.
//! - Parsers that turn manager/tool output (JSON or free text) into
//!   version specs.
//! - Per-manager version token formatting.
//! - The strategy and probe traits the orchestrator drives.

mod error;
mod format;
mod parse;
mod traits;
mod types;

pub use error::InstallError;
pub use format::format_for_manager;
pub use parse::{parse_all, parse_one};
pub use traits::{InstallStrategy, SdkProbe, StrategyCapabilities};
pub use types::{Channel, EnvDelta, InstallSource, StrategyName, UnknownChannel, VersionSpec};
