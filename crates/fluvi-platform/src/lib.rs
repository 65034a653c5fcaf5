//! Process and environment plumbing shared by every strategy: the single
//! command-runner primitive, window hiding on Windows, and deferred
//! environment delta application.

mod commands;
mod environment;

pub use commands::{CommandLine, HideWindow};
pub use environment::apply_env_deltas;
