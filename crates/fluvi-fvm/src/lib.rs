//! FVM installation strategy.
//!
//! FVM's command surface changed several times across its release history;
//! the probe parses the tool's own version once and derives independent
//! feature gates from an explicit threshold table.

mod features;
mod strategy;

pub use features::{FvmFeatures, detect_features};
pub use strategy::FvmStrategy;
