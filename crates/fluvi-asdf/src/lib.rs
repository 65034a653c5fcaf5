//! asdf installation strategy.
//!
//! asdf manages Flutter through its plugin system, so availability means
//! both the tool itself and the flutter plugin being present.

mod strategy;

pub use strategy::AsdfStrategy;
