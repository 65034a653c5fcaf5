//! Manual installation strategy: a from-scratch Flutter SDK install via
//! shallow git clone, or download + unarchive of an installation bundle
//! when a bundle URL override is supplied.

mod bundle;
mod strategy;

pub use bundle::validate_bundle_url;
pub use strategy::ManualStrategy;
