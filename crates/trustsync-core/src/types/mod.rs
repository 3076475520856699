//! Bundle and anchor record types.

mod anchor;
mod bundle;
mod outcome;

pub use anchor::TrustAnchor;
pub use bundle::{BundleId, TrustBundle};
pub use outcome::RefreshOutcome;
