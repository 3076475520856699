//! Persistence collaborator interfaces.
//!
//! The engine never talks to storage directly; it goes through these traits
//! so deployments can bind whatever persistence they run. The in-memory
//! implementation backs tests, fixtures, and the default daemon setup.

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use trustsync_core::{BundleId, RefreshOutcome, Result, TrustAnchor, TrustBundle};

/// Bundle record store.
#[async_trait]
pub trait BundleStore: Send + Sync {
    /// All configured bundles.
    async fn list(&self) -> Result<Vec<TrustBundle>>;

    /// Look a bundle up by its unique name.
    async fn find_by_name(&self, name: &str) -> Result<Option<TrustBundle>>;

    /// Add a new bundle. Fails with `SyncError::DuplicateName` if the name
    /// is taken.
    async fn insert(&self, bundle: TrustBundle) -> Result<()>;

    /// Record a refresh attempt that did not complete.
    async fn update_refresh_status(
        &self,
        id: &BundleId,
        attempt: DateTime<Utc>,
        outcome: RefreshOutcome,
    ) -> Result<()>;

    /// Record a successful refresh. `checksum` is `Some` only when the
    /// content changed and the anchor set was replaced.
    async fn record_success(
        &self,
        id: &BundleId,
        attempt: DateTime<Utc>,
        checksum: Option<String>,
    ) -> Result<()>;

    /// Remove a bundle by name, cascading its anchors.
    async fn delete(&self, name: &str) -> Result<()>;
}

/// Anchor row store. Anchors are only read and bulk-replaced; there is no
/// per-row edit path.
#[async_trait]
pub trait AnchorStore: Send + Sync {
    /// Current anchor set for a bundle.
    async fn anchors_for(&self, bundle_id: &BundleId) -> Result<Vec<TrustAnchor>>;

    /// Replace the bundle's whole anchor set as one logical unit. Readers
    /// must never observe a partially applied set.
    async fn replace_anchors(&self, bundle_id: &BundleId, anchors: Vec<TrustAnchor>)
        -> Result<()>;
}
