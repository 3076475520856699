//! Trust anchor records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::BundleId;

/// One trust anchor currently believed valid for a bundle.
///
/// Anchors are only ever created and deleted as a batch by the refresh
/// pipeline; there is no per-anchor edit path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrustAnchor {
    /// Unique identifier
    pub id: Uuid,
    /// Owning bundle
    pub bundle_id: BundleId,
    /// Raw certificate bytes (DER)
    pub der: Vec<u8>,
    /// SHA-256 thumbprint of the DER bytes (hex)
    pub thumbprint: String,
    /// Not valid before
    pub valid_from: DateTime<Utc>,
    /// Not valid after
    pub valid_until: DateTime<Utc>,
}

impl TrustAnchor {
    /// Whether the anchor's validity window covers `now`.
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.valid_from <= now && now <= self.valid_until
    }
}
