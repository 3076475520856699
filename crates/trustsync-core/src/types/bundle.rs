//! Trust bundle records.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::RefreshOutcome;

/// Opaque bundle identifier.
pub type BundleId = Uuid;

/// A named collection of trust anchors hosted at a URL.
///
/// The refresh pipeline is the only writer of the status fields
/// (`checksum`, `last_refresh_attempt`, `last_refresh_error`,
/// `last_successful_refresh`); configuration attributes (name, URL,
/// interval, signer) are owned by external collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrustBundle {
    /// Unique identifier
    pub id: BundleId,
    /// Unique human-readable name
    pub bundle_name: String,
    /// Source URL (`file://` or `http(s)://`)
    pub bundle_url: String,
    /// Seconds between scheduled refreshes; <= 0 disables auto-refresh
    pub refresh_interval_secs: i64,
    /// Fingerprint of the last successfully applied content (empty if never fetched)
    pub checksum: String,
    /// DER certificate used to authenticate signed containers, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signing_cert_der: Option<Vec<u8>>,
    /// When a refresh was last attempted
    pub last_refresh_attempt: Option<DateTime<Utc>>,
    /// Outcome of the last refresh attempt
    pub last_refresh_error: RefreshOutcome,
    /// When a refresh last completed successfully
    pub last_successful_refresh: Option<DateTime<Utc>>,
    /// When the bundle was configured
    pub created_at: DateTime<Utc>,
}

impl TrustBundle {
    /// Create a new bundle record that has never been fetched.
    #[must_use]
    pub fn new(name: impl Into<String>, url: impl Into<String>, refresh_interval_secs: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            bundle_name: name.into(),
            bundle_url: url.into(),
            refresh_interval_secs,
            checksum: String::new(),
            signing_cert_der: None,
            last_refresh_attempt: None,
            last_refresh_error: RefreshOutcome::None,
            last_successful_refresh: None,
            created_at: Utc::now(),
        }
    }

    /// Attach a signer certificate (DER) used to authenticate signed containers.
    #[must_use]
    pub fn with_signing_cert(mut self, der: Vec<u8>) -> Self {
        self.signing_cert_der = Some(der);
        self
    }

    /// Whether the scheduled refresh policy considers this bundle due at `now`.
    ///
    /// A non-positive interval permanently excludes the bundle from scheduled
    /// refresh. A bundle that never refreshed successfully is always due.
    #[must_use]
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        if self.refresh_interval_secs <= 0 {
            return false;
        }
        match self.last_successful_refresh {
            None => true,
            Some(last) => now >= last + Duration::seconds(self.refresh_interval_secs),
        }
    }

    /// Whether the bundle has ever stored a content fingerprint.
    #[must_use]
    pub fn has_checksum(&self) -> bool {
        !self.checksum.is_empty()
    }
}
