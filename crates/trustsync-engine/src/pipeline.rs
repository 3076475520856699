//! Per-bundle refresh pipeline.
//!
//! One refresh walks fetch -> fingerprint compare -> decode/verify ->
//! anchor replacement -> status persistence, strictly in that order, and
//! always terminates by persisting `(attempt timestamp, outcome)` on the
//! bundle. Nothing is raised to the caller beyond the outcome code, so the
//! coordinator can fan these out without error plumbing.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

use trustsync_core::fingerprint;
use trustsync_core::{RefreshOutcome, TrustBundle};

use crate::anchor;
use crate::decode::BundleVerifier;
use crate::store::{AnchorStore, BundleStore};
use crate::transport::BundleTransport;

/// Runs the refresh pipeline for single bundles.
///
/// Cheap to clone; callable concurrently for different bundles.
#[derive(Clone)]
pub struct BundleRefresher {
    inner: Arc<RefresherInner>,
}

struct RefresherInner {
    bundles: Arc<dyn BundleStore>,
    anchors: Arc<dyn AnchorStore>,
    transport: BundleTransport,
    verifier: BundleVerifier,
}

impl BundleRefresher {
    /// Wire a refresher from its collaborators.
    #[must_use]
    pub fn new(
        bundles: Arc<dyn BundleStore>,
        anchors: Arc<dyn AnchorStore>,
        transport: BundleTransport,
        verifier: BundleVerifier,
    ) -> Self {
        Self {
            inner: Arc::new(RefresherInner {
                bundles,
                anchors,
                transport,
                verifier,
            }),
        }
    }

    /// Refresh one bundle to a terminal outcome.
    ///
    /// Also the manual "force refresh" entry point -- it ignores the
    /// bundle's refresh interval.
    pub async fn refresh(&self, bundle: &TrustBundle) -> RefreshOutcome {
        let attempt = Utc::now();

        // Fetch.
        let raw = match self.inner.transport.fetch(&bundle.bundle_url).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(bundle = %bundle.bundle_name, error = %e, "bundle download failed");
                return self.fail(bundle, attempt, e.outcome()).await;
            }
        };

        // Change detection. The first successful fetch always loads fully.
        let checksum = fingerprint::sha256_hex(&raw);
        if bundle.has_checksum() && bundle.checksum == checksum {
            debug!(bundle = %bundle.bundle_name, "bundle content unchanged");
            return self.succeed(bundle, attempt, None).await;
        }

        // Decode and, for signed containers, authenticate.
        let cert_ders = match self
            .inner
            .verifier
            .decode_anchors(&raw, bundle.signing_cert_der.as_deref())
        {
            Ok(certs) => certs,
            Err(outcome) => {
                warn!(bundle = %bundle.bundle_name, outcome = %outcome, "bundle content rejected");
                return self.fail(bundle, attempt, outcome).await;
            }
        };

        // Convert to anchor rows; any bad certificate aborts the batch.
        let anchors = match anchor::build_anchors(bundle.id, cert_ders) {
            Ok(anchors) => anchors,
            Err(e) => {
                warn!(bundle = %bundle.bundle_name, error = %e, "anchor conversion failed");
                return self.fail(bundle, attempt, RefreshOutcome::InvalidFormat).await;
            }
        };

        // Replace the whole set as one unit.
        let count = anchors.len();
        if let Err(e) = self.inner.anchors.replace_anchors(&bundle.id, anchors).await {
            warn!(bundle = %bundle.bundle_name, error = %e, "anchor replacement failed");
            return self.fail(bundle, attempt, RefreshOutcome::InvalidFormat).await;
        }

        info!(bundle = %bundle.bundle_name, anchors = count, "bundle refreshed");
        self.succeed(bundle, attempt, Some(checksum)).await
    }

    /// Persist a failed attempt. A failure to record the failure is logged
    /// and swallowed; the next scheduled tick retries the whole attempt.
    async fn fail(
        &self,
        bundle: &TrustBundle,
        attempt: DateTime<Utc>,
        outcome: RefreshOutcome,
    ) -> RefreshOutcome {
        if let Err(e) = self
            .inner
            .bundles
            .update_refresh_status(&bundle.id, attempt, outcome)
            .await
        {
            warn!(bundle = %bundle.bundle_name, error = %e, "failed to record refresh outcome");
        }
        outcome
    }

    /// Persist a successful attempt. `checksum` is `Some` only when the
    /// anchor set was replaced.
    async fn succeed(
        &self,
        bundle: &TrustBundle,
        attempt: DateTime<Utc>,
        checksum: Option<String>,
    ) -> RefreshOutcome {
        if let Err(e) = self
            .inner
            .bundles
            .record_success(&bundle.id, attempt, checksum)
            .await
        {
            warn!(bundle = %bundle.bundle_name, error = %e, "failed to record refresh success");
        }
        RefreshOutcome::Success
    }
}
