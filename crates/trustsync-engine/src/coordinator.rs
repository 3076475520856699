//! Cache refresh coordination across all configured bundles.

use chrono::Utc;
use futures_util::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};

use trustsync_core::TrustBundle;

use crate::pipeline::BundleRefresher;
use crate::store::BundleStore;

/// Walks every configured bundle each cycle, refreshing the ones that are
/// due and isolating failures per bundle.
#[derive(Clone)]
pub struct CacheUpdater {
    bundles: Arc<dyn BundleStore>,
    refresher: BundleRefresher,
}

impl CacheUpdater {
    /// Wire an updater from its collaborators.
    #[must_use]
    pub fn new(bundles: Arc<dyn BundleStore>, refresher: BundleRefresher) -> Self {
        Self { bundles, refresher }
    }

    /// Run one cache-update cycle.
    ///
    /// Bundles with a non-positive interval are skipped, as are bundles
    /// whose interval has not elapsed since the last successful refresh.
    /// The rest refresh concurrently; each terminates in a persisted
    /// outcome, so one bundle's failure never touches the others. If the
    /// bundle listing itself fails the cycle is abandoned and the next
    /// scheduled tick retries.
    pub async fn update_bundle_cache(&self) {
        let all = match self.bundles.list().await {
            Ok(bundles) => bundles,
            Err(e) => {
                warn!(error = %e, "bundle listing failed, skipping cache update cycle");
                return;
            }
        };

        let now = Utc::now();
        let total = all.len();
        let due: Vec<TrustBundle> = all.into_iter().filter(|b| b.is_due(now)).collect();
        let skipped = total - due.len();
        debug!(total, due = due.len(), "starting bundle cache update cycle");

        let refreshes: Vec<_> = due.iter().map(|b| self.refresher.refresh(b)).collect();
        let outcomes = join_all(refreshes).await;

        let refreshed = outcomes.iter().filter(|o| o.is_success()).count();
        let failed = outcomes.len() - refreshed;
        info!(refreshed, failed, skipped, "bundle cache update cycle complete");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TransportConfig;
    use crate::decode::BundleVerifier;
    use crate::store::{AnchorStore, MemoryStore};
    use crate::transport::BundleTransport;
    use chrono::Duration;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use trustsync_core::RefreshOutcome;

    fn cert_der(cn: &str) -> Vec<u8> {
        let key = rcgen::KeyPair::generate().unwrap();
        let mut params = rcgen::CertificateParams::new(Vec::new()).unwrap();
        params.distinguished_name.push(rcgen::DnType::CommonName, cn);
        params.self_signed(&key).unwrap().der().to_vec()
    }

    fn bundle_file(cn: &str) -> NamedTempFile {
        let mut tmp = NamedTempFile::new().unwrap();
        tmp.write_all(&cert_der(cn)).unwrap();
        tmp.flush().unwrap();
        tmp
    }

    fn updater(store: &MemoryStore) -> CacheUpdater {
        let transport = BundleTransport::new(&TransportConfig::default()).unwrap();
        let refresher = BundleRefresher::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            transport,
            BundleVerifier::new(),
        );
        CacheUpdater::new(Arc::new(store.clone()), refresher)
    }

    #[tokio::test]
    async fn non_positive_interval_is_never_refreshed() {
        let store = MemoryStore::new();
        let tmp = bundle_file("Gated");
        let url = format!("file://{}", tmp.path().display());
        store
            .insert(trustsync_core::TrustBundle::new("gated", url, 0))
            .await
            .unwrap();

        updater(&store).update_bundle_cache().await;

        let stored = store.find_by_name("gated").await.unwrap().unwrap();
        assert!(stored.last_refresh_attempt.is_none());
        assert_eq!(stored.last_refresh_error, RefreshOutcome::None);
    }

    #[tokio::test]
    async fn never_refreshed_bundle_refreshes_immediately() {
        let store = MemoryStore::new();
        let tmp = bundle_file("Fresh");
        let url = format!("file://{}", tmp.path().display());
        store
            .insert(trustsync_core::TrustBundle::new("fresh", url, 1000))
            .await
            .unwrap();

        updater(&store).update_bundle_cache().await;

        let stored = store.find_by_name("fresh").await.unwrap().unwrap();
        assert_eq!(stored.last_refresh_error, RefreshOutcome::Success);
        assert!(stored.last_successful_refresh.is_some());
    }

    #[tokio::test]
    async fn interval_gates_recent_success() {
        let store = MemoryStore::new();
        let tmp = bundle_file("Recent");
        let url = format!("file://{}", tmp.path().display());

        let mut recent = trustsync_core::TrustBundle::new("recent", url.clone(), 1000);
        recent.last_successful_refresh = Some(Utc::now() - Duration::seconds(1));
        let mut stale = trustsync_core::TrustBundle::new("stale", url, 1000);
        stale.last_successful_refresh = Some(Utc::now() - Duration::seconds(1200));

        store.insert(recent).await.unwrap();
        store.insert(stale).await.unwrap();

        updater(&store).update_bundle_cache().await;

        let recent = store.find_by_name("recent").await.unwrap().unwrap();
        assert!(recent.last_refresh_attempt.is_none());
        let stale = store.find_by_name("stale").await.unwrap().unwrap();
        assert!(stale.last_refresh_attempt.is_some());
        assert_eq!(stale.last_refresh_error, RefreshOutcome::Success);
    }

    #[tokio::test]
    async fn one_failing_bundle_does_not_block_the_rest() {
        let store = MemoryStore::new();
        let tmp = bundle_file("Healthy");
        let good_url = format!("file://{}", tmp.path().display());
        store
            .insert(trustsync_core::TrustBundle::new(
                "broken",
                "file:///nonexistent/trustsync/broken.p7b",
                60,
            ))
            .await
            .unwrap();
        store
            .insert(trustsync_core::TrustBundle::new("healthy", good_url, 60))
            .await
            .unwrap();

        updater(&store).update_bundle_cache().await;

        let broken = store.find_by_name("broken").await.unwrap().unwrap();
        assert_eq!(broken.last_refresh_error, RefreshOutcome::NotFound);

        let healthy = store.find_by_name("healthy").await.unwrap().unwrap();
        assert_eq!(healthy.last_refresh_error, RefreshOutcome::Success);
        let anchors = store.anchors_for(&healthy.id).await.unwrap();
        assert_eq!(anchors.len(), 1);
    }
}
