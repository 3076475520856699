//! In-memory store used by tests, fixtures, and the default daemon setup.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use trustsync_core::{BundleId, RefreshOutcome, Result, SyncError, TrustAnchor, TrustBundle};

use super::{AnchorStore, BundleStore};

/// Shared in-memory bundle + anchor store.
///
/// Anchor replacement swaps the whole vector under one write lock, so a
/// concurrent reader sees either the previous generation or the new one,
/// never a torn set.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    bundles: RwLock<HashMap<BundleId, TrustBundle>>,
    anchors: RwLock<HashMap<BundleId, Vec<TrustAnchor>>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BundleStore for MemoryStore {
    async fn list(&self) -> Result<Vec<TrustBundle>> {
        let bundles = self.inner.bundles.read().await;
        Ok(bundles.values().cloned().collect())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<TrustBundle>> {
        let bundles = self.inner.bundles.read().await;
        Ok(bundles.values().find(|b| b.bundle_name == name).cloned())
    }

    async fn insert(&self, bundle: TrustBundle) -> Result<()> {
        let mut bundles = self.inner.bundles.write().await;
        if bundles.values().any(|b| b.bundle_name == bundle.bundle_name) {
            return Err(SyncError::DuplicateName(bundle.bundle_name));
        }
        bundles.insert(bundle.id, bundle);
        Ok(())
    }

    async fn update_refresh_status(
        &self,
        id: &BundleId,
        attempt: DateTime<Utc>,
        outcome: RefreshOutcome,
    ) -> Result<()> {
        let mut bundles = self.inner.bundles.write().await;
        let bundle = bundles
            .get_mut(id)
            .ok_or_else(|| SyncError::Store(format!("no bundle with id {id}")))?;
        bundle.last_refresh_attempt = Some(attempt);
        bundle.last_refresh_error = outcome;
        Ok(())
    }

    async fn record_success(
        &self,
        id: &BundleId,
        attempt: DateTime<Utc>,
        checksum: Option<String>,
    ) -> Result<()> {
        let mut bundles = self.inner.bundles.write().await;
        let bundle = bundles
            .get_mut(id)
            .ok_or_else(|| SyncError::Store(format!("no bundle with id {id}")))?;
        bundle.last_refresh_attempt = Some(attempt);
        bundle.last_successful_refresh = Some(attempt);
        bundle.last_refresh_error = RefreshOutcome::Success;
        if let Some(checksum) = checksum {
            bundle.checksum = checksum;
        }
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<()> {
        let mut bundles = self.inner.bundles.write().await;
        let id = bundles
            .values()
            .find(|b| b.bundle_name == name)
            .map(|b| b.id)
            .ok_or_else(|| SyncError::Store(format!("no bundle named {name}")))?;
        bundles.remove(&id);
        drop(bundles);

        // Cascade the anchor rows.
        self.inner.anchors.write().await.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl AnchorStore for MemoryStore {
    async fn anchors_for(&self, bundle_id: &BundleId) -> Result<Vec<TrustAnchor>> {
        let anchors = self.inner.anchors.read().await;
        Ok(anchors.get(bundle_id).cloned().unwrap_or_default())
    }

    async fn replace_anchors(
        &self,
        bundle_id: &BundleId,
        anchors: Vec<TrustAnchor>,
    ) -> Result<()> {
        let mut map = self.inner.anchors.write().await;
        map.insert(*bundle_id, anchors);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn anchor(bundle_id: BundleId, n: u8) -> TrustAnchor {
        let now = Utc::now();
        TrustAnchor {
            id: Uuid::new_v4(),
            bundle_id,
            der: vec![n],
            thumbprint: format!("tp-{n}"),
            valid_from: now,
            valid_until: now + chrono::Duration::days(365),
        }
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_names() {
        let store = MemoryStore::new();
        store
            .insert(TrustBundle::new("providers", "file:///a", 60))
            .await
            .unwrap();
        let err = store
            .insert(TrustBundle::new("providers", "file:///b", 60))
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::DuplicateName(_)));
    }

    #[tokio::test]
    async fn delete_cascades_anchors() {
        let store = MemoryStore::new();
        let bundle = TrustBundle::new("providers", "file:///a", 60);
        let id = bundle.id;
        store.insert(bundle).await.unwrap();
        store
            .replace_anchors(&id, vec![anchor(id, 1), anchor(id, 2)])
            .await
            .unwrap();

        store.delete("providers").await.unwrap();
        assert!(store.find_by_name("providers").await.unwrap().is_none());
        assert!(store.anchors_for(&id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn record_success_without_checksum_keeps_old_checksum() {
        let store = MemoryStore::new();
        let mut bundle = TrustBundle::new("providers", "file:///a", 60);
        bundle.checksum = "old".into();
        let id = bundle.id;
        store.insert(bundle).await.unwrap();

        let now = Utc::now();
        store.record_success(&id, now, None).await.unwrap();

        let stored = store.find_by_name("providers").await.unwrap().unwrap();
        assert_eq!(stored.checksum, "old");
        assert_eq!(stored.last_refresh_error, RefreshOutcome::Success);
        assert_eq!(stored.last_successful_refresh, Some(now));
    }

    #[tokio::test]
    async fn replace_is_never_observed_partially() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();
        store
            .replace_anchors(&id, (0..50).map(|n| anchor(id, n)).collect())
            .await
            .unwrap();

        let reader = {
            let store = store.clone();
            tokio::spawn(async move {
                for _ in 0..200 {
                    let len = store.anchors_for(&id).await.unwrap().len();
                    assert!(len == 50 || len == 80, "torn anchor set: {len}");
                    tokio::task::yield_now().await;
                }
            })
        };

        for _ in 0..50 {
            store
                .replace_anchors(&id, (0..80).map(|n| anchor(id, n)).collect())
                .await
                .unwrap();
            store
                .replace_anchors(&id, (0..50).map(|n| anchor(id, n)).collect())
                .await
                .unwrap();
        }
        // Leave the larger generation in place for the reader's final laps.
        store
            .replace_anchors(&id, (0..80).map(|n| anchor(id, n)).collect())
            .await
            .unwrap();

        reader.await.unwrap();
    }
}
