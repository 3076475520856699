//! Periodic refresh driver.

use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::info;

use crate::coordinator::CacheUpdater;

/// Drive cache-update cycles on a fixed period until the task is dropped.
///
/// The first cycle runs immediately. A cycle that overruns the period does
/// not pile up ticks behind it; the next cycle starts a full period after
/// the late one finished.
pub async fn run(updater: CacheUpdater, period: Duration) {
    info!(period_secs = period.as_secs(), "bundle refresh scheduler started");

    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        updater.update_bundle_cache().await;
    }
}
