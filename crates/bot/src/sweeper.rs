//! Recurring expiry sweep for event codes.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::MissedTickBehavior;

use crate::services::EventCodeRegistry;

/// Purge expired events once per `every`, starting immediately. Runs
/// until the task is dropped at shutdown; a failed sweep is logged and
/// retried at the next tick.
pub async fn run(registry: Arc<EventCodeRegistry>, every: Duration) {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        match registry.purge_expired(Utc::now()).await {
            Ok(0) => tracing::debug!("expiry sweep: nothing to purge"),
            Ok(purged) => tracing::info!(purged, "expiry sweep removed expired events"),
            Err(err) => err.report(),
        }
    }
}
