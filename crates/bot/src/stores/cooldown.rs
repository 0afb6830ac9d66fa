//! In-memory last-grant tracking for the passive XP cooldown.
//!
//! Held per process, not shared across instances: with multiple processes
//! behind one bot identity the cooldown is enforced per process. That is
//! an accepted limitation of this store, not something it tries to fix.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;

/// Result of a cooldown check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownStatus {
    /// The grant may proceed; the last-grant time was advanced to `now`.
    Ready,
    /// Inside the window; nothing was recorded.
    Throttled { retry_after_secs: i64 },
}

impl CooldownStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, CooldownStatus::Ready)
    }
}

/// Tracker for per-user grant cooldowns.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CooldownTracker: Send + Sync {
    /// Check whether `user_id` is past the cooldown window at `now`.
    /// The check and the last-grant update are one atomic step, so two
    /// interleaved calls inside the window admit exactly one grant.
    async fn check_and_touch(
        &self,
        user_id: i64,
        now: DateTime<Utc>,
        window: Duration,
    ) -> Result<CooldownStatus>;
}

/// In-process implementation of CooldownTracker.
#[derive(Default)]
pub struct InMemoryCooldownTracker {
    last_grant: Mutex<HashMap<i64, DateTime<Utc>>>,
}

impl InMemoryCooldownTracker {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CooldownTracker for InMemoryCooldownTracker {
    async fn check_and_touch(
        &self,
        user_id: i64,
        now: DateTime<Utc>,
        window: Duration,
    ) -> Result<CooldownStatus> {
        let mut last_grant = self.last_grant.lock().await;

        if let Some(last) = last_grant.get(&user_id) {
            let elapsed = now - *last;
            if elapsed < window {
                let retry_after_secs = (window - elapsed).num_seconds().max(1);
                return Ok(CooldownStatus::Throttled { retry_after_secs });
            }
        }

        last_grant.insert(user_id, now);
        Ok(CooldownStatus::Ready)
    }
}
