//! Shared application state: every service the command front-end calls.

use std::sync::Arc;

use chrono::Duration;

use crate::config::Config;
use crate::level::LevelCurve;
use crate::repos::{EventRepo, ProfileRepo, RedemptionRepo};
use crate::services::{EventCodeRegistry, ExperienceLedger, GrantPolicy, RedemptionService};
use crate::stores::CooldownTracker;

#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Experience Ledger: grants, credits, ranking.
    pub ledger: Arc<ExperienceLedger>,
    /// Event Code Registry: minting and the expiry sweep.
    pub registry: Arc<EventCodeRegistry>,
    /// Redemption Ledger: exactly-once code redemption.
    pub redemptions: Arc<RedemptionService>,
}

impl AppState {
    pub fn new(
        config: Config,
        profiles: Arc<dyn ProfileRepo>,
        events: Arc<dyn EventRepo>,
        redemptions: Arc<dyn RedemptionRepo>,
        cooldowns: Arc<dyn CooldownTracker>,
    ) -> Self {
        let curve = LevelCurve::new(
            config.level_base,
            config.first_increment,
            config.increment_delta,
        );
        let policy = GrantPolicy {
            cooldown: Duration::seconds(config.cooldown_seconds as i64),
            grant_min: config.grant_min,
            grant_max: config.grant_max,
        };

        let ledger = Arc::new(ExperienceLedger::new(profiles, cooldowns, curve, policy));
        let registry = Arc::new(EventCodeRegistry::new(events));
        let redemptions = Arc::new(RedemptionService::new(
            registry.clone(),
            redemptions,
            ledger.clone(),
        ));

        Self {
            config,
            ledger,
            registry,
            redemptions,
        }
    }
}
