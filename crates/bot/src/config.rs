use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database_url: String,
    /// Set to "production" for JSON logging, anything else for human-readable.
    #[serde(default)]
    pub env: String,
    /// Minimum seconds between passive XP grants for the same user.
    #[serde(default = "default_cooldown_seconds")]
    pub cooldown_seconds: u64,
    /// Inclusive range a passive grant is drawn from.
    #[serde(default = "default_grant_min")]
    pub grant_min: i64,
    #[serde(default = "default_grant_max")]
    pub grant_max: i64,
    /// Level-curve coefficients (cumulative cost formula).
    #[serde(default = "default_level_base")]
    pub level_base: i64,
    #[serde(default = "default_first_increment")]
    pub first_increment: i64,
    #[serde(default = "default_increment_delta")]
    pub increment_delta: i64,
    /// How often the expired-event sweep runs.
    #[serde(default = "default_purge_interval_hours")]
    pub purge_interval_hours: u64,
}

fn default_cooldown_seconds() -> u64 {
    5
}

fn default_grant_min() -> i64 {
    15
}

fn default_grant_max() -> i64 {
    25
}

fn default_level_base() -> i64 {
    100
}

fn default_first_increment() -> i64 {
    55
}

fn default_increment_delta() -> i64 {
    10
}

fn default_purge_interval_hours() -> u64 {
    24
}

impl Config {
    pub fn is_production(&self) -> bool {
        self.env == "production"
    }
}
