use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: i64,
    /// Cumulative all-time experience. Only the ledger mutates this.
    pub exp: i64,
    /// Experience this term; zeroed by the term reset.
    pub term_exp: i64,
    pub background_image: String,
    pub quote: String,
    pub mal_profile: Option<String>,
    pub anilist_profile: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Event {
    pub event_code: String,
    /// Epoch seconds after which the code can no longer be redeemed.
    pub expiry_date: i64,
    pub xp_amount: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct EventParticipant {
    pub event_code: String,
    pub user_id: i64,
    pub redeemed_at: DateTime<Utc>,
}

/// One leaderboard row. `rank` is dense: ties share a rank and the next
/// distinct exp value gets the previous rank plus one.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub user_id: i64,
    pub exp: i64,
    pub rank: i64,
}
