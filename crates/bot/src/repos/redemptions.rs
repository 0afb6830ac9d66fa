//! Redemption-record repository for PostgreSQL.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::models::EventParticipant;

/// Repository for (event_code, user_id) redemption records.
///
/// The composite primary key is the single point of truth for "first
/// redemption wins": under concurrent attempts the database rejects the
/// loser, no in-process check is involved.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RedemptionRepo: Send + Sync {
    /// Record a redemption. Returns the created record, or None if the
    /// (code, user) pair had already redeemed.
    async fn insert(&self, code: &str, user_id: i64) -> Result<Option<EventParticipant>>;
}

/// PostgreSQL implementation of RedemptionRepo.
#[derive(Clone)]
pub struct PgRedemptionRepo {
    pool: Pool<Postgres>,
}

impl PgRedemptionRepo {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RedemptionRepo for PgRedemptionRepo {
    async fn insert(&self, code: &str, user_id: i64) -> Result<Option<EventParticipant>> {
        // RETURNING yields a row only when this statement won the key.
        let participant = sqlx::query_as::<_, EventParticipant>(
            "INSERT INTO event_participants (event_code, user_id) VALUES ($1, $2) \
             ON CONFLICT (event_code, user_id) DO NOTHING RETURNING *",
        )
        .bind(code)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(participant)
    }
}
