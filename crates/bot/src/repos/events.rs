//! Event-code repository for PostgreSQL.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::models::Event;

/// Repository for event rows. Codes are unique over all time until
/// purged; the insert reports whether it won the key.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventRepo: Send + Sync {
    /// Insert a new event. Returns false if the code already exists
    /// (insert-or-ignore under the primary key, never an error).
    async fn insert(&self, code: &str, expiry_date: i64, xp_amount: i64) -> Result<bool>;

    /// Find an event by code.
    async fn find(&self, code: &str) -> Result<Option<Event>>;

    /// Delete every event whose expiry is strictly before `now` (epoch
    /// seconds). Redemption records cascade with their event. Returns the
    /// number of events removed.
    async fn purge_expired(&self, now: i64) -> Result<u64>;
}

/// PostgreSQL implementation of EventRepo.
#[derive(Clone)]
pub struct PgEventRepo {
    pool: Pool<Postgres>,
}

impl PgEventRepo {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventRepo for PgEventRepo {
    async fn insert(&self, code: &str, expiry_date: i64, xp_amount: i64) -> Result<bool> {
        let result = sqlx::query(
            "INSERT INTO events (event_code, expiry_date, xp_amount) VALUES ($1, $2, $3) \
             ON CONFLICT (event_code) DO NOTHING",
        )
        .bind(code)
        .bind(expiry_date)
        .bind(xp_amount)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn find(&self, code: &str) -> Result<Option<Event>> {
        let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE event_code = $1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;
        Ok(event)
    }

    async fn purge_expired(&self, now: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM events WHERE expiry_date < $1")
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
