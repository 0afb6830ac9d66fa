//! Profile repository for PostgreSQL.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::models::{LeaderboardEntry, Profile};

/// Which exp counter a leaderboard ranks by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaderboardScope {
    AllTime,
    Term,
}

/// Display fields a moderator can reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    Quote,
    MalProfile,
    AnilistProfile,
    All,
}

/// Repository for profile rows. The ledger is the only mutator of the
/// exp counters.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileRepo: Send + Sync {
    /// Find a profile by user id.
    async fn find(&self, user_id: i64) -> Result<Option<Profile>>;

    /// Insert a default (zero-exp) profile. A no-op if the row already
    /// exists, so concurrent first-time lookups cannot fail on the key.
    async fn insert_default(&self, user_id: i64) -> Result<()>;

    /// Atomically add `amount` to both exp counters as a single UPDATE,
    /// returning the updated row, or None if the profile does not exist.
    async fn add_exp(&self, user_id: i64, amount: i64) -> Result<Option<Profile>>;

    /// Dense rank and exp for one user, or None if no profile exists.
    async fn rank_of(&self, user_id: i64) -> Result<Option<LeaderboardEntry>>;

    /// Top `limit` profiles by descending exp, densely ranked.
    async fn leaderboard(&self, limit: i64, scope: LeaderboardScope)
        -> Result<Vec<LeaderboardEntry>>;

    /// Zero every profile's term counter.
    async fn reset_term(&self) -> Result<()>;

    /// Overwrite the quote.
    async fn set_quote(&self, user_id: i64, quote: &str) -> Result<()>;

    /// Overwrite the MAL profile link.
    async fn set_mal_profile(&self, user_id: i64, link: &str) -> Result<()>;

    /// Clear the MAL profile link.
    async fn clear_mal_profile(&self, user_id: i64) -> Result<()>;

    /// Overwrite the AniList profile link.
    async fn set_anilist_profile(&self, user_id: i64, link: &str) -> Result<()>;

    /// Clear the AniList profile link.
    async fn clear_anilist_profile(&self, user_id: i64) -> Result<()>;
}

/// PostgreSQL implementation of ProfileRepo.
#[derive(Clone)]
pub struct PgProfileRepo {
    pool: Pool<Postgres>,
}

impl PgProfileRepo {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileRepo for PgProfileRepo {
    async fn find(&self, user_id: i64) -> Result<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(profile)
    }

    async fn insert_default(&self, user_id: i64) -> Result<()> {
        sqlx::query("INSERT INTO profiles (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn add_exp(&self, user_id: i64, amount: i64) -> Result<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(
            "UPDATE profiles SET exp = exp + $2, term_exp = term_exp + $2 \
             WHERE user_id = $1 RETURNING *",
        )
        .bind(user_id)
        .bind(amount)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    async fn rank_of(&self, user_id: i64) -> Result<Option<LeaderboardEntry>> {
        let entry = sqlx::query_as::<_, LeaderboardEntry>(
            "SELECT user_id, exp, rank FROM ( \
                 SELECT user_id, exp, DENSE_RANK() OVER (ORDER BY exp DESC) AS rank \
                 FROM profiles \
             ) ranked WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(entry)
    }

    async fn leaderboard(
        &self,
        limit: i64,
        scope: LeaderboardScope,
    ) -> Result<Vec<LeaderboardEntry>> {
        let query = match scope {
            LeaderboardScope::AllTime => {
                "SELECT user_id, exp, DENSE_RANK() OVER (ORDER BY exp DESC) AS rank \
                 FROM profiles ORDER BY exp DESC, user_id LIMIT $1"
            }
            LeaderboardScope::Term => {
                "SELECT user_id, term_exp AS exp, \
                        DENSE_RANK() OVER (ORDER BY term_exp DESC) AS rank \
                 FROM profiles ORDER BY term_exp DESC, user_id LIMIT $1"
            }
        };

        let entries = sqlx::query_as::<_, LeaderboardEntry>(query)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(entries)
    }

    async fn reset_term(&self) -> Result<()> {
        sqlx::query("UPDATE profiles SET term_exp = 0")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_quote(&self, user_id: i64, quote: &str) -> Result<()> {
        sqlx::query("UPDATE profiles SET quote = $2 WHERE user_id = $1")
            .bind(user_id)
            .bind(quote)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_mal_profile(&self, user_id: i64, link: &str) -> Result<()> {
        sqlx::query("UPDATE profiles SET mal_profile = $2 WHERE user_id = $1")
            .bind(user_id)
            .bind(link)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn clear_mal_profile(&self, user_id: i64) -> Result<()> {
        sqlx::query("UPDATE profiles SET mal_profile = NULL WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_anilist_profile(&self, user_id: i64, link: &str) -> Result<()> {
        sqlx::query("UPDATE profiles SET anilist_profile = $2 WHERE user_id = $1")
            .bind(user_id)
            .bind(link)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn clear_anilist_profile(&self, user_id: i64) -> Result<()> {
        sqlx::query("UPDATE profiles SET anilist_profile = NULL WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
