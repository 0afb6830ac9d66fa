//! Experience Ledger: the sole mutator of profile exp counters.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use crate::error::EngineError;
use crate::level::{LevelCurve, LevelInfo};
use crate::models::{LeaderboardEntry, Profile};
use crate::repos::{LeaderboardScope, ProfileField, ProfileRepo};
use crate::stores::{CooldownStatus, CooldownTracker};

const MAL_PREFIX: &str = "https://myanimelist.net/profile/";
const ANILIST_PREFIX: &str = "https://anilist.co/user/";
const MAX_QUOTE_LEN: usize = 100;
const RESET_QUOTE: &str = "Hello!";

/// Grant tuning taken from `Config` at startup.
#[derive(Debug, Clone, Copy)]
pub struct GrantPolicy {
    /// Minimum spacing between passive grants for one user.
    pub cooldown: Duration,
    /// Inclusive range a passive grant amount is drawn from.
    pub grant_min: i64,
    pub grant_max: i64,
}

/// Result of a passive grant attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantOutcome {
    Granted { amount: i64, new_exp: i64 },
    OnCooldown { retry_after_secs: i64 },
}

/// A profile together with its derived progression and rank.
#[derive(Debug, Clone)]
pub struct ProfileSummary {
    pub profile: Profile,
    pub level: LevelInfo,
    pub rank: i64,
}

pub struct ExperienceLedger {
    profiles: Arc<dyn ProfileRepo>,
    cooldowns: Arc<dyn CooldownTracker>,
    curve: LevelCurve,
    policy: GrantPolicy,
}

impl ExperienceLedger {
    pub fn new(
        profiles: Arc<dyn ProfileRepo>,
        cooldowns: Arc<dyn CooldownTracker>,
        curve: LevelCurve,
        policy: GrantPolicy,
    ) -> Self {
        Self {
            profiles,
            cooldowns,
            curve,
            policy,
        }
    }

    pub fn curve(&self) -> &LevelCurve {
        &self.curve
    }

    /// Fetch a profile, lazily creating a zero-exp row on first contact.
    ///
    /// The insert is insert-or-ignore, so two concurrent first-time
    /// lookups leave exactly one row; the re-read after insertion avoids
    /// returning stale pre-insert state.
    pub async fn get_profile(&self, user_id: i64) -> Result<Profile, EngineError> {
        if let Some(profile) = self.profiles.find(user_id).await? {
            return Ok(profile);
        }

        self.profiles.insert_default(user_id).await?;

        let profile = self.profiles.find(user_id).await?;
        profile.ok_or_else(|| {
            EngineError::Backend(anyhow::anyhow!(
                "default profile for user {user_id} missing after insert"
            ))
        })
    }

    /// Passive grant path, driven by inbound chat messages.
    ///
    /// A no-op while the user is inside the cooldown window; otherwise
    /// draws an amount from the configured range and applies it as a
    /// single atomic increment.
    pub async fn grant_if_eligible(
        &self,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> Result<GrantOutcome, EngineError> {
        let status = self
            .cooldowns
            .check_and_touch(user_id, now, self.policy.cooldown)
            .await?;
        if let CooldownStatus::Throttled { retry_after_secs } = status {
            return Ok(GrantOutcome::OnCooldown { retry_after_secs });
        }

        self.get_profile(user_id).await?;

        let amount = {
            let mut rng = rand::thread_rng();
            rng.gen_range(self.policy.grant_min..=self.policy.grant_max)
        };
        let profile = self.credit_exp(user_id, amount).await?;

        Ok(GrantOutcome::Granted {
            amount,
            new_exp: profile.exp,
        })
    }

    /// Unconditional atomic credit, used by the redemption flow. The
    /// caller must have materialized the profile first.
    pub async fn credit_exp(&self, user_id: i64, amount: i64) -> Result<Profile, EngineError> {
        let profile = self.profiles.add_exp(user_id, amount).await?;
        profile.ok_or(EngineError::ProfileNotFound { user_id })
    }

    /// Dense rank and exp for one user, materializing the profile first
    /// so brand-new users rank at the bottom instead of erroring.
    pub async fn get_rank(&self, user_id: i64) -> Result<LeaderboardEntry, EngineError> {
        self.get_profile(user_id).await?;
        let entry = self.profiles.rank_of(user_id).await?;
        entry.ok_or(EngineError::ProfileNotFound { user_id })
    }

    /// Top `top_n` profiles by descending exp, densely ranked.
    pub async fn leaderboard(
        &self,
        top_n: i64,
        scope: LeaderboardScope,
    ) -> Result<Vec<LeaderboardEntry>, EngineError> {
        Ok(self.profiles.leaderboard(top_n, scope).await?)
    }

    /// Everything the profile view needs in one call.
    pub async fn profile_summary(&self, user_id: i64) -> Result<ProfileSummary, EngineError> {
        let profile = self.get_profile(user_id).await?;
        let rank = self.get_rank(user_id).await?.rank;
        let level = self.curve.level_info(profile.exp);

        Ok(ProfileSummary {
            profile,
            level,
            rank,
        })
    }

    /// Zero every profile's term counter (admin command).
    pub async fn reset_term(&self) -> Result<(), EngineError> {
        Ok(self.profiles.reset_term().await?)
    }

    pub async fn set_quote(&self, user_id: i64, quote: &str) -> Result<(), EngineError> {
        if quote.chars().count() > MAX_QUOTE_LEN {
            return Err(EngineError::Validation(format!(
                "Max quote length is {MAX_QUOTE_LEN} characters, provided quote is {} characters",
                quote.chars().count()
            )));
        }
        self.get_profile(user_id).await?;
        Ok(self.profiles.set_quote(user_id, quote).await?)
    }

    pub async fn set_mal_profile(&self, user_id: i64, username: &str) -> Result<(), EngineError> {
        self.get_profile(user_id).await?;
        let link = format!("{MAL_PREFIX}{username}");
        Ok(self.profiles.set_mal_profile(user_id, &link).await?)
    }

    pub async fn set_anilist_profile(
        &self,
        user_id: i64,
        username: &str,
    ) -> Result<(), EngineError> {
        self.get_profile(user_id).await?;
        let link = format!("{ANILIST_PREFIX}{username}");
        Ok(self.profiles.set_anilist_profile(user_id, &link).await?)
    }

    /// Moderator reset of display fields.
    pub async fn reset_fields(&self, user_id: i64, field: ProfileField) -> Result<(), EngineError> {
        self.get_profile(user_id).await?;

        if matches!(field, ProfileField::Quote | ProfileField::All) {
            self.profiles.set_quote(user_id, RESET_QUOTE).await?;
        }
        if matches!(field, ProfileField::MalProfile | ProfileField::All) {
            self.profiles.clear_mal_profile(user_id).await?;
        }
        if matches!(field, ProfileField::AnilistProfile | ProfileField::All) {
            self.profiles.clear_anilist_profile(user_id).await?;
        }
        Ok(())
    }
}
