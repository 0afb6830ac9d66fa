//! Event Code Registry: minting, resolution, and the expiry sweep.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::error::EngineError;
use crate::repos::EventRepo;

/// Codes are short enough to read out at an event.
pub const CODE_LENGTH: usize = 4;

const CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const MINT_ATTEMPTS: u32 = 3;

/// What a code lookup found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeStatus {
    /// Exists and redeemable; carries the per-redemption reward.
    Active { xp_amount: i64 },
    /// Exists but its expiry has passed.
    Expired,
    /// No such code.
    Unknown,
}

pub struct EventCodeRegistry {
    events: Arc<dyn EventRepo>,
}

impl EventCodeRegistry {
    pub fn new(events: Arc<dyn EventRepo>) -> Self {
        Self { events }
    }

    /// Mint a fresh code valid until `expiry_date` (epoch seconds).
    ///
    /// Uniqueness is enforced by the insert itself against every code ever
    /// issued, expired ones included. On collision a new code is drawn, up
    /// to `MINT_ATTEMPTS` times; if all attempts collide the code space is
    /// crowded and the operator should purge old events.
    pub async fn create_code(
        &self,
        expiry_date: i64,
        xp_amount: i64,
        now: DateTime<Utc>,
    ) -> Result<String, EngineError> {
        if expiry_date <= now.timestamp() {
            return Err(EngineError::InvalidExpiry);
        }
        if xp_amount <= 0 {
            return Err(EngineError::Validation(
                "XP reward must be a positive amount".to_string(),
            ));
        }

        for _ in 0..MINT_ATTEMPTS {
            let code = generate_code();
            if self.events.insert(&code, expiry_date, xp_amount).await? {
                return Ok(code);
            }
            tracing::debug!(code = %code, "minted code collided, retrying");
        }

        Err(EngineError::CodeSpaceExhausted {
            attempts: MINT_ATTEMPTS,
        })
    }

    /// Resolve a code at `now`. One SELECT; the expiry comparison happens
    /// on the fetched row, so lookup and expiry check cannot disagree.
    pub async fn resolve(&self, code: &str, now: DateTime<Utc>) -> Result<CodeStatus, EngineError> {
        let event = self.events.find(code).await?;
        Ok(match event {
            None => CodeStatus::Unknown,
            Some(event) if now.timestamp() < event.expiry_date => CodeStatus::Active {
                xp_amount: event.xp_amount,
            },
            Some(_) => CodeStatus::Expired,
        })
    }

    /// The reward if the code is currently redeemable, else None.
    pub async fn is_valid(
        &self,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<i64>, EngineError> {
        Ok(match self.resolve(code, now).await? {
            CodeStatus::Active { xp_amount } => Some(xp_amount),
            CodeStatus::Expired | CodeStatus::Unknown => None,
        })
    }

    /// Delete events past their expiry, cascading to redemption records.
    /// Returns the number of events removed.
    pub async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, EngineError> {
        Ok(self.events.purge_expired(now.timestamp()).await?)
    }
}

fn generate_code() -> String {
    let mut rng = rand::thread_rng();
    (0..CODE_LENGTH)
        .map(|_| CODE_CHARSET[rng.gen_range(0..CODE_CHARSET.len())] as char)
        .collect()
}
