//! Redemption Ledger: exactly-once code redemption tied to an XP credit.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::EngineError;
use crate::repos::RedemptionRepo;
use crate::services::ledger::ExperienceLedger;
use crate::services::registry::{CodeStatus, EventCodeRegistry};

/// Outcome of a redemption attempt. All four are expected results of
/// normal operation, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedeemOutcome {
    Redeemed { amount: i64, new_exp: i64 },
    AlreadyRedeemed,
    InvalidCode,
    Expired,
}

pub struct RedemptionService {
    registry: Arc<EventCodeRegistry>,
    redemptions: Arc<dyn RedemptionRepo>,
    ledger: Arc<ExperienceLedger>,
}

impl RedemptionService {
    pub fn new(
        registry: Arc<EventCodeRegistry>,
        redemptions: Arc<dyn RedemptionRepo>,
        ledger: Arc<ExperienceLedger>,
    ) -> Self {
        Self {
            registry,
            redemptions,
            ledger,
        }
    }

    /// Redeem `code` for `user_id` at `now`.
    ///
    /// The (code, user) insert under the composite key is the single
    /// arbiter of "first redemption wins": under concurrent attempts the
    /// storage constraint rejects the loser, which surfaces here as
    /// `AlreadyRedeemed`. Only the winning insert is followed by a credit.
    pub async fn redeem(
        &self,
        code: &str,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> Result<RedeemOutcome, EngineError> {
        // Codes are minted uppercase; accept lowercase input.
        let code = code.trim().to_uppercase();

        let xp_amount = match self.registry.resolve(&code, now).await? {
            CodeStatus::Unknown => return Ok(RedeemOutcome::InvalidCode),
            CodeStatus::Expired => return Ok(RedeemOutcome::Expired),
            CodeStatus::Active { xp_amount } => xp_amount,
        };

        // Materialize the profile up front so the credit after a winning
        // insert cannot fail on a missing row.
        self.ledger.get_profile(user_id).await?;

        if self.redemptions.insert(&code, user_id).await?.is_none() {
            return Ok(RedeemOutcome::AlreadyRedeemed);
        }

        match self.ledger.credit_exp(user_id, xp_amount).await {
            Ok(profile) => Ok(RedeemOutcome::Redeemed {
                amount: xp_amount,
                new_exp: profile.exp,
            }),
            Err(err) => {
                // The redemption row exists but the XP never landed. There
                // is no cross-table transaction here; record the
                // inconsistency loudly before propagating.
                tracing::error!(
                    code = %code,
                    user_id,
                    xp_amount,
                    "redemption recorded but credit failed: {err}"
                );
                Err(err)
            }
        }
    }
}
