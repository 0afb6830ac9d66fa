//! Core services.
//!
//! - **ledger** - the Experience Ledger: cooldown-gated passive grants,
//!   unconditional credits, ranking queries, and the moderator setters
//! - **registry** - the Event Code Registry: unique code minting, code
//!   resolution, and the expiry purge
//! - **redemption** - the Redemption Ledger: exactly-once redemption per
//!   (code, user) tied to an experience credit

mod ledger;
mod redemption;
mod registry;

pub use ledger::{ExperienceLedger, GrantOutcome, GrantPolicy, ProfileSummary};
pub use redemption::{RedeemOutcome, RedemptionService};
pub use registry::{CodeStatus, EventCodeRegistry, CODE_LENGTH};
