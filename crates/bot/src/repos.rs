//! Database repositories (PostgreSQL).
//!
//! This module contains traits and implementations for database access.
//! Each repository is abstracted behind a trait to enable mocking in tests.
//!
//! ## Repositories
//!
//! - **profiles** - XP profile rows: lazy creation, atomic increments,
//!   ranking queries, and the moderator-facing field setters
//! - **events** - event-code rows: unique minting and the expiry purge
//! - **redemptions** - per-(code, user) redemption records; the composite
//!   primary key is the exactly-once guard
//!
//! ## Usage in Services
//!
//! Services hold `Arc<dyn ...Repo>` handles:
//!
//! ```ignore
//! let profile = self.profiles.find(user_id).await?;
//! let inserted = self.redemptions.insert(code, user_id).await?;
//! ```

mod events;
mod profiles;
mod redemptions;

pub use events::{EventRepo, PgEventRepo};
pub use profiles::{LeaderboardScope, PgProfileRepo, ProfileField, ProfileRepo};
pub use redemptions::{PgRedemptionRepo, RedemptionRepo};

#[cfg(test)]
pub use events::MockEventRepo;
#[cfg(test)]
pub use profiles::MockProfileRepo;
#[cfg(test)]
pub use redemptions::MockRedemptionRepo;
