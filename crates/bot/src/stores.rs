//! Process-local stores.
//!
//! Unlike `repos`, nothing here is persisted: the cooldown map is advisory
//! rate-limiting that may legitimately be lost on restart. Stores are still
//! trait-backed so services can be tested against mocks.

mod cooldown;

pub use cooldown::{CooldownStatus, CooldownTracker, InMemoryCooldownTracker};

#[cfg(test)]
pub use cooldown::MockCooldownTracker;
