//! Community bot core.
//!
//! The pieces with real state and invariants live here: the XP ledger and
//! its level curve, the event-code registry, and the exactly-once
//! redemption ledger. The chat-platform front-end, embed rendering, and
//! verification mail flow are external collaborators that drive this
//! crate through plain function calls on [`state::AppState`].

pub mod config;
pub mod error;
pub mod level;
pub mod models;
pub mod repos;
pub mod services;
pub mod state;
pub mod stores;
pub mod sweeper;

#[cfg(test)]
pub mod test_utils;
