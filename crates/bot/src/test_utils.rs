//! Shared test utilities.
//!
//! Mock factories for the repo/store traits, plus `FakeDb`, an in-memory
//! stand-in for the Postgres schema that reproduces its concurrency
//! semantics (insert-or-ignore, composite-key uniqueness, cascade delete,
//! dense ranking). Scenario tests run real services against it.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use crate::config::Config;
use crate::level::LevelCurve;
use crate::models::{Event, EventParticipant, LeaderboardEntry, Profile};
use crate::repos::{EventRepo, LeaderboardScope, ProfileRepo, RedemptionRepo};
use crate::state::AppState;
use crate::stores::InMemoryCooldownTracker;

/// Creates a test configuration with dummy values and a fixed grant of 20
/// so grant assertions are deterministic.
pub fn test_config() -> Config {
    Config {
        database_url: "postgres://test".to_string(),
        env: "test".to_string(),
        cooldown_seconds: 5,
        grant_min: 20,
        grant_max: 20,
        level_base: 100,
        first_increment: 55,
        increment_delta: 10,
        purge_interval_hours: 24,
    }
}

/// The standard 100/55/10 curve used throughout the tests.
pub fn test_curve() -> LevelCurve {
    LevelCurve::new(100, 55, 10)
}

/// Creates a profile row with the schema defaults and the given exp.
pub fn mock_profile(user_id: i64, exp: i64) -> Profile {
    Profile {
        user_id,
        exp,
        term_exp: exp,
        background_image: "uwu.png".to_string(),
        quote: "Right here! Right now! Emerge!".to_string(),
        mal_profile: None,
        anilist_profile: None,
        created_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
    }
}

/// Creates an event row.
pub fn mock_event(code: &str, expiry_date: i64, xp_amount: i64) -> Event {
    Event {
        event_code: code.to_string(),
        expiry_date,
        xp_amount,
        created_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
    }
}

/// Creates a redemption record.
pub fn mock_participant(code: &str, user_id: i64) -> EventParticipant {
    EventParticipant {
        event_code: code.to_string(),
        user_id,
        redeemed_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
    }
}

#[derive(Default)]
struct DbState {
    profiles: HashMap<i64, Profile>,
    events: HashMap<String, Event>,
    participants: HashSet<(String, i64)>,
}

/// In-memory fake of the whole schema. Clones share storage.
#[derive(Clone, Default)]
pub struct FakeDb {
    inner: Arc<Mutex<DbState>>,
}

impl FakeDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an event row directly, bypassing the registry's random mint.
    pub fn seed_event(&self, code: &str, expiry_date: i64, xp_amount: i64) {
        let mut db = self.inner.lock().unwrap();
        db.events
            .insert(code.to_string(), mock_event(code, expiry_date, xp_amount));
    }

    pub fn exp_of(&self, user_id: i64) -> Option<i64> {
        self.inner
            .lock()
            .unwrap()
            .profiles
            .get(&user_id)
            .map(|p| p.exp)
    }

    pub fn profile_count(&self) -> usize {
        self.inner.lock().unwrap().profiles.len()
    }

    pub fn has_participant(&self, code: &str, user_id: i64) -> bool {
        self.inner
            .lock()
            .unwrap()
            .participants
            .contains(&(code.to_string(), user_id))
    }
}

#[async_trait]
impl ProfileRepo for FakeDb {
    async fn find(&self, user_id: i64) -> Result<Option<Profile>> {
        Ok(self.inner.lock().unwrap().profiles.get(&user_id).cloned())
    }

    async fn insert_default(&self, user_id: i64) -> Result<()> {
        let mut db = self.inner.lock().unwrap();
        db.profiles
            .entry(user_id)
            .or_insert_with(|| mock_profile(user_id, 0));
        Ok(())
    }

    async fn add_exp(&self, user_id: i64, amount: i64) -> Result<Option<Profile>> {
        let mut db = self.inner.lock().unwrap();
        Ok(db.profiles.get_mut(&user_id).map(|profile| {
            profile.exp += amount;
            profile.term_exp += amount;
            profile.clone()
        }))
    }

    async fn rank_of(&self, user_id: i64) -> Result<Option<LeaderboardEntry>> {
        let db = self.inner.lock().unwrap();
        let Some(profile) = db.profiles.get(&user_id) else {
            return Ok(None);
        };

        let mut exps: Vec<i64> = db.profiles.values().map(|p| p.exp).collect();
        exps.sort_unstable_by(|a, b| b.cmp(a));
        exps.dedup();
        let rank = exps.iter().position(|&e| e == profile.exp).unwrap() as i64 + 1;

        Ok(Some(LeaderboardEntry {
            user_id,
            exp: profile.exp,
            rank,
        }))
    }

    async fn leaderboard(
        &self,
        limit: i64,
        scope: LeaderboardScope,
    ) -> Result<Vec<LeaderboardEntry>> {
        let db = self.inner.lock().unwrap();
        let exp_of = |p: &Profile| match scope {
            LeaderboardScope::AllTime => p.exp,
            LeaderboardScope::Term => p.term_exp,
        };

        let mut rows: Vec<(i64, i64)> = db.profiles.values().map(|p| (p.user_id, exp_of(p))).collect();
        rows.sort_unstable_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

        let mut exps: Vec<i64> = rows.iter().map(|&(_, exp)| exp).collect();
        exps.dedup();

        Ok(rows
            .into_iter()
            .take(limit as usize)
            .map(|(user_id, exp)| LeaderboardEntry {
                user_id,
                exp,
                rank: exps.iter().position(|&e| e == exp).unwrap() as i64 + 1,
            })
            .collect())
    }

    async fn reset_term(&self) -> Result<()> {
        let mut db = self.inner.lock().unwrap();
        for profile in db.profiles.values_mut() {
            profile.term_exp = 0;
        }
        Ok(())
    }

    async fn set_quote(&self, user_id: i64, quote: &str) -> Result<()> {
        let mut db = self.inner.lock().unwrap();
        if let Some(profile) = db.profiles.get_mut(&user_id) {
            profile.quote = quote.to_string();
        }
        Ok(())
    }

    async fn set_mal_profile(&self, user_id: i64, link: &str) -> Result<()> {
        let mut db = self.inner.lock().unwrap();
        if let Some(profile) = db.profiles.get_mut(&user_id) {
            profile.mal_profile = Some(link.to_string());
        }
        Ok(())
    }

    async fn clear_mal_profile(&self, user_id: i64) -> Result<()> {
        let mut db = self.inner.lock().unwrap();
        if let Some(profile) = db.profiles.get_mut(&user_id) {
            profile.mal_profile = None;
        }
        Ok(())
    }

    async fn set_anilist_profile(&self, user_id: i64, link: &str) -> Result<()> {
        let mut db = self.inner.lock().unwrap();
        if let Some(profile) = db.profiles.get_mut(&user_id) {
            profile.anilist_profile = Some(link.to_string());
        }
        Ok(())
    }

    async fn clear_anilist_profile(&self, user_id: i64) -> Result<()> {
        let mut db = self.inner.lock().unwrap();
        if let Some(profile) = db.profiles.get_mut(&user_id) {
            profile.anilist_profile = None;
        }
        Ok(())
    }
}

#[async_trait]
impl EventRepo for FakeDb {
    async fn insert(&self, code: &str, expiry_date: i64, xp_amount: i64) -> Result<bool> {
        let mut db = self.inner.lock().unwrap();
        if db.events.contains_key(code) {
            return Ok(false);
        }
        db.events
            .insert(code.to_string(), mock_event(code, expiry_date, xp_amount));
        Ok(true)
    }

    async fn find(&self, code: &str) -> Result<Option<Event>> {
        Ok(self.inner.lock().unwrap().events.get(code).cloned())
    }

    async fn purge_expired(&self, now: i64) -> Result<u64> {
        let mut db = self.inner.lock().unwrap();
        let doomed: Vec<String> = db
            .events
            .values()
            .filter(|e| e.expiry_date < now)
            .map(|e| e.event_code.clone())
            .collect();
        for code in &doomed {
            db.events.remove(code);
            db.participants.retain(|(c, _)| c != code);
        }
        Ok(doomed.len() as u64)
    }
}

#[async_trait]
impl RedemptionRepo for FakeDb {
    async fn insert(&self, code: &str, user_id: i64) -> Result<Option<EventParticipant>> {
        let mut db = self.inner.lock().unwrap();
        // HashSet::insert has exactly the composite-key semantics: the
        // second identical pair loses.
        if db.participants.insert((code.to_string(), user_id)) {
            Ok(Some(mock_participant(code, user_id)))
        } else {
            Ok(None)
        }
    }
}

/// Full application state wired onto one shared `FakeDb`, with the real
/// in-process cooldown tracker.
pub fn fake_state() -> (AppState, FakeDb) {
    let db = FakeDb::new();
    let state = AppState::new(
        test_config(),
        Arc::new(db.clone()),
        Arc::new(db.clone()),
        Arc::new(db.clone()),
        Arc::new(InMemoryCooldownTracker::new()),
    );
    (state, db)
}
