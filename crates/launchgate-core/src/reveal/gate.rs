//! Gate orchestration: which UI subtree is mounted, and how the site
//! unlocks.
//!
//! ## State Transitions
//!
//! ```text
//! Locked -> Unlocked
//! ```
//!
//! Locked renders the placeholder with the countdown; Unlocked mounts the
//! page router. The transition happens exactly once per persisted state,
//! driven by either the countdown expiry or the operator override, and
//! there is no re-lock path. The celebratory burst is edge-triggered on
//! the transition itself, never on a render.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::store::RevealStore;
use crate::celebrate::{CelebrationPreset, Hint};
use crate::countdown::{CountdownEngine, CountdownState, RemainingTime};
use crate::error::{StorageError, ValidationError};
use crate::events::{Event, RevealSource};
use crate::input::{KeyChord, KeyEvent};
use crate::router::{AuthCheck, PageRouter, Route, View};
use crate::storage::{Config, Database};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GateState {
    Locked,
    Unlocked,
}

/// Which subtree a renderer should mount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "subtree", rename_all = "snake_case")]
pub enum GateView {
    Placeholder {
        countdown: CountdownState,
        remaining: RemainingTime,
        final_seconds: bool,
    },
    Live { resolved: View },
}

/// The reveal gate: countdown engine plus reveal store plus input wiring.
#[derive(Debug)]
pub struct RevealGate {
    countdown: CountdownEngine,
    store: RevealStore,
    reveal_chord: KeyChord,
    celebrate_chord: KeyChord,
    celebration_enabled: bool,
    hint_visible_ms: i64,
    hint: Option<Hint>,
}

impl RevealGate {
    pub fn new(store: RevealStore, countdown: CountdownEngine, config: &Config) -> Self {
        let hint_visible_ms = i64::from(config.celebration.hint_seconds) * 1000;
        // A session that starts already revealed still shows the hint
        // for its window, matching the live-site banner on reload.
        let hint = if store.is_revealed() {
            Some(Hint::new(Utc::now()).with_visible_ms(hint_visible_ms))
        } else {
            None
        };
        Self {
            countdown,
            store,
            reveal_chord: config.reveal_chord(),
            celebrate_chord: config.celebrate_chord(),
            celebration_enabled: config.celebration.enabled,
            hint_visible_ms,
            hint,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> GateState {
        if self.store.is_revealed() {
            GateState::Unlocked
        } else {
            GateState::Locked
        }
    }

    pub fn countdown(&self) -> &CountdownEngine {
        &self.countdown
    }

    pub fn store(&self) -> &RevealStore {
        &self.store
    }

    pub fn hint_visible_at(&self, now: DateTime<Utc>) -> bool {
        self.hint.map(|h| h.is_visible_at(now)).unwrap_or(false)
    }

    /// Register a transition observer on the underlying store.
    pub fn subscribe(&mut self, subscriber: impl Fn(&Event) + Send + 'static) {
        self.store.subscribe(subscriber);
    }

    pub fn snapshot(&self) -> Event {
        self.snapshot_at(Utc::now())
    }

    pub fn snapshot_at(&self, now: DateTime<Utc>) -> Event {
        Event::GateSnapshot {
            gate: self.state(),
            countdown: self.countdown.state(),
            remaining_ms: self.countdown.remaining_ms_at(now),
            final_seconds: self.countdown.in_final_seconds_at(now),
            revealed: self.store.is_revealed(),
            registration_open: self.store.is_registration_open(),
            at: now,
        }
    }

    /// Resolve what to mount for `route`. While locked every route shows
    /// the placeholder; the router only exists behind an unlocked gate.
    pub fn view(&self, route: Route, auth: &dyn AuthCheck) -> GateView {
        self.view_at(Utc::now(), route, auth)
    }

    pub fn view_at(&self, now: DateTime<Utc>, route: Route, auth: &dyn AuthCheck) -> GateView {
        match self.state() {
            GateState::Locked => GateView::Placeholder {
                countdown: self.countdown.state(),
                remaining: self.countdown.remaining_at(now),
                final_seconds: self.countdown.in_final_seconds_at(now),
            },
            GateState::Unlocked => GateView::Live {
                resolved: PageRouter::resolve(route, self.store.state(), auth),
            },
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start a countdown toward the reveal. Returns `Ok(None)` when the
    /// site is already live (nothing to count down to).
    pub fn start_countdown(
        &mut self,
        duration: chrono::Duration,
    ) -> Result<Option<Event>, ValidationError> {
        self.start_countdown_at(Utc::now(), duration)
    }

    pub fn start_countdown_at(
        &mut self,
        now: DateTime<Utc>,
        duration: chrono::Duration,
    ) -> Result<Option<Event>, ValidationError> {
        if self.state() == GateState::Unlocked {
            return Ok(None);
        }
        self.countdown.start_at(now, duration).map(Some)
    }

    pub fn cancel_countdown(&mut self) -> Option<Event> {
        self.countdown.cancel()
    }

    /// Advance the countdown. On expiry this performs the reveal
    /// transition and returns every event it produced, in order.
    pub fn tick(&mut self, db: &Database) -> Result<Vec<Event>, StorageError> {
        self.tick_at(Utc::now(), db)
    }

    pub fn tick_at(
        &mut self,
        now: DateTime<Utc>,
        db: &Database,
    ) -> Result<Vec<Event>, StorageError> {
        let mut events = Vec::new();
        if let Some(expired) = self.countdown.tick_at(now) {
            events.push(expired);
            events.extend(self.reveal_at(now, db, RevealSource::Expiry)?);
        }
        Ok(events)
    }

    /// Operator override: the same transition as expiry, bypassing the
    /// countdown.
    pub fn reveal_override(&mut self, db: &Database) -> Result<Vec<Event>, StorageError> {
        self.reveal_override_at(Utc::now(), db)
    }

    pub fn reveal_override_at(
        &mut self,
        now: DateTime<Utc>,
        db: &Database,
    ) -> Result<Vec<Event>, StorageError> {
        let mut events = Vec::new();
        // A countdown racing toward the same transition is cancelled so
        // its deadline can't fire afterwards.
        events.extend(self.countdown.cancel_at(now));
        events.extend(self.reveal_at(now, db, RevealSource::Override)?);
        Ok(events)
    }

    /// Route a key press. The override chord only works while locked,
    /// the decorative key only while unlocked; anything else is ignored.
    pub fn handle_key(
        &mut self,
        db: &Database,
        key: &KeyEvent,
    ) -> Result<Vec<Event>, StorageError> {
        self.handle_key_at(Utc::now(), db, key)
    }

    pub fn handle_key_at(
        &mut self,
        now: DateTime<Utc>,
        db: &Database,
        key: &KeyEvent,
    ) -> Result<Vec<Event>, StorageError> {
        match self.state() {
            GateState::Locked if self.reveal_chord.matches(key) => {
                self.reveal_override_at(now, db)
            }
            GateState::Unlocked if self.celebrate_chord.matches(key) => {
                Ok(self.celebrate_at(now).into_iter().collect())
            }
            _ => Ok(Vec::new()),
        }
    }

    /// Fire a decorative burst. No state mutation; only while unlocked.
    pub fn celebrate(&self) -> Option<Event> {
        self.celebrate_at(Utc::now())
    }

    pub fn celebrate_at(&self, now: DateTime<Utc>) -> Option<Event> {
        if self.state() != GateState::Unlocked || !self.celebration_enabled {
            return None;
        }
        let spec = CelebrationPreset::Ambient.spec();
        Some(Event::CelebrationFired {
            preset: CelebrationPreset::Ambient,
            particle_count: spec.particle_count,
            at: now,
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// The one Locked -> Unlocked transition. Persists, starts the hint
    /// window, and emits the edge-triggered celebration.
    fn reveal_at(
        &mut self,
        now: DateTime<Utc>,
        db: &Database,
        source: RevealSource,
    ) -> Result<Vec<Event>, StorageError> {
        let mut events = Vec::new();
        if let Some(revealed) = self.store.reveal(db, source)? {
            self.hint = Some(Hint::new(now).with_visible_ms(self.hint_visible_ms));
            events.push(revealed);
            if self.celebration_enabled {
                let spec = CelebrationPreset::Inauguration.spec();
                events.push(Event::CelebrationFired {
                    preset: CelebrationPreset::Inauguration,
                    particle_count: spec.particle_count,
                    at: now,
                });
            }
        }
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reveal::{KEY_REGISTRATION_OPEN, KEY_SITE_REVEALED};
    use crate::router::StaticAuth;
    use chrono::Duration;

    fn t0() -> DateTime<Utc> {
        "2026-03-01T18:00:00Z".parse().unwrap()
    }

    fn locked_gate(db: &Database) -> RevealGate {
        let store = RevealStore::load(db).unwrap();
        RevealGate::new(store, CountdownEngine::new(), &Config::default())
    }

    fn count_celebrations(events: &[Event]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, Event::CelebrationFired { .. }))
            .count()
    }

    #[test]
    fn starts_locked_with_placeholder() {
        let db = Database::open_memory().unwrap();
        let gate = locked_gate(&db);
        assert_eq!(gate.state(), GateState::Locked);
        let view = gate.view_at(t0(), Route::Home, &StaticAuth(false));
        assert!(matches!(view, GateView::Placeholder { .. }));
    }

    #[test]
    fn end_to_end_ten_second_countdown() {
        let db = Database::open_memory().unwrap();
        let mut gate = locked_gate(&db);

        let started = gate
            .start_countdown_at(t0(), Duration::seconds(10))
            .unwrap();
        assert!(matches!(started, Some(Event::CountdownStarted { .. })));

        // Mid-flight ticks do nothing.
        assert!(gate.tick_at(t0() + Duration::seconds(5), &db).unwrap().is_empty());

        // At exactly t+10s the whole chain fires once.
        let events = gate.tick_at(t0() + Duration::seconds(10), &db).unwrap();
        assert!(matches!(events[0], Event::CountdownExpired { .. }));
        assert!(matches!(
            events[1],
            Event::SiteRevealed {
                source: RevealSource::Expiry,
                ..
            }
        ));
        assert_eq!(count_celebrations(&events), 1);
        assert_eq!(gate.state(), GateState::Unlocked);

        // A duplicate tick shortly after is a no-op: no second reveal,
        // no second celebration.
        let dup = gate
            .tick_at(t0() + Duration::milliseconds(10_100), &db)
            .unwrap();
        assert!(dup.is_empty());

        // Both flags persisted as the literal string "true".
        assert_eq!(db.kv_get(KEY_SITE_REVEALED).unwrap().as_deref(), Some("true"));
        assert_eq!(
            db.kv_get(KEY_REGISTRATION_OPEN).unwrap().as_deref(),
            Some("true")
        );
    }

    #[test]
    fn override_chord_reveals_while_locked() {
        let db = Database::open_memory().unwrap();
        let mut gate = locked_gate(&db);
        let chord = KeyEvent::plain("i").ctrl().alt();

        let events = gate.handle_key_at(t0(), &db, &chord).unwrap();
        assert!(matches!(
            events[0],
            Event::SiteRevealed {
                source: RevealSource::Override,
                ..
            }
        ));
        assert_eq!(count_celebrations(&events), 1);
        assert_eq!(gate.state(), GateState::Unlocked);

        // The chord is dead once unlocked.
        let again = gate.handle_key_at(t0() + Duration::seconds(1), &db, &chord).unwrap();
        assert!(again.is_empty());
    }

    #[test]
    fn override_cancels_a_running_countdown() {
        let db = Database::open_memory().unwrap();
        let mut gate = locked_gate(&db);
        gate.start_countdown_at(t0(), Duration::minutes(15)).unwrap();

        let events = gate.reveal_override_at(t0() + Duration::seconds(30), &db).unwrap();
        assert!(matches!(events[0], Event::CountdownCancelled { .. }));
        assert!(matches!(events[1], Event::SiteRevealed { .. }));

        // The old deadline never fires.
        let later = gate.tick_at(t0() + Duration::minutes(20), &db).unwrap();
        assert!(later.is_empty());
    }

    #[test]
    fn decorative_key_only_works_unlocked_and_mutates_nothing() {
        let db = Database::open_memory().unwrap();
        let mut gate = locked_gate(&db);
        let space = KeyEvent::plain(" ");

        // Locked: ignored.
        assert!(gate.handle_key_at(t0(), &db, &space).unwrap().is_empty());

        gate.reveal_override_at(t0(), &db).unwrap();
        let before = serde_json::to_string(&gate.snapshot_at(t0() + Duration::seconds(2))).unwrap();

        let events = gate
            .handle_key_at(t0() + Duration::seconds(2), &db, &space)
            .unwrap();
        assert_eq!(count_celebrations(&events), 1);
        assert!(matches!(
            events[0],
            Event::CelebrationFired {
                preset: CelebrationPreset::Ambient,
                particle_count: 200,
                ..
            }
        ));

        let after = serde_json::to_string(&gate.snapshot_at(t0() + Duration::seconds(2))).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn no_countdown_once_unlocked() {
        let db = Database::open_memory().unwrap();
        let mut gate = locked_gate(&db);
        gate.reveal_override_at(t0(), &db).unwrap();
        let started = gate
            .start_countdown_at(t0() + Duration::seconds(1), Duration::seconds(10))
            .unwrap();
        assert!(started.is_none());
        assert_eq!(gate.countdown().state(), CountdownState::Idle);
    }

    #[test]
    fn invalid_duration_surfaces_and_gate_stays_put() {
        let db = Database::open_memory().unwrap();
        let mut gate = locked_gate(&db);
        let err = gate
            .start_countdown_at(t0(), Duration::seconds(0))
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidDuration(_)));
        assert_eq!(gate.state(), GateState::Locked);
        assert_eq!(gate.countdown().state(), CountdownState::Idle);
    }

    #[test]
    fn celebration_can_be_disabled() {
        let db = Database::open_memory().unwrap();
        let store = RevealStore::load(&db).unwrap();
        let mut config = Config::default();
        config.celebration.enabled = false;
        let mut gate = RevealGate::new(store, CountdownEngine::new(), &config);

        let events = gate.reveal_override_at(t0(), &db).unwrap();
        assert_eq!(count_celebrations(&events), 0);
        assert!(gate.celebrate_at(t0() + Duration::seconds(1)).is_none());
        // The reveal itself still happened.
        assert_eq!(gate.state(), GateState::Unlocked);
    }

    #[test]
    fn hint_window_follows_the_transition() {
        let db = Database::open_memory().unwrap();
        let mut gate = locked_gate(&db);
        assert!(!gate.hint_visible_at(t0()));

        gate.start_countdown_at(t0(), Duration::seconds(10)).unwrap();
        gate.tick_at(t0() + Duration::seconds(10), &db).unwrap();

        let expired_at = t0() + Duration::seconds(10);
        assert!(gate.hint_visible_at(expired_at + Duration::seconds(9)));
        assert!(!gate.hint_visible_at(expired_at + Duration::seconds(10)));
    }

    #[test]
    fn unlocked_gate_mounts_the_router() {
        let db = Database::open_memory().unwrap();
        let mut gate = locked_gate(&db);
        gate.reveal_override_at(t0(), &db).unwrap();

        let view = gate.view_at(t0(), Route::Register, &StaticAuth(false));
        assert_eq!(
            view,
            GateView::Live {
                resolved: View::RegistrationForm
            }
        );

        let admin = gate.view_at(t0(), Route::Admin, &StaticAuth(false));
        assert_eq!(
            admin,
            GateView::Live {
                resolved: View::Redirect { to: Route::Login }
            }
        );
    }
}
