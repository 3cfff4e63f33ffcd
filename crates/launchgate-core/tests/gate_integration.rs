//! Integration tests for the full reveal flow.
//!
//! These tests drive the gate the way a UI session would: against an
//! on-disk database, across simulated reloads, through both reveal entry
//! points.

use chrono::{DateTime, Duration, Utc};
use launchgate_core::reveal::{KEY_REGISTRATION_OPEN, KEY_SITE_REVEALED};
use launchgate_core::{
    Config, CountdownEngine, Database, Event, GateState, GateView, KeyEvent, RevealGate,
    RevealSource, RevealStore, Route, StaticAuth, View,
};

fn t0() -> DateTime<Utc> {
    "2026-03-14T09:00:00Z".parse().unwrap()
}

fn open_gate(db: &Database) -> RevealGate {
    let store = RevealStore::load(db).unwrap();
    RevealGate::new(store, CountdownEngine::new(), &Config::default())
}

#[test]
fn countdown_expiry_survives_a_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("launchgate.db");

    // First session: run a 10-second countdown to expiry.
    {
        let db = Database::open_at(&path).unwrap();
        let mut gate = open_gate(&db);
        assert_eq!(gate.state(), GateState::Locked);

        gate.start_countdown_at(t0(), Duration::seconds(10)).unwrap();
        let events = gate.tick_at(t0() + Duration::seconds(10), &db).unwrap();
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::SiteRevealed { source: RevealSource::Expiry, .. })));
        assert_eq!(gate.state(), GateState::Unlocked);
    }

    // Second session: no countdown ever started, state comes from disk.
    {
        let db = Database::open_at(&path).unwrap();
        let gate = open_gate(&db);
        assert_eq!(gate.state(), GateState::Unlocked);
        assert!(gate.store().is_registration_open());
    }
}

#[test]
fn second_session_sees_flags_written_by_hand() {
    // Equivalent of another tab writing storage: the new session picks the
    // flags up on load, with no transition events of its own.
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("launchgate.db");

    let db = Database::open_at(&path).unwrap();
    db.kv_set(KEY_SITE_REVEALED, "true").unwrap();
    db.kv_set(KEY_REGISTRATION_OPEN, "true").unwrap();

    let gate = open_gate(&db);
    assert_eq!(gate.state(), GateState::Unlocked);
}

#[test]
fn malformed_flags_keep_the_gate_locked() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("launchgate.db");

    let db = Database::open_at(&path).unwrap();
    db.kv_set(KEY_SITE_REVEALED, "yes").unwrap();
    db.kv_set(KEY_REGISTRATION_OPEN, "1").unwrap();

    let gate = open_gate(&db);
    assert_eq!(gate.state(), GateState::Locked);
    let view = gate.view_at(t0(), Route::Home, &StaticAuth(false));
    assert!(matches!(view, GateView::Placeholder { .. }));
}

#[test]
fn both_entry_points_land_in_the_same_state() {
    let dir = tempfile::tempdir().unwrap();

    // Path A: countdown expiry.
    let db_a = Database::open_at(&dir.path().join("a.db")).unwrap();
    let mut gate_a = open_gate(&db_a);
    gate_a.start_countdown_at(t0(), Duration::seconds(5)).unwrap();
    gate_a.tick_at(t0() + Duration::seconds(5), &db_a).unwrap();

    // Path B: operator chord.
    let db_b = Database::open_at(&dir.path().join("b.db")).unwrap();
    let mut gate_b = open_gate(&db_b);
    gate_b
        .handle_key_at(t0(), &db_b, &KeyEvent::plain("i").ctrl().alt())
        .unwrap();

    for db in [&db_a, &db_b] {
        assert_eq!(db.kv_get(KEY_SITE_REVEALED).unwrap().as_deref(), Some("true"));
        assert_eq!(
            db.kv_get(KEY_REGISTRATION_OPEN).unwrap().as_deref(),
            Some("true")
        );
    }
    assert_eq!(gate_a.state(), gate_b.state());
}

#[test]
fn live_site_routes_after_reveal() {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open_at(&dir.path().join("launchgate.db")).unwrap();
    let mut gate = open_gate(&db);
    gate.reveal_override_at(t0(), &db).unwrap();

    let home = gate.view_at(t0(), Route::Home, &StaticAuth(false));
    assert!(matches!(home, GateView::Live { resolved: View::Landing { .. } }));

    let register = gate.view_at(t0(), Route::Register, &StaticAuth(false));
    assert_eq!(
        register,
        GateView::Live {
            resolved: View::RegistrationForm
        }
    );

    let admin = gate.view_at(t0(), Route::Admin, &StaticAuth(true));
    assert_eq!(admin, GateView::Live { resolved: View::Admin });
}
