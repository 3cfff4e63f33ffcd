pub mod config;
pub mod countdown;
pub mod gate;
pub mod history;

use launchgate_core::storage::{CountdownOutcome, CountdownRecord};
use launchgate_core::{Config, CountdownEngine, Database, RevealGate, RevealStore};

const ENGINE_KEY: &str = "countdown_engine";

/// Restore the persisted countdown engine, or start fresh. A snapshot
/// that no longer parses is discarded rather than reported.
fn load_engine(db: &Database, config: &Config) -> CountdownEngine {
    if let Ok(Some(json)) = db.kv_get(ENGINE_KEY) {
        if let Ok(engine) = serde_json::from_str::<CountdownEngine>(&json) {
            return engine;
        }
    }
    CountdownEngine::new().with_highlight_secs(config.countdown.highlight_seconds)
}

fn save_engine(db: &Database, engine: &CountdownEngine) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string(engine)?;
    db.kv_set(ENGINE_KEY, &json)?;
    Ok(())
}

fn load_gate(db: &Database, config: &Config) -> Result<RevealGate, Box<dyn std::error::Error>> {
    let store = RevealStore::load(db)?;
    Ok(RevealGate::new(store, load_engine(db, config), config))
}

/// Log the just-expired session; the deadline is the completion time.
fn record_completed(
    db: &Database,
    engine: &CountdownEngine,
) -> Result<(), Box<dyn std::error::Error>> {
    if let (Some(session_id), Some(started_at), Some(ended_at)) =
        (engine.session_id(), engine.started_at(), engine.expires_at())
    {
        db.record_countdown(&CountdownRecord {
            session_id,
            duration_ms: engine.duration_ms(),
            started_at,
            ended_at,
            outcome: CountdownOutcome::Completed,
        })?;
    }
    Ok(())
}
