use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::celebrate::CelebrationPreset;
use crate::countdown::CountdownState;
use crate::reveal::GateState;

/// Every state change in the system produces an Event.
/// The UI layer polls for events; subscribers receive them on transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    CountdownStarted {
        session_id: Uuid,
        duration_ms: u64,
        expires_at: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    CountdownCancelled {
        session_id: Uuid,
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    /// A countdown session reached its deadline. Emitted exactly once
    /// per session, no matter how many ticks observe the expiry.
    CountdownExpired {
        session_id: Uuid,
        at: DateTime<Utc>,
    },
    /// The one-time transition from placeholder to live site.
    SiteRevealed {
        source: RevealSource,
        at: DateTime<Utc>,
    },
    /// A celebration burst was triggered (decorative only).
    CelebrationFired {
        preset: CelebrationPreset,
        particle_count: u32,
        at: DateTime<Utc>,
    },
    GateSnapshot {
        gate: GateState,
        countdown: CountdownState,
        remaining_ms: u64,
        final_seconds: bool,
        revealed: bool,
        registration_open: bool,
        at: DateTime<Utc>,
    },
}

/// Which entry point drove the reveal transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevealSource {
    /// A countdown session ran to zero.
    Expiry,
    /// The operator override (hotkey chord or explicit command).
    Override,
}
