//! Countdown engine implementation.
//!
//! The countdown engine is a wall-clock-based state machine. It does not
//! use internal threads - the caller is responsible for calling `tick()`
//! periodically. All progress derives from the absolute deadline, never
//! from tick counts, so a stretch of missed ticks (a backgrounded tab, a
//! suspended process) cannot desynchronize the display or double-fire the
//! expiry.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> Expired
//!           |  ^
//!           v  |
//!          (restart/cancel)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = CountdownEngine::new();
//! engine.start(Duration::seconds(10))?;
//! // In a loop:
//! engine.tick(); // Returns Some(Event::CountdownExpired) once at the deadline
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::remaining::RemainingTime;
use crate::error::ValidationError;
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountdownState {
    Idle,
    Running,
    /// The deadline was reached and the expiry event has been emitted.
    /// Terminal until the next `start()`.
    Expired,
}

/// Core countdown engine.
///
/// Operates on wall-clock deltas -- no internal thread. The caller is
/// responsible for calling `tick()` periodically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountdownEngine {
    state: CountdownState,
    /// Absolute deadline the running session targets.
    expires_at: Option<DateTime<Utc>>,
    /// Identifier of the current session (new on every start).
    session_id: Option<Uuid>,
    started_at: Option<DateTime<Utc>>,
    duration_ms: u64,
    /// Threshold for the end-of-countdown display highlight, in seconds.
    #[serde(default = "default_highlight_secs")]
    highlight_final_secs: u32,
}

fn default_highlight_secs() -> u32 {
    3
}

impl CountdownEngine {
    /// Create a new engine in the `Idle` state.
    pub fn new() -> Self {
        Self {
            state: CountdownState::Idle,
            expires_at: None,
            session_id: None,
            started_at: None,
            duration_ms: 0,
            highlight_final_secs: default_highlight_secs(),
        }
    }

    pub fn with_highlight_secs(mut self, secs: u32) -> Self {
        self.highlight_final_secs = secs;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> CountdownState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == CountdownState::Running
    }

    pub fn session_id(&self) -> Option<Uuid> {
        self.session_id
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Total duration of the current session in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    /// Milliseconds left, clamped to zero. Zero when no session is running.
    pub fn remaining_ms(&self) -> u64 {
        self.remaining_ms_at(Utc::now())
    }

    pub fn remaining_ms_at(&self, now: DateTime<Utc>) -> u64 {
        match (self.state, self.expires_at) {
            (CountdownState::Running, Some(deadline)) => {
                (deadline - now).num_milliseconds().max(0) as u64
            }
            _ => 0,
        }
    }

    /// Time left decomposed for display. Pure read, never negative.
    pub fn remaining(&self) -> RemainingTime {
        self.remaining_at(Utc::now())
    }

    pub fn remaining_at(&self, now: DateTime<Utc>) -> RemainingTime {
        RemainingTime::from_ms(self.remaining_ms_at(now))
    }

    /// True while a running session is inside its final-seconds window
    /// (used for the end-of-countdown display highlight).
    pub fn in_final_seconds(&self) -> bool {
        self.in_final_seconds_at(Utc::now())
    }

    pub fn in_final_seconds_at(&self, now: DateTime<Utc>) -> bool {
        let remaining = self.remaining_ms_at(now);
        self.state == CountdownState::Running
            && remaining > 0
            && remaining <= u64::from(self.highlight_final_secs) * 1000
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start a new session targeting `now + duration`.
    ///
    /// A non-positive duration is rejected and the engine is left
    /// untouched. Starting while a session is running replaces it: the
    /// old deadline is discarded and can no longer fire.
    pub fn start(&mut self, duration: Duration) -> Result<Event, ValidationError> {
        self.start_at(Utc::now(), duration)
    }

    pub fn start_at(
        &mut self,
        now: DateTime<Utc>,
        duration: Duration,
    ) -> Result<Event, ValidationError> {
        if duration <= Duration::zero() {
            return Err(ValidationError::InvalidDuration(duration.num_milliseconds()));
        }
        let session_id = Uuid::new_v4();
        let expires_at = now + duration;
        self.state = CountdownState::Running;
        self.session_id = Some(session_id);
        self.started_at = Some(now);
        self.expires_at = Some(expires_at);
        self.duration_ms = duration.num_milliseconds() as u64;
        Ok(Event::CountdownStarted {
            session_id,
            duration_ms: self.duration_ms,
            expires_at,
            at: now,
        })
    }

    /// Abandon the running session without firing expiry.
    pub fn cancel(&mut self) -> Option<Event> {
        self.cancel_at(Utc::now())
    }

    pub fn cancel_at(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if self.state != CountdownState::Running {
            return None;
        }
        let session_id = self.session_id?;
        let remaining_ms = self.remaining_ms_at(now);
        self.state = CountdownState::Idle;
        self.session_id = None;
        self.started_at = None;
        self.expires_at = None;
        self.duration_ms = 0;
        Some(Event::CountdownCancelled {
            session_id,
            remaining_ms,
            at: now,
        })
    }

    /// Call periodically. Returns `Some(Event::CountdownExpired)` exactly
    /// once, on the first tick at or past the deadline.
    pub fn tick(&mut self) -> Option<Event> {
        self.tick_at(Utc::now())
    }

    pub fn tick_at(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if self.state != CountdownState::Running {
            return None;
        }
        if self.remaining_ms_at(now) > 0 {
            return None;
        }
        // Session data is kept around so the caller can log the
        // completed session; the next start() replaces it.
        self.state = CountdownState::Expired;
        let session_id = self.session_id?;
        Some(Event::CountdownExpired {
            session_id,
            at: now,
        })
    }
}

impl Default for CountdownEngine {
    fn default() -> Self {
        Self::new()
    }
}
