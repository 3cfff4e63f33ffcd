use std::fmt;

use serde::{Deserialize, Serialize};

/// Non-negative time left in a countdown, decomposed for display.
///
/// `minutes` and `seconds` are always in `[0, 59]`, `hours` in `[0, 23]`;
/// anything beyond a day lands in `days`. Use [`RemainingTime::clock`] for
/// the uncapped-hours view a countdown board shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemainingTime {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl RemainingTime {
    pub const ZERO: Self = Self {
        days: 0,
        hours: 0,
        minutes: 0,
        seconds: 0,
    };

    /// Decompose a millisecond count. Sub-second remainder is truncated,
    /// so a session is only "at zero" once it is fully elapsed.
    pub fn from_ms(ms: u64) -> Self {
        let total_secs = ms / 1000;
        Self {
            days: total_secs / 86_400,
            hours: (total_secs / 3_600) % 24,
            minutes: (total_secs / 60) % 60,
            seconds: total_secs % 60,
        }
    }

    pub fn total_seconds(&self) -> u64 {
        self.days * 86_400 + self.hours * 3_600 + self.minutes * 60 + self.seconds
    }

    pub fn is_zero(&self) -> bool {
        self.total_seconds() == 0
    }

    /// `(hours, minutes, seconds)` with days folded into the hours field.
    pub fn clock(&self) -> (u64, u64, u64) {
        (self.days * 24 + self.hours, self.minutes, self.seconds)
    }
}

impl fmt::Display for RemainingTime {
    /// `HH:MM:SS` with uncapped, zero-padded hours.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (h, m, s) = self.clock();
        write!(f, "{h:02}:{m:02}:{s:02}")
    }
}
