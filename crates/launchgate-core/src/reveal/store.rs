//! Persisted reveal state.
//!
//! Two string entries in the kv store gate the whole site:
//! `siteRevealed` and `registrationOpen`. Only the literal string
//! `"true"` counts as true; a missing or malformed value reads as false
//! and is never an error.
//!
//! The store is the single owner of the flags in a process. Every write
//! goes through [`RevealStore::reveal`], which persists before updating
//! memory and notifying subscribers, so in-memory reads always reflect
//! the last persisted write.

use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::events::{Event, RevealSource};
use crate::storage::Database;

pub const KEY_SITE_REVEALED: &str = "siteRevealed";
pub const KEY_REGISTRATION_OPEN: &str = "registrationOpen";

/// The two persisted gate flags.
///
/// Invariant: `registration_open` is never true while `revealed` is
/// false; both flip together in the reveal transition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealState {
    pub revealed: bool,
    pub registration_open: bool,
}

type Subscriber = Box<dyn Fn(&Event) + Send>;

/// Owned, persisted reveal state with transition notification.
pub struct RevealStore {
    state: RevealState,
    subscribers: Vec<Subscriber>,
}

impl RevealStore {
    /// Initialize from the kv store; absent or malformed values default
    /// to false.
    pub fn load(db: &Database) -> Result<Self, StorageError> {
        let revealed = read_flag(db, KEY_SITE_REVEALED)?;
        let registration_open = read_flag(db, KEY_REGISTRATION_OPEN)?;
        Ok(Self {
            state: RevealState {
                revealed,
                registration_open,
            },
            subscribers: Vec::new(),
        })
    }

    pub fn state(&self) -> RevealState {
        self.state
    }

    pub fn is_revealed(&self) -> bool {
        self.state.revealed
    }

    pub fn is_registration_open(&self) -> bool {
        self.state.registration_open
    }

    /// Register a transition observer. Subscribers run synchronously,
    /// after the write lands, at most once per transition.
    pub fn subscribe(&mut self, subscriber: impl Fn(&Event) + Send + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    /// Flip both flags, persist them, and notify subscribers.
    ///
    /// Idempotent: once revealed, further calls change nothing, notify
    /// nobody, and return `None`. A failed write leaves the in-memory
    /// state untouched (still locked).
    pub fn reveal(
        &mut self,
        db: &Database,
        source: RevealSource,
    ) -> Result<Option<Event>, StorageError> {
        if self.state.revealed {
            return Ok(None);
        }

        // Persist first, then update memory and notify.
        db.kv_set(KEY_SITE_REVEALED, "true")?;
        db.kv_set(KEY_REGISTRATION_OPEN, "true")?;
        self.state.revealed = true;
        self.state.registration_open = true;

        let event = Event::SiteRevealed {
            source,
            at: Utc::now(),
        };
        for subscriber in &self.subscribers {
            subscriber(&event);
        }
        Ok(Some(event))
    }
}

fn read_flag(db: &Database, key: &str) -> Result<bool, StorageError> {
    Ok(matches!(db.kv_get(key)?, Some(v) if v == "true"))
}

impl fmt::Debug for RevealStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RevealStore")
            .field("state", &self.state)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
