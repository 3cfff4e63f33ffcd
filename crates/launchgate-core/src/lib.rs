//! # Launchgate Core Library
//!
//! This library provides the core logic for Launchgate, the reveal gate
//! that keeps a festival site behind a pre-launch placeholder until its
//! countdown expires (or an operator overrides it). It implements a
//! CLI-first philosophy where all operations are available via a
//! standalone CLI binary, with any GUI being a thin layer over the same
//! core library.
//!
//! ## Architecture
//!
//! - **Countdown Engine**: A wall-clock-based state machine that requires
//!   the caller to periodically invoke `tick()`; expiry derives from the
//!   absolute deadline, so missed ticks can neither skew the display nor
//!   double-fire
//! - **Reveal Store**: The two persisted gate flags, with write-through
//!   persistence and transition subscribers
//! - **Reveal Gate**: Orchestration tying countdown, store, keyboard
//!   shortcuts, and the page-router collaborator together
//! - **Storage**: SQLite-based kv/history storage and TOML configuration
//!
//! ## Key Components
//!
//! - [`CountdownEngine`]: Core countdown state machine
//! - [`RevealGate`]: Locked/Unlocked gate orchestration
//! - [`Database`]: Gate state and countdown history persistence
//! - [`Config`]: Application configuration management

pub mod celebrate;
pub mod countdown;
pub mod error;
pub mod events;
pub mod input;
pub mod reveal;
pub mod router;
pub mod storage;

pub use celebrate::{Burst, BurstSpec, CelebrationPreset, Hint};
pub use countdown::{CountdownEngine, CountdownState, RemainingTime};
pub use error::{ConfigError, CoreError, StorageError, ValidationError};
pub use events::{Event, RevealSource};
pub use input::{KeyChord, KeyEvent};
pub use reveal::{GateState, GateView, RevealGate, RevealState, RevealStore};
pub use router::{AuthCheck, PageRouter, Route, Section, StaticAuth, View};
pub use storage::{Config, Database};
