//! Keyboard input matching for gate shortcuts.
//!
//! Chords are written the way they appear in the config file:
//! `"ctrl+alt+i"`, `"shift+space"`, or a bare key like `"space"`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A single key press as reported by the UI layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key: String,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub alt: bool,
    #[serde(default)]
    pub shift: bool,
}

impl KeyEvent {
    pub fn plain(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ctrl: false,
            alt: false,
            shift: false,
        }
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn alt(mut self) -> Self {
        self.alt = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }
}

/// A modifier-plus-key combination recognized by the gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyChord {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub key: String,
}

impl KeyChord {
    /// Parse a chord string such as `"ctrl+alt+i"` or `"space"`.
    ///
    /// The final token is the key; everything before it must be a
    /// modifier, each at most once.
    pub fn parse(chord: &str) -> Result<Self, ValidationError> {
        let invalid = |message: &str| ValidationError::InvalidChord {
            chord: chord.to_string(),
            message: message.to_string(),
        };

        let tokens: Vec<String> = chord
            .split('+')
            .map(|t| t.trim().to_ascii_lowercase())
            .collect();
        if tokens.iter().any(String::is_empty) {
            return Err(invalid("empty token"));
        }
        let (key, modifiers) = match tokens.split_last() {
            Some((key, modifiers)) => (key.clone(), modifiers),
            None => return Err(invalid("empty chord")),
        };
        if matches!(key.as_str(), "ctrl" | "alt" | "shift") {
            return Err(invalid("chord ends in a modifier, missing key"));
        }

        let mut parsed = Self {
            ctrl: false,
            alt: false,
            shift: false,
            key: normalize_key(&key),
        };
        for m in modifiers {
            let flag = match m.as_str() {
                "ctrl" => &mut parsed.ctrl,
                "alt" => &mut parsed.alt,
                "shift" => &mut parsed.shift,
                other => return Err(invalid(&format!("unknown modifier '{other}'"))),
            };
            if *flag {
                return Err(invalid(&format!("duplicate modifier '{m}'")));
            }
            *flag = true;
        }
        Ok(parsed)
    }

    /// Default operator override chord.
    pub fn reveal_default() -> Self {
        Self {
            ctrl: true,
            alt: true,
            shift: false,
            key: "i".to_string(),
        }
    }

    /// Default decorative-celebration key.
    pub fn celebrate_default() -> Self {
        Self {
            ctrl: false,
            alt: false,
            shift: false,
            key: "space".to_string(),
        }
    }

    /// Exact-modifier, case-insensitive key match.
    pub fn matches(&self, event: &KeyEvent) -> bool {
        self.ctrl == event.ctrl
            && self.alt == event.alt
            && self.shift == event.shift
            && self.key == normalize_key(&event.key)
    }

    /// The key press this chord describes (for simulated input).
    pub fn to_event(&self) -> KeyEvent {
        KeyEvent {
            key: self.key.clone(),
            ctrl: self.ctrl,
            alt: self.alt,
            shift: self.shift,
        }
    }
}

fn normalize_key(key: &str) -> String {
    match key {
        " " => "space".to_string(),
        k => k.to_ascii_lowercase(),
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ctrl {
            write!(f, "ctrl+")?;
        }
        if self.alt {
            write!(f, "alt+")?;
        }
        if self.shift {
            write!(f, "shift+")?;
        }
        write!(f, "{}", self.key)
    }
}
