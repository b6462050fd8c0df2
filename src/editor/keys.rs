//! Keyboard shortcuts intercepted while the editor is mounted

use std::str::FromStr;

use thiserror::Error;

/// A key press with its modifier state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyEvent {
    pub key: char,
    pub ctrl: bool,
    /// Cmd on macOS
    pub meta: bool,
    pub shift: bool,
}

impl KeyEvent {
    pub fn new(key: char) -> Self {
        Self {
            key,
            ..Self::default()
        }
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn meta(mut self) -> Self {
        self.meta = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }
}

/// Error parsing a key chord such as `Ctrl+Shift+Z`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid key chord '{0}'")]
pub struct KeyParseError(pub String);

impl FromStr for KeyEvent {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut event = KeyEvent::default();
        let mut key = None;
        for part in s.split('+').map(str::trim) {
            match part.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => event.ctrl = true,
                "cmd" | "meta" => event.meta = true,
                "shift" => event.shift = true,
                other => {
                    let mut chars = other.chars();
                    match (chars.next(), chars.next(), key) {
                        (Some(c), None, None) => key = Some(c),
                        _ => return Err(KeyParseError(s.to_string())),
                    }
                }
            }
        }
        event.key = key.ok_or_else(|| KeyParseError(s.to_string()))?;
        Ok(event)
    }
}

/// Editor commands bound to the keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    Undo,
    Redo,
    Save,
}

/// Map a key press to a shortcut. Ctrl and Cmd are interchangeable.
pub fn match_shortcut(event: &KeyEvent) -> Option<Shortcut> {
    if !(event.ctrl || event.meta) {
        return None;
    }
    match (event.key.to_ascii_lowercase(), event.shift) {
        ('z', false) => Some(Shortcut::Undo),
        ('z', true) | ('y', _) => Some(Shortcut::Redo),
        ('s', _) => Some(Shortcut::Save),
        _ => None,
    }
}

/// What the host should do with a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyResponse {
    /// The shortcut that was run, if any
    pub handled: Option<Shortcut>,
    /// Suppress the browser default for this key
    pub prevent_default: bool,
}
