//! Keyboard shortcuts for undo/redo

use serde::{Deserialize, Serialize};

use crate::config::KeyBindings;
use crate::domain::errors::DomainError;

/// A key press as delivered by the window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyEvent {
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
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

/// Parsed key combination such as `mod+shift+z`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCombo {
    key: String,
    ctrl: bool,
    meta: bool,
    shift: bool,
    alt: bool,
    /// Ctrl or Cmd, whichever the platform uses
    primary: bool,
}

impl KeyCombo {
    pub fn parse(spec: &str) -> Result<Self, DomainError> {
        let mut combo = KeyCombo {
            key: String::new(),
            ctrl: false,
            meta: false,
            shift: false,
            alt: false,
            primary: false,
        };

        let parts: Vec<&str> = spec.split('+').map(str::trim).collect();
        let Some((key, modifiers)) = parts.split_last() else {
            return Err(DomainError::BadArgs(format!("Empty key combo: '{}'", spec)));
        };
        if key.is_empty() {
            return Err(DomainError::BadArgs(format!("Key combo '{}' has no key", spec)));
        }

        for modifier in modifiers {
            match modifier.to_lowercase().as_str() {
                "ctrl" | "control" => combo.ctrl = true,
                "cmd" | "meta" | "super" => combo.meta = true,
                "shift" => combo.shift = true,
                "alt" | "option" => combo.alt = true,
                "mod" => combo.primary = true,
                other => {
                    return Err(DomainError::BadArgs(format!(
                        "Unknown modifier '{}' in key combo '{}'",
                        other, spec
                    )))
                }
            }
        }
        combo.key = key.to_lowercase();
        Ok(combo)
    }

    pub fn matches(&self, event: &KeyEvent) -> bool {
        if !event.key.eq_ignore_ascii_case(&self.key) {
            return false;
        }
        if event.shift != self.shift || event.alt != self.alt {
            return false;
        }
        if self.primary {
            (event.ctrl || event.meta) && !(event.ctrl && event.meta)
        } else {
            event.ctrl == self.ctrl && event.meta == self.meta
        }
    }
}

/// Action bound to a shortcut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    Undo,
    Redo,
}

/// Resolves key presses to history actions.
#[derive(Debug, Clone)]
pub struct KeyboardShortcuts {
    undo: Vec<KeyCombo>,
    redo: Vec<KeyCombo>,
}

impl Default for KeyboardShortcuts {
    fn default() -> Self {
        Self::from_bindings(&KeyBindings::default())
            .unwrap_or_else(|_| Self { undo: Vec::new(), redo: Vec::new() })
    }
}

impl KeyboardShortcuts {
    pub fn from_bindings(bindings: &KeyBindings) -> Result<Self, DomainError> {
        let parse_all = |specs: &[String]| -> Result<Vec<KeyCombo>, DomainError> {
            specs.iter().map(|s| KeyCombo::parse(s)).collect()
        };
        Ok(Self {
            undo: parse_all(&bindings.undo)?,
            redo: parse_all(&bindings.redo)?,
        })
    }

    /// Map a key press to an action. Nothing fires while focus is inside a
    /// text input, so typing keeps its native undo.
    pub fn resolve(&self, event: &KeyEvent, focus_in_text_input: bool) -> Option<ShortcutAction> {
        if focus_in_text_input {
            return None;
        }
        // Redo combos are checked first: they are usually undo plus shift.
        if self.redo.iter().any(|c| c.matches(event)) {
            return Some(ShortcutAction::Redo);
        }
        if self.undo.iter().any(|c| c.matches(event)) {
            return Some(ShortcutAction::Undo);
        }
        None
    }
}
