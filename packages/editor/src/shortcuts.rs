//! Keyboard shortcut mapping.
//!
//! Hosts translate their key events into [`KeyEvent`] and hand them to the
//! session. Events aimed at text-editing controls never trigger shortcuts,
//! so typing in a field keeps its native undo and clipboard.

use serde::{Deserialize, Serialize};

/// What the key event was aimed at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventTarget {
    #[default]
    Canvas,
    TextInput,
    TextArea,
    ContentEditable,
    Select,
    Other,
}

impl EventTarget {
    pub fn is_text_editing(&self) -> bool {
        matches!(
            self,
            EventTarget::TextInput
                | EventTarget::TextArea
                | EventTarget::ContentEditable
                | EventTarget::Select
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KeyEvent {
    /// Key name as reported by the host (`"z"`, `"Delete"`, `"Escape"`)
    pub key: String,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub meta: bool,
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub alt: bool,
    #[serde(default)]
    pub target: EventTarget,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }

    /// Ctrl on Windows/Linux, Cmd on macOS
    pub fn with_command(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn on(mut self, target: EventTarget) -> Self {
        self.target = target;
        self
    }

    fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Shortcut {
    Undo,
    Redo,
    Copy,
    Paste,
    Duplicate,
    Delete,
    Deselect,
    Save,
}

impl Shortcut {
    pub fn from_event(event: &KeyEvent) -> Option<Shortcut> {
        if event.target.is_text_editing() || event.alt {
            return None;
        }

        let key = event.key.to_ascii_lowercase();
        if event.command() {
            return match (key.as_str(), event.shift) {
                ("z", false) => Some(Shortcut::Undo),
                ("z", true) | ("y", false) => Some(Shortcut::Redo),
                ("c", false) => Some(Shortcut::Copy),
                ("v", false) => Some(Shortcut::Paste),
                ("d", false) => Some(Shortcut::Duplicate),
                ("s", false) => Some(Shortcut::Save),
                _ => None,
            };
        }

        match key.as_str() {
            "delete" | "backspace" => Some(Shortcut::Delete),
            "escape" => Some(Shortcut::Deselect),
            _ => None,
        }
    }
}
