//! Raw input events delivered by the host
//!
//! The host forwards keyboard and paste events with the usual
//! suppression contract: handlers mark an event consumed via
//! `prevent_default`, and the host then suppresses its native effect.

/// Logical identity of a pressed key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    /// A printable character sequence
    Character(String),
    Enter,
    Tab,
    Backspace,
    Delete,
    /// Anything the surface does not special-case
    Other,
}

/// Modifier state at event time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Primary chord modifier (Ctrl, or Cmd on mac hosts)
    pub fn primary(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Keyboard event
#[derive(Debug, Clone)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
    /// Key held down, auto-repeating
    pub repeat: bool,
    /// Mid IME composition; the surface bypasses these entirely
    pub is_composing: bool,
    prevented: bool,
}

impl KeyEvent {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self {
            key,
            modifiers,
            repeat: false,
            is_composing: false,
            prevented: false,
        }
    }

    pub fn repeated(mut self) -> Self {
        self.repeat = true;
        self
    }

    pub fn composing(mut self) -> Self {
        self.is_composing = true;
        self
    }

    pub fn prevent_default(&mut self) {
        self.prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.prevented
    }

    /// Ctrl/Cmd+Z, Ctrl/Cmd+Shift+Z, Ctrl/Cmd+Y
    pub(crate) fn undo_redo_chord(&self) -> Option<UndoRedo> {
        if !self.modifiers.primary() {
            return None;
        }
        match &self.key {
            Key::Character(s) if s.eq_ignore_ascii_case("z") => {
                if self.modifiers.shift {
                    Some(UndoRedo::Redo)
                } else {
                    Some(UndoRedo::Undo)
                }
            }
            Key::Character(s) if s.eq_ignore_ascii_case("y") => Some(UndoRedo::Redo),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UndoRedo {
    Undo,
    Redo,
}

/// Paste event carrying plain text
#[derive(Debug, Clone)]
pub struct PasteEvent {
    pub text: String,
    prevented: bool,
}

impl PasteEvent {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            prevented: false,
        }
    }

    pub fn prevent_default(&mut self) {
        self.prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.prevented
    }
}
