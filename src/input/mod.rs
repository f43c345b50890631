//! Host-event to byte-sequence encoders.
//!
//! Pure translators: each takes a UI event plus an [`InputModes`] snapshot
//! and produces the bytes to write upstream. No encoder touches terminal
//! state.

pub mod key;
pub mod mouse;
pub mod paste;

use bitflags::bitflags;

pub use crate::terminal::modes::{InputModes, MouseEncoding, MouseTracking};

bitflags! {
    /// Keyboard modifiers, encoded into the `;m` parameter as
    /// `1 + shift + 2*alt + 4*ctrl`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 1 << 0;
        const ALT   = 1 << 1;
        const CTRL  = 1 << 2;
    }
}

impl Modifiers {
    /// The xterm modifier parameter; 1 when no modifier is held.
    pub fn param(self) -> u16 {
        let mut m = 1;
        if self.contains(Modifiers::SHIFT) {
            m += 1;
        }
        if self.contains(Modifiers::ALT) {
            m += 2;
        }
        if self.contains(Modifiers::CTRL) {
            m += 4;
        }
        m
    }
}

/// Logical keys the host delivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    Char(char),
    Up,
    Down,
    Right,
    Left,
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    Delete,
    /// F1-F12.
    F(u8),
    Enter,
    Backspace,
    Tab,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub mods: Modifiers,
}

impl KeyEvent {
    pub fn new(code: KeyCode) -> Self {
        Self {
            code,
            mods: Modifiers::empty(),
        }
    }

    pub fn with_mods(code: KeyCode, mods: Modifiers) -> Self {
        Self { code, mods }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseEventKind {
    Press(MouseButton),
    Release(MouseButton),
    /// Pointer motion; carries the held button, if any.
    Moved(Option<MouseButton>),
    WheelUp,
    WheelDown,
}

/// A pointer event in 0-based cell coordinates. The encoders emit 1-based
/// wire coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    pub kind: MouseEventKind,
    pub col: u16,
    pub row: u16,
    pub mods: Modifiers,
}
