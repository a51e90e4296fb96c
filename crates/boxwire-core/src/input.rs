//! Pointer and keyboard event types.
//!
//! Positions are in screen coordinates; the canvas converts them through
//! its camera before hit-testing.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ctrl: false,
        alt: false,
        meta: false,
    };

    /// Shift, Ctrl or Meta turn a click into a selection toggle.
    pub fn toggles_selection(self) -> bool {
        self.shift || self.ctrl || self.meta
    }
}

/// Pointer event type for unified mouse/touch handling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down {
        position: Point,
        button: MouseButton,
        modifiers: Modifiers,
    },
    Up {
        position: Point,
        button: MouseButton,
        modifiers: Modifiers,
    },
    Move {
        position: Point,
    },
    DoubleClick {
        position: Point,
    },
    /// Pointer left the surface.
    Leave,
    /// The platform aborted the gesture.
    Cancel,
}

impl PointerEvent {
    /// Plain primary-button press.
    pub fn down(position: Point) -> Self {
        Self::Down {
            position,
            button: MouseButton::Left,
            modifiers: Modifiers::NONE,
        }
    }

    /// Plain primary-button release.
    pub fn up(position: Point) -> Self {
        Self::Up {
            position,
            button: MouseButton::Left,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn moved(position: Point) -> Self {
        Self::Move { position }
    }

    pub fn position(&self) -> Option<Point> {
        match self {
            Self::Down { position, .. }
            | Self::Up { position, .. }
            | Self::Move { position }
            | Self::DoubleClick { position } => Some(*position),
            Self::Leave | Self::Cancel => None,
        }
    }
}

/// Keys the editor reacts to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Delete,
    Backspace,
    Escape,
    Other(String),
}

impl Key {
    /// Map a platform key name (`"Delete"`, `"Escape"`, ...).
    pub fn from_name(name: &str) -> Self {
        match name {
            "Delete" => Key::Delete,
            "Backspace" => Key::Backspace,
            "Escape" | "Esc" => Key::Escape,
            other => Key::Other(other.to_string()),
        }
    }

    pub fn is_delete(&self) -> bool {
        matches!(self, Key::Delete | Key::Backspace)
    }
}

/// Keyboard event type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyEvent {
    Pressed(Key),
    Released(Key),
}
