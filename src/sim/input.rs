//! Host input events

use serde::{Deserialize, Serialize};

/// Keyboard key, reduced to what the game reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    Escape,
    End,
    /// Printable key, case-insensitive
    Char(char),
    Other,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        shift: false,
        alt: false,
    };

    pub const CTRL: Self = Self {
        ctrl: true,
        shift: false,
        alt: false,
    };
}

/// Discrete event delivered by the host, in surface pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputEvent {
    PointerPressed { x: i32, y: i32 },
    PointerMoved { x: i32, y: i32 },
    PointerDragged { x: i32, y: i32 },
    KeyPressed { key: Key, modifiers: Modifiers },
}

impl InputEvent {
    /// Esc, Q, End or Ctrl+C
    pub fn is_quit(&self) -> bool {
        match *self {
            InputEvent::KeyPressed { key, modifiers } => match key {
                Key::Escape | Key::End => true,
                Key::Char(c) => {
                    let c = c.to_ascii_lowercase();
                    c == 'q' || (c == 'c' && modifiers.ctrl)
                }
                Key::Other => false,
            },
            _ => false,
        }
    }
}
