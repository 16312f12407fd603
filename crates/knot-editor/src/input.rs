//! Normalized input events.
//!
//! The host translates platform pointer and keyboard events into these.
//! Coordinates are CSS pixels relative to the canvas origin, the same space
//! hit testing uses.

/// Key name that cancels an in-progress drag.
pub const CANCEL_KEY: &str = "Escape";

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Pointer pressed (mouse down, touch start, pencil contact).
    PointerDown { x: f64, y: f64 },

    /// Pointer moved.
    PointerMove { x: f64, y: f64 },

    /// Pointer released.
    PointerUp { x: f64, y: f64 },

    /// Key pressed, named as in the DOM `KeyboardEvent.key`.
    Key { key: String },
}

impl InputEvent {
    pub fn key(key: impl Into<String>) -> Self {
        InputEvent::Key { key: key.into() }
    }

    pub fn is_cancel(&self) -> bool {
        matches!(self, InputEvent::Key { key } if key == CANCEL_KEY)
    }
}
