//! Touch gesture recognition.
//!
//! The host UI reports three touch lifecycle callbacks (contact start,
//! contact move, and contact end), each carrying the list of contact points
//! that are active *after* the change.  The recognizer turns that stream into
//! [`InputEvent`](crate::InputEvent)s:
//!
//! | Callback | Active contacts | Result                                         |
//! |----------|-----------------|------------------------------------------------|
//! | start    | 1               | double-tap within the window → `Click{left}`   |
//! | move     | 1               | `Move{dx, dy}` relative to the last sample     |
//! | move     | 2               | `Scroll{dy}` from the change in mean Y, ×10    |
//! | move     | 3+              | nothing (unhandled gesture)                    |
//! | end      | any             | clears the references that no longer apply     |
//!
//! # Pure core, thin wrapper
//!
//! The functions in [`recognizer`] are pure state transitions:
//! `(GestureState, &[TouchSample]) -> (GestureState, events)`.  They never
//! touch a clock, a socket, or a UI toolkit, so every rule above is unit
//! tested directly.  [`GestureRecognizer`] owns a [`GestureState`] and applies
//! those transitions for a host event loop, turning malformed input into a
//! logged no-op instead of an error.

pub mod recognizer;
pub mod types;

pub use recognizer::{contact_end, contact_move, contact_start, GestureRecognizer, Transition};
pub use types::{
    GestureConfig, GestureError, GestureOutput, GestureState, TouchSample, DEFAULT_DOUBLE_TAP_WINDOW_MS,
    DEFAULT_SCROLL_AMPLIFICATION,
};
