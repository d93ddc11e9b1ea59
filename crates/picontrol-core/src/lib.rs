//! # picontrol-core
//!
//! Shared library for PiControl containing the touch gesture recognizer and
//! the two JSON wire formats spoken to the remote host.
//!
//! This crate has zero dependencies on async runtimes, UI toolkits, or network
//! sockets.  Everything in it is a pure function or a plain data type, so the
//! whole trackpad pipeline can be tested without a touch screen or a server.
//!
//! # Architecture overview (for beginners)
//!
//! PiControl turns a phone into a remote trackpad, keyboard, and command
//! console for a small host such as a Raspberry Pi.  The phone-side host UI
//! reports raw touch callbacks; this crate decides what they *mean* and how
//! to put them on the wire.
//!
//! - **`gesture`** – The recognizer.  It consumes touch samples (one per active
//!   finger) and produces semantic [`InputEvent`]s: relative moves, two-finger
//!   scrolls, and double-tap clicks.
//!
//! - **`protocol`** – The wire formats.  Trackpad events are framed as
//!   `{"type": ..., ...}` objects (format A); console commands are framed as
//!   `{"command": ..., "params": [...]}` objects (format B).  The two schemas
//!   target different remote listeners and are deliberately kept apart.

pub mod gesture;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `picontrol_core::GestureRecognizer` instead of the full module path.
pub use gesture::{
    GestureConfig, GestureError, GestureOutput, GestureRecognizer, GestureState, TouchSample, DEFAULT_DOUBLE_TAP_WINDOW_MS,
    DEFAULT_SCROLL_AMPLIFICATION,
};
pub use protocol::codec::{decode_frame, encode_frame, ProtocolError};
pub use protocol::messages::{CommandMessage, CommandParam, InputEvent, KnownCommand, MouseButton, DEFAULT_GPIO_PIN};
