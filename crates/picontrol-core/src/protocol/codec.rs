//! Text-frame codec shared by both wire formats.
//!
//! Wire format:
//! ```text
//! <one JSON object>            one object per WebSocket text frame
//! ```
//! There is no length prefix and no delimiter: the transport's framing marks
//! where a message ends, and whitespace inside the object is insignificant.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while building, encoding, or decoding a frame.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProtocolError {
    /// The message could not be serialized to JSON.
    #[error("failed to encode frame: {0}")]
    Encode(String),

    /// The text is not a valid frame for the requested message type.
    #[error("failed to decode frame: {0}")]
    Decode(String),

    /// A catalog command was built without a parameter it cannot default.
    #[error("command `{command}` requires a {parameter}")]
    MissingParameter {
        command: &'static str,
        parameter: &'static str,
    },

    /// A console line contained no command name.
    #[error("empty command line")]
    EmptyCommand,

    /// A command name is not part of the catalog.
    #[error("unknown command: {0}")]
    UnknownCommand(String),
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Serializes `msg` into a single UTF-8 text frame.
///
/// Works for both [`crate::InputEvent`] (format A) and
/// [`crate::CommandMessage`] (format B).
///
/// # Errors
///
/// Returns [`ProtocolError::Encode`] if serialization fails.
///
/// # Examples
///
/// ```rust
/// use picontrol_core::{decode_frame, encode_frame, InputEvent, MouseButton};
///
/// let frame = encode_frame(&InputEvent::Click { button: MouseButton::Left }).unwrap();
/// assert_eq!(frame, r#"{"type":"click","button":"left"}"#);
///
/// let back: InputEvent = decode_frame(&frame).unwrap();
/// assert_eq!(back, InputEvent::Click { button: MouseButton::Left });
/// ```
pub fn encode_frame<T: Serialize + ?Sized>(msg: &T) -> Result<String, ProtocolError> {
    serde_json::to_string(msg).map_err(|e| ProtocolError::Encode(e.to_string()))
}

/// Parses one text frame into `T`.
///
/// The client itself never parses inbound frames (they go verbatim to the
/// logging sink); this is the listener side of the contract, used by tools
/// and tests that stand in for the remote host.
///
/// # Errors
///
/// Returns [`ProtocolError::Decode`] if `frame` is not valid JSON or does not
/// match the shape of `T`.
pub fn decode_frame<T: DeserializeOwned>(frame: &str) -> Result<T, ProtocolError> {
    serde_json::from_str(frame).map_err(|e| ProtocolError::Decode(e.to_string()))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
