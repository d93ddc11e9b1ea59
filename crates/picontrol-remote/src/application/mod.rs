//! Application layer: the controllers a host UI drives.
//!
//! - [`trackpad`] – touch callbacks, key presses and the right-click control.
//! - [`console`]  – command lines and catalog buttons.
//! - [`script`]   – JSON-lines replay of trackpad callbacks.
//! - [`sink`]     – the [`FrameSink`]/[`InboundSink`] seams to the transport.
//!
//! **Dependency rule**: this layer never touches a socket directly; the
//! infrastructure layer supplies the sinks.

use picontrol_core::{GestureError, ProtocolError};
use thiserror::Error;

pub mod console;
pub mod script;
pub mod sink;
pub mod trackpad;

pub use console::{parse_line, ConsoleController};
pub use script::{run_script_line, ScriptLine, ScriptTouch};
pub use sink::{send_message, ChannelError, FrameSink, InboundSink};
pub use trackpad::{Dispatch, TrackpadController};

/// Error type for controller operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControlError {
    /// The user input could not be turned into an event.
    #[error(transparent)]
    Input(#[from] GestureError),

    /// The command could not be built or encoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The channel refused the frame.
    #[error(transparent)]
    Channel(#[from] ChannelError),
}

impl ControlError {
    /// `true` when the frame was dropped because the channel was not open.
    /// That case has already been logged by the sink.
    pub fn is_not_connected(&self) -> bool {
        matches!(self, ControlError::Channel(ChannelError::NotConnected))
    }
}
