//! Seams between the controllers and the transport.
//!
//! [`FrameSink`] is the outbound side: something that can report its
//! connection state and accept one encoded text frame.  [`InboundSink`] is
//! the return path: it receives every text frame the remote host sends,
//! verbatim.

use picontrol_core::{encode_frame, ProtocolError};
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::domain::ChannelState;

/// Errors reported by the command channel.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ChannelError {
    /// A send was attempted while the channel was not `Open`.  The message was
    /// dropped, not queued.
    #[error("channel is not open; message dropped")]
    NotConnected,

    /// `open()` was called while a connection is already starting or open.
    #[error("channel is already {0:?}")]
    AlreadyActive(ChannelState),

    /// The message could not be encoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// `open()` was called outside a Tokio runtime.
    #[error("no async runtime available to drive the connection")]
    NoRuntime,
}

/// Outbound frame transport.
///
/// Implementations must not block: `send_text` hands the frame to the
/// transport and returns at once.
#[cfg_attr(test, mockall::automock)]
pub trait FrameSink: Send + Sync {
    /// Current connection state.
    fn state(&self) -> ChannelState;

    /// Transmits one already-encoded frame.
    ///
    /// # Errors
    ///
    /// [`ChannelError::NotConnected`] if the transport is not open.
    fn send_text(&self, frame: String) -> Result<(), ChannelError>;
}

/// Receives inbound text frames from the remote host.
pub trait InboundSink: Send + Sync {
    fn deliver(&self, frame: &str);
}

/// Encodes `msg` and sends it through `sink` if the sink is open.
///
/// A send on a closed sink drops the message and logs exactly one warning,
/// whether the state check or the transport itself noticed.  The returned
/// error is informational; callers need not log it again.
///
/// # Errors
///
/// [`ChannelError::NotConnected`] when not open, or
/// [`ChannelError::Protocol`] when encoding fails.
pub fn send_message<M>(sink: &dyn FrameSink, msg: &M) -> Result<(), ChannelError>
where
    M: Serialize + ?Sized,
{
    let result = if sink.state().is_open() {
        encode_frame(msg)
            .map_err(ChannelError::from)
            .and_then(|frame| sink.send_text(frame))
    } else {
        Err(ChannelError::NotConnected)
    };

    if let Err(ChannelError::NotConnected) = &result {
        warn!("send dropped: channel is not open");
    }
    result
}

// ── Tests ─────────────────────────────────────────────────────────────────────
