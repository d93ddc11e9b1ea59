//! Connection state and the notifications the channel emits.
//!
//! ```text
//!            open()              handshake ok
//! Disconnected ──────► Connecting ───────────► Open
//!      ▲                   │                    │
//!      └───────────────────┴────────────────────┘
//!           close(), handshake failure, transport error, remote close
//! ```
//!
//! There is no automatic reconnect: leaving `Open` always lands in
//! `Disconnected`, and only another `open()` moves on from there.

/// Where the channel currently is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelState {
    #[default]
    Disconnected,
    Connecting,
    Open,
}

impl ChannelState {
    pub fn is_open(self) -> bool {
        self == ChannelState::Open
    }
}

/// Status notification delivered to the host UI.
///
/// Completion of `open()` is signalled here, never through a return value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// The connection attempt has started.
    Connecting { url: String },
    /// The handshake completed; frames may now be sent.
    Connected { url: String },
    /// The connection ended normally: closed locally or by the remote side.
    Disconnected { reason: String },
    /// The connection failed or broke.  The channel is `Disconnected`.
    TransportError { message: String },
}

impl ChannelEvent {
    /// Short human-readable status, suitable for a status bar.
    pub fn status_line(&self) -> String {
        match self {
            ChannelEvent::Connecting { url } => format!("Connecting to {url}..."),
            ChannelEvent::Connected { url } => format!("Connected to {url}"),
            ChannelEvent::Disconnected { reason } => format!("Disconnected: {reason}"),
            ChannelEvent::TransportError { message } => format!("Connection error: {message}"),
        }
    }

    /// `true` for the two notifications after which the channel is closed.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ChannelEvent::Disconnected { .. } | ChannelEvent::TransportError { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_disconnected() {
        assert_eq!(ChannelState::default(), ChannelState::Disconnected);
        assert!(!ChannelState::default().is_open());
    }

    #[test]
    fn test_status_lines_are_readable() {
        let connected = ChannelEvent::Connected {
            url: "ws://pi:8765".into(),
        };
        assert_eq!(connected.status_line(), "Connected to ws://pi:8765");

        let failed = ChannelEvent::TransportError {
            message: "connection refused".into(),
        };
        assert_eq!(failed.status_line(), "Connection error: connection refused");
    }

    #[test]
    fn test_only_disconnect_and_error_are_terminal() {
        assert!(!ChannelEvent::Connecting { url: String::new() }.is_terminal());
        assert!(!ChannelEvent::Connected { url: String::new() }.is_terminal());
        assert!(ChannelEvent::Disconnected { reason: String::new() }.is_terminal());
        assert!(ChannelEvent::TransportError { message: String::new() }.is_terminal());
    }
}
