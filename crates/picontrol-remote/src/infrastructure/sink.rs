//! Inbound sinks: where text frames from the remote host end up.
//!
//! Frames are opaque strings.  No sink parses them.

use std::sync::Mutex;

use tracing::info;

use crate::application::sink::InboundSink;

/// Writes every inbound frame to the log under target `picontrol::inbound`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl InboundSink for TracingSink {
    fn deliver(&self, frame: &str) {
        info!(target: "picontrol::inbound", "{frame}");
    }
}

/// Keeps every inbound frame in memory, in arrival order.
///
/// Used by tests and by tools that want to inspect replies.
#[derive(Debug, Default)]
pub struct RecordingSink {
    frames: Mutex<Vec<String>>,
}

impl RecordingSink {
    /// Returns a copy of every frame received so far.
    pub fn frames(&self) -> Vec<String> {
        self.frames.lock().map(|f| f.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.frames.lock().map(|f| f.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl InboundSink for RecordingSink {
    fn deliver(&self, frame: &str) {
        if let Ok(mut frames) = self.frames.lock() {
            frames.push(frame.to_string());
        }
    }
}
