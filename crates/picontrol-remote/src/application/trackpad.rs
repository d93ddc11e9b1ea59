//! TrackpadController: touch callbacks and discrete controls → relay frames.
//!
//! The controller owns a [`GestureRecognizer`] and a [`FrameSink`].  Each
//! touch callback runs the recognizer and sends whatever it produced,
//! immediately and in order.  Nothing is buffered: if the channel is not open
//! the events are dropped (and the sink logs the drop).

use std::sync::Arc;

use picontrol_core::{GestureConfig, GestureError, GestureOutput, GestureRecognizer, InputEvent, MouseButton, TouchSample};
use tracing::debug;

use crate::application::sink::{send_message, FrameSink};
use crate::application::ControlError;

/// What one touch callback did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dispatch {
    /// Events handed to the channel.
    pub sent: usize,
    /// Events the recognizer produced but the channel refused.
    pub dropped: usize,
    /// The host should suppress its own handling of this touch.
    pub suppress_default: bool,
}

pub struct TrackpadController {
    recognizer: GestureRecognizer,
    sink: Arc<dyn FrameSink>,
}

impl TrackpadController {
    pub fn new(config: GestureConfig, sink: Arc<dyn FrameSink>) -> Self {
        Self {
            recognizer: GestureRecognizer::new(config),
            sink,
        }
    }

    pub fn recognizer(&self) -> &GestureRecognizer {
        &self.recognizer
    }

    pub fn on_touch_start(&mut self, points: &[TouchSample]) -> Dispatch {
        let output = self.recognizer.on_contact_start(points);
        self.dispatch(output)
    }

    pub fn on_touch_move(&mut self, points: &[TouchSample]) -> Dispatch {
        let output = self.recognizer.on_contact_move(points);
        self.dispatch(output)
    }

    pub fn on_touch_end(&mut self, remaining: &[TouchSample]) -> Dispatch {
        let output = self.recognizer.on_contact_end(remaining);
        self.dispatch(output)
    }

    /// Sends `Click{right}` from the dedicated right-click control.
    ///
    /// # Errors
    ///
    /// [`ControlError::Channel`] if the channel is not open.
    pub fn right_click(&self) -> Result<(), ControlError> {
        self.send(&InputEvent::Click {
            button: MouseButton::Right,
        })
    }

    /// Sends `Key{key}` for a key press, named as the keyboard reports it.
    ///
    /// # Errors
    ///
    /// [`ControlError::Input`] for an empty key name, or
    /// [`ControlError::Channel`] if the channel is not open.
    pub fn press_key(&self, key: &str) -> Result<(), ControlError> {
        if key.is_empty() {
            return Err(GestureError::MalformedInput("key press without a key name".to_string()).into());
        }
        self.send(&InputEvent::Key { key: key.to_string() })
    }

    fn send(&self, event: &InputEvent) -> Result<(), ControlError> {
        send_message(self.sink.as_ref(), event)?;
        debug!(kind = event.kind(), "relay frame sent");
        Ok(())
    }

    fn dispatch(&self, output: GestureOutput) -> Dispatch {
        let mut dispatch = Dispatch {
            suppress_default: output.suppress_default,
            ..Dispatch::default()
        };
        for event in output {
            match self.send(&event) {
                Ok(()) => dispatch.sent += 1,
                Err(_) => dispatch.dropped += 1,
            }
        }
        dispatch
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
