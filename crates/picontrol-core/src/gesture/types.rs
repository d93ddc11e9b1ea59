//! Data types for the gesture recognizer.

use thiserror::Error;

use crate::protocol::messages::InputEvent;

/// Maximum interval between two single-finger taps that still counts as a
/// double-tap, in milliseconds (exclusive).
pub const DEFAULT_DOUBLE_TAP_WINDOW_MS: i64 = 300;

/// Multiplier applied to the two-finger midpoint delta before it is sent as a
/// scroll amount.
pub const DEFAULT_SCROLL_AMPLIFICATION: f64 = 10.0;

/// One active contact point as reported by the touch surface.
///
/// Coordinates are in the surface's client pixel space; `timestamp_ms` is the
/// host's event time in milliseconds.  Samples are ephemeral: one per finger
/// per callback, never stored beyond the state they update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchSample {
    pub x: f64,
    pub y: f64,
    pub timestamp_ms: i64,
}

impl TouchSample {
    pub fn new(x: f64, y: f64, timestamp_ms: i64) -> Self {
        Self { x, y, timestamp_ms }
    }

    pub(crate) fn has_finite_coordinates(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Everything the recognizer remembers between callbacks.
///
/// Invariants maintained by the transition functions:
///
/// - `last_position` is `Some` only while exactly one contact is active.
/// - `last_scroll_midpoint_y` is `Some` only while exactly two contacts are
///   active (and at least one two-finger move has been seen).
/// - `last_tap_ms` survives across gestures; it is the time of the most recent
///   single-finger contact start.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GestureState {
    /// Reference coordinate for the next relative move.
    pub last_position: Option<(f64, f64)>,
    /// Mean Y of the two contacts at the previous two-finger move.
    pub last_scroll_midpoint_y: Option<f64>,
    /// Timestamp of the previous single-finger contact start.
    ///
    /// `None` until the first tap.  A plain `0` start value would make a first
    /// tap within the window of the clock origin count as a double tap; a
    /// single tap must never click.
    pub last_tap_ms: Option<i64>,
}

/// Tuning constants for the recognizer.
///
/// The defaults are the fixed values the trackpad has always used; the
/// `[gesture]` section of the config file may override them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureConfig {
    /// Exclusive upper bound of the double-tap interval, in milliseconds.
    pub double_tap_window_ms: i64,
    /// Scroll sensitivity multiplier.
    pub scroll_amplification: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            double_tap_window_ms: DEFAULT_DOUBLE_TAP_WINDOW_MS,
            scroll_amplification: DEFAULT_SCROLL_AMPLIFICATION,
        }
    }
}

impl GestureConfig {
    /// Checks that the constants describe a usable recognizer.
    ///
    /// # Errors
    ///
    /// Returns [`GestureError::InvalidConfig`] when the double-tap window is
    /// not positive or the amplification is not a finite number.
    pub fn validate(&self) -> Result<(), GestureError> {
        if self.double_tap_window_ms <= 0 {
            return Err(GestureError::InvalidConfig(format!(
                "double_tap_window_ms must be positive, got {}",
                self.double_tap_window_ms
            )));
        }
        if !self.scroll_amplification.is_finite() {
            return Err(GestureError::InvalidConfig(format!(
                "scroll_amplification must be finite, got {}",
                self.scroll_amplification
            )));
        }
        Ok(())
    }
}

/// Errors reported by the pure transition functions.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GestureError {
    /// A callback carried unusable touch data.  The callback is a no-op.
    #[error("malformed touch input: {0}")]
    MalformedInput(String),

    /// The recognizer constants are out of range.
    #[error("invalid gesture configuration: {0}")]
    InvalidConfig(String),
}

/// What a single callback produced.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GestureOutput {
    /// Events in emission order.  At most one per callback today.
    pub events: Vec<InputEvent>,
    /// `true` when the host should suppress its own handling of the touch
    /// (page scrolling, zooming, synthetic clicks).
    pub suppress_default: bool,
}

impl GestureOutput {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl IntoIterator for GestureOutput {
    type Item = InputEvent;
    type IntoIter = std::vec::IntoIter<InputEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}
