//! Pure gesture transitions and the stateful recognizer that drives them.
//!
//! Each `contact_*` function takes the current [`GestureState`] and the
//! contacts active after the callback, and returns the next state plus the
//! events to send.  None of them has side effects.
//!
//! # Reference hand-off between one and two fingers
//!
//! The position reference only exists while exactly one finger is down.  When
//! a second finger lands it is dropped, and when the count falls back to one
//! it is re-anchored to the finger that stayed.  Without the re-anchor the
//! first move after a scroll would be measured from where the *first* touch
//! began and the cursor would jump.

use tracing::debug;

use crate::gesture::types::{GestureConfig, GestureError, GestureOutput, GestureState, TouchSample};
use crate::protocol::messages::{InputEvent, MouseButton};

/// Result of a pure transition: the state to keep and what to emit.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: GestureState,
    pub output: GestureOutput,
}

impl Transition {
    fn unchanged(state: &GestureState) -> Self {
        Self {
            state: *state,
            output: GestureOutput::default(),
        }
    }
}

// ── Pure transitions ──────────────────────────────────────────────────────────

/// Handles a contact-start callback.
///
/// With exactly one contact, the contact becomes the new position reference
/// and is checked against the previous single-finger start: an interval
/// strictly between 0 and the double-tap window emits `Click{left}` and asks
/// the host to suppress its default handling.  The tap timestamp is updated
/// whether or not a click fired, so every qualifying adjacent pair of taps
/// clicks.
///
/// With two or more contacts nothing is emitted.  The position reference is
/// dropped, and a third contact also drops the scroll midpoint.
///
/// # Errors
///
/// [`GestureError::MalformedInput`] when `points` is empty or any coordinate
/// is not finite.  The caller should keep its previous state.
pub fn contact_start(
    state: &GestureState,
    points: &[TouchSample],
    config: &GestureConfig,
) -> Result<Transition, GestureError> {
    validate_points(points, false)?;

    let mut next = *state;
    let mut output = GestureOutput::default();

    match points {
        [only] => {
            next.last_position = Some((only.x, only.y));

            if let Some(previous_tap) = state.last_tap_ms {
                let elapsed = only.timestamp_ms.saturating_sub(previous_tap);
                if elapsed > 0 && elapsed < config.double_tap_window_ms {
                    output.events.push(InputEvent::Click {
                        button: MouseButton::Left,
                    });
                    output.suppress_default = true;
                }
            }
            next.last_tap_ms = Some(only.timestamp_ms);
        }
        many => {
            next.last_position = None;
            if many.len() > 2 {
                next.last_scroll_midpoint_y = None;
            }
        }
    }

    Ok(Transition { state: next, output })
}

/// Handles a contact-move callback.
///
/// - One contact: emits `Move{dx, dy}` relative to the position reference and
///   moves the reference.  Every sample is forwarded, however small.  If no
///   reference exists yet the sample only establishes one.
/// - Two contacts: computes the mean Y.  If a previous midpoint exists, emits
///   `Scroll{dy = (previous − current) × amplification}`.  The midpoint is
///   stored either way.
/// - Three or more contacts: no event, state unchanged.
///
/// One- and two-contact moves always ask the host to suppress default
/// scrolling.
///
/// # Errors
///
/// [`GestureError::MalformedInput`] when `points` is empty or any coordinate
/// is not finite.
pub fn contact_move(
    state: &GestureState,
    points: &[TouchSample],
    config: &GestureConfig,
) -> Result<Transition, GestureError> {
    validate_points(points, false)?;

    let mut next = *state;
    let mut output = GestureOutput::default();

    match points {
        [only] => {
            output.suppress_default = true;
            if let Some((last_x, last_y)) = state.last_position {
                output.events.push(InputEvent::Move {
                    dx: only.x - last_x,
                    dy: only.y - last_y,
                });
            }
            next.last_position = Some((only.x, only.y));
        }
        [first, second] => {
            output.suppress_default = true;
            let midpoint = (first.y + second.y) / 2.0;
            if let Some(previous) = state.last_scroll_midpoint_y {
                output.events.push(InputEvent::Scroll {
                    dy: (previous - midpoint) * config.scroll_amplification,
                });
            }
            next.last_scroll_midpoint_y = Some(midpoint);
        }
        _ => return Ok(Transition::unchanged(state)),
    }

    Ok(Transition { state: next, output })
}

/// Handles a contact-end callback.  `remaining` lists the contacts still down.
///
/// Two independent checks run on every call:
///
/// - fewer than two remaining → the scroll midpoint is cleared;
/// - none remaining → the position reference is cleared.
///
/// When exactly one contact remains the position reference is re-anchored to
/// it.  Nothing is ever emitted.
///
/// # Errors
///
/// [`GestureError::MalformedInput`] when a remaining coordinate is not finite.
pub fn contact_end(state: &GestureState, remaining: &[TouchSample]) -> Result<Transition, GestureError> {
    validate_points(remaining, true)?;

    let mut next = *state;

    if remaining.len() < 2 {
        next.last_scroll_midpoint_y = None;
    }
    if remaining.is_empty() {
        next.last_position = None;
    }
    if let [only] = remaining {
        next.last_position = Some((only.x, only.y));
    }

    Ok(Transition {
        state: next,
        output: GestureOutput::default(),
    })
}

fn validate_points(points: &[TouchSample], allow_empty: bool) -> Result<(), GestureError> {
    if points.is_empty() && !allow_empty {
        return Err(GestureError::MalformedInput("callback carried no contact points".to_string()));
    }
    if let Some(index) = points.iter().position(|p| !p.has_finite_coordinates()) {
        return Err(GestureError::MalformedInput(format!(
            "contact {index} has a non-finite coordinate"
        )));
    }
    Ok(())
}

// ── Stateful recognizer ───────────────────────────────────────────────────────

/// Owns a [`GestureState`] and applies the pure transitions to it.
///
/// This is the object a host event loop holds: one per touch surface, fed
/// from the surface's lifecycle callbacks.  Malformed callbacks are logged at
/// debug level and leave the state untouched, so a single bad sample never
/// interrupts the stream.
///
/// # Example
///
/// ```rust
/// use picontrol_core::{GestureRecognizer, GestureConfig, InputEvent, TouchSample};
///
/// let mut pad = GestureRecognizer::new(GestureConfig::default());
/// pad.on_contact_start(&[TouchSample::new(10.0, 10.0, 1_000)]);
/// let out = pad.on_contact_move(&[TouchSample::new(13.0, 8.0, 1_016)]);
/// assert_eq!(out.events, vec![InputEvent::Move { dx: 3.0, dy: -2.0 }]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct GestureRecognizer {
    state: GestureState,
    config: GestureConfig,
}

impl GestureRecognizer {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            state: GestureState::default(),
            config,
        }
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Forgets every reference, including the last tap time.
    pub fn reset(&mut self) {
        self.state = GestureState::default();
    }

    pub fn on_contact_start(&mut self, points: &[TouchSample]) -> GestureOutput {
        let result = contact_start(&self.state, points, &self.config);
        self.apply("start", result)
    }

    pub fn on_contact_move(&mut self, points: &[TouchSample]) -> GestureOutput {
        let result = contact_move(&self.state, points, &self.config);
        self.apply("move", result)
    }

    pub fn on_contact_end(&mut self, remaining: &[TouchSample]) -> GestureOutput {
        let result = contact_end(&self.state, remaining);
        self.apply("end", result)
    }

    fn apply(&mut self, phase: &'static str, result: Result<Transition, GestureError>) -> GestureOutput {
        match result {
            Ok(transition) => {
                self.state = transition.state;
                transition.output
            }
            Err(e) => {
                debug!(phase, "ignoring touch callback: {e}");
                GestureOutput::default()
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
