//! Relay script: JSON lines that replay touch callbacks and discrete controls.
//!
//! Each non-blank line is one callback:
//!
//! ```text
//! {"phase":"start","touches":[{"x":10,"y":20}],"t":1000}
//! {"phase":"move","touches":[{"x":12,"y":21}],"t":1016}
//! {"phase":"end","touches":[],"t":1100}
//! {"phase":"key","key":"Enter"}
//! {"phase":"right_click"}
//! ```
//!
//! `touches` lists the contacts active *after* the callback, exactly as a
//! touch toolkit reports them.  `t` is the event time in milliseconds and is
//! optional on `end`.

use picontrol_core::{GestureError, TouchSample};
use serde::Deserialize;

use crate::application::trackpad::{Dispatch, TrackpadController};
use crate::application::ControlError;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ScriptTouch {
    pub x: f64,
    pub y: f64,
}

/// One parsed script line.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum ScriptLine {
    Start {
        touches: Vec<ScriptTouch>,
        t: i64,
    },
    Move {
        touches: Vec<ScriptTouch>,
        t: i64,
    },
    End {
        #[serde(default)]
        touches: Vec<ScriptTouch>,
        #[serde(default)]
        t: i64,
    },
    Key {
        key: String,
    },
    RightClick,
}

impl ScriptLine {
    /// Parses one line.  Blank lines yield `Ok(None)`.
    ///
    /// # Errors
    ///
    /// [`GestureError::MalformedInput`] when the line is not a valid script
    /// entry.
    pub fn parse(line: &str) -> Result<Option<Self>, GestureError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        serde_json::from_str(line)
            .map(Some)
            .map_err(|e| GestureError::MalformedInput(format!("bad script line: {e}")))
    }
}

fn samples(touches: &[ScriptTouch], t: i64) -> Vec<TouchSample> {
    touches.iter().map(|p| TouchSample::new(p.x, p.y, t)).collect()
}

/// Feeds one script line to the controller.
///
/// Blank lines do nothing and return an empty [`Dispatch`].
///
/// # Errors
///
/// [`ControlError::Input`] for an unparsable line, or whatever the discrete
/// control returned.
pub fn run_script_line(pad: &mut TrackpadController, line: &str) -> Result<Dispatch, ControlError> {
    let Some(entry) = ScriptLine::parse(line)? else {
        return Ok(Dispatch::default());
    };

    let dispatch = match entry {
        ScriptLine::Start { touches, t } => pad.on_touch_start(&samples(&touches, t)),
        ScriptLine::Move { touches, t } => pad.on_touch_move(&samples(&touches, t)),
        ScriptLine::End { touches, t } => pad.on_touch_end(&samples(&touches, t)),
        ScriptLine::Key { key } => {
            pad.press_key(&key)?;
            Dispatch {
                sent: 1,
                ..Dispatch::default()
            }
        }
        ScriptLine::RightClick => {
            pad.right_click()?;
            Dispatch {
                sent: 1,
                ..Dispatch::default()
            }
        }
    };
    Ok(dispatch)
}
