//! JSON message types for the two remote listeners.
//!
//! PiControl talks to two *different* programs on the remote host, each with
//! its own message contract:
//!
//! - **Format A: trackpad relay.**  Every frame is a JSON object with a
//!   `"type"` discriminant and the variant's fields flattened beside it:
//!
//!   ```json
//!   {"type":"mouse","dx":3,"dy":-1}
//!   {"type":"scroll","dy":100}
//!   {"type":"click","button":"left"}
//!   {"type":"key","key":"Enter"}
//!   ```
//!
//! - **Format B: command console.**  Every frame names a command and carries
//!   a positional parameter list of numbers and strings:
//!
//!   ```json
//!   {"command":"gpio_on","params":[18]}
//!   ```
//!
//! # Why two types instead of one?
//!
//! The listeners are not interoperable: the relay ignores frames without a
//! `"type"`, and the console rejects frames without a `"command"`.  Keeping
//! [`InputEvent`] and [`CommandMessage`] as distinct Rust types makes it a
//! compile-time error to send a console command down the trackpad pipeline.
//!
//! # Numbers on the wire
//!
//! Browsers serialize `12` as `12`, never `12.0`.  Some listeners parse the
//! trackpad deltas as integers, so integral values are written without a
//! fractional part (see [`serialize_js_number`]).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};

use crate::protocol::codec::ProtocolError;

/// Largest magnitude at which every integer is exactly representable in `f64`
/// (2^53).  Integral values beyond it keep their float representation.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// GPIO pin used when a GPIO command is sent without an explicit pin.
pub const DEFAULT_GPIO_PIN: i64 = 18;

// ── Format A: trackpad relay ──────────────────────────────────────────────────

/// Mouse button carried by a [`InputEvent::Click`].
///
/// Only `Left` is ever derived from a gesture (double-tap).  `Right` comes from
/// a dedicated control in the host UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    Left,
    Right,
}

/// A semantic input event produced by the trackpad surface.
///
/// Produced, immediately serialized, and discarded; events are never
/// buffered.
///
/// # Serde representation
///
/// ```json
/// {"type":"mouse","dx":1.5,"dy":-2}
/// {"type":"scroll","dy":-30}
/// {"type":"click","button":"right"}
/// {"type":"key","key":"a"}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum InputEvent {
    /// Relative pointer movement since the previous sample.
    #[serde(rename = "mouse")]
    Move {
        #[serde(serialize_with = "serialize_js_number")]
        dx: f64,
        #[serde(serialize_with = "serialize_js_number")]
        dy: f64,
    },

    /// Vertical scroll, already amplified.  Positive scrolls up/away.
    Scroll {
        #[serde(serialize_with = "serialize_js_number")]
        dy: f64,
    },

    /// A single mouse click.
    Click { button: MouseButton },

    /// A key press, named the way the host UI's keyboard reports it
    /// (`"a"`, `"Enter"`, `"Backspace"`).
    Key { key: String },
}

impl InputEvent {
    /// Returns the wire discriminant of this event.
    ///
    /// Used in log lines so that key contents are never written to the log.
    pub fn kind(&self) -> &'static str {
        match self {
            InputEvent::Move { .. } => "mouse",
            InputEvent::Scroll { .. } => "scroll",
            InputEvent::Click { .. } => "click",
            InputEvent::Key { .. } => "key",
        }
    }
}

/// Writes an `f64` the way JavaScript's `JSON.stringify` would.
///
/// Finite integral values inside the safe-integer range are emitted as JSON
/// integers; everything else falls back to the regular float encoding.
pub fn serialize_js_number<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if value.is_finite() && value.fract() == 0.0 && value.abs() <= MAX_SAFE_INTEGER {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

// ── Format B: command console ─────────────────────────────────────────────────

/// One positional parameter of a console command.
///
/// Serialized untagged, so `[18, 2.5, "backup.py"]` is a valid parameter list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandParam {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl CommandParam {
    /// Parses a console token into the narrowest parameter type that fits.
    ///
    /// Integers win over floats, and floats win over text, so `"17"` becomes
    /// `Integer(17)`, `"0.5"` becomes `Float(0.5)`, and `"backup.py"` stays text.
    /// Non-finite float spellings (`"NaN"`, `"inf"`) stay text because JSON
    /// cannot carry them.
    pub fn from_token(token: &str) -> Self {
        if let Ok(i) = token.parse::<i64>() {
            return CommandParam::Integer(i);
        }
        match token.parse::<f64>() {
            Ok(f) if f.is_finite() => CommandParam::Float(f),
            _ => CommandParam::Text(token.to_string()),
        }
    }
}

impl From<i64> for CommandParam {
    fn from(value: i64) -> Self {
        CommandParam::Integer(value)
    }
}

impl From<f64> for CommandParam {
    fn from(value: f64) -> Self {
        CommandParam::Float(value)
    }
}

impl From<&str> for CommandParam {
    fn from(value: &str) -> Self {
        CommandParam::Text(value.to_string())
    }
}

impl From<String> for CommandParam {
    fn from(value: String) -> Self {
        CommandParam::Text(value)
    }
}

/// A command for the remote console listener.
///
/// # Serde representation
///
/// ```json
/// {"command":"run_script","params":["backup.py"]}
/// ```
///
/// `params` defaults to an empty list when absent on the inbound side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandMessage {
    /// Command name as the remote listener knows it.
    pub command: String,
    /// Positional parameters.
    #[serde(default)]
    pub params: Vec<CommandParam>,
}

impl CommandMessage {
    /// Creates a command with arbitrary name and parameters.
    ///
    /// No validation is performed: the remote listener owns its allow-list.
    pub fn new(command: impl Into<String>, params: Vec<CommandParam>) -> Self {
        Self {
            command: command.into(),
            params,
        }
    }

    /// Creates a catalog command, filling in default parameters.
    ///
    /// GPIO commands without a pin default to [`DEFAULT_GPIO_PIN`].
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::MissingParameter`] for `run_script` without a
    /// script name.
    pub fn known(command: KnownCommand, mut params: Vec<CommandParam>) -> Result<Self, ProtocolError> {
        if params.is_empty() {
            if command.is_gpio() {
                params.push(CommandParam::Integer(DEFAULT_GPIO_PIN));
            } else if command == KnownCommand::RunScript {
                return Err(ProtocolError::MissingParameter {
                    command: command.as_str(),
                    parameter: "script name",
                });
            }
        }
        Ok(Self::new(command.as_str(), params))
    }

    /// Looks the command name up in the catalog.
    pub fn known_command(&self) -> Option<KnownCommand> {
        self.command.parse().ok()
    }
}

// ── Command catalog ───────────────────────────────────────────────────────────

/// Commands accepted by the reference console listener.
///
/// The catalog is advisory: [`CommandMessage::new`] can carry any name, but
/// the console warns before sending a name that is not listed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownCommand {
    GpioOn,
    GpioOff,
    GpioToggle,
    GpioRead,
    SystemInfo,
    GetTemperature,
    GetMemory,
    GetDiskUsage,
    RunScript,
    ListProcesses,
    Ping,
    Reboot,
    Shutdown,
}

impl KnownCommand {
    /// Every catalog entry, in the order the console lists them.
    pub const ALL: [KnownCommand; 13] = [
        KnownCommand::GpioOn,
        KnownCommand::GpioOff,
        KnownCommand::GpioToggle,
        KnownCommand::GpioRead,
        KnownCommand::SystemInfo,
        KnownCommand::GetTemperature,
        KnownCommand::GetMemory,
        KnownCommand::GetDiskUsage,
        KnownCommand::RunScript,
        KnownCommand::ListProcesses,
        KnownCommand::Ping,
        KnownCommand::Reboot,
        KnownCommand::Shutdown,
    ];

    /// Wire name of the command.
    pub fn as_str(self) -> &'static str {
        match self {
            KnownCommand::GpioOn => "gpio_on",
            KnownCommand::GpioOff => "gpio_off",
            KnownCommand::GpioToggle => "gpio_toggle",
            KnownCommand::GpioRead => "gpio_read",
            KnownCommand::SystemInfo => "system_info",
            KnownCommand::GetTemperature => "get_temperature",
            KnownCommand::GetMemory => "get_memory",
            KnownCommand::GetDiskUsage => "get_disk_usage",
            KnownCommand::RunScript => "run_script",
            KnownCommand::ListProcesses => "list_processes",
            KnownCommand::Ping => "ping",
            KnownCommand::Reboot => "reboot",
            KnownCommand::Shutdown => "shutdown",
        }
    }

    /// `true` for the four commands that take a GPIO pin.
    pub fn is_gpio(self) -> bool {
        matches!(
            self,
            KnownCommand::GpioOn | KnownCommand::GpioOff | KnownCommand::GpioToggle | KnownCommand::GpioRead
        )
    }
}

impl fmt::Display for KnownCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KnownCommand {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KnownCommand::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| ProtocolError::UnknownCommand(s.to_string()))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
