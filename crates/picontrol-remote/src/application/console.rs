//! ConsoleController: typed command lines → console frames.
//!
//! A command line is whitespace separated.  The first token names the
//! command; each further token becomes a parameter, as an integer if it parses
//! as one, else a float, else a string:
//!
//! ```text
//! gpio_on 17          → {"command":"gpio_on","params":[17]}
//! run_script backup.py → {"command":"run_script","params":["backup.py"]}
//! gpio_read           → {"command":"gpio_read","params":[18]}   (default pin)
//! ```
//!
//! Names outside the catalog are still sent, because the remote listener owns
//! its allow-list, but a warning is logged first.

use std::sync::Arc;

use picontrol_core::{CommandMessage, CommandParam, KnownCommand, ProtocolError};
use tracing::{info, warn};

use crate::application::sink::{send_message, FrameSink};
use crate::application::ControlError;

/// Parses one console line into a command message.
///
/// Catalog commands get their defaults filled in (see
/// [`CommandMessage::known`]).
///
/// # Errors
///
/// [`ProtocolError::EmptyCommand`] for a blank line, and
/// [`ProtocolError::MissingParameter`] for a catalog command missing a
/// required parameter.
pub fn parse_line(line: &str) -> Result<CommandMessage, ProtocolError> {
    let mut tokens = line.split_whitespace();
    let name = tokens.next().ok_or(ProtocolError::EmptyCommand)?;
    let params: Vec<CommandParam> = tokens.map(CommandParam::from_token).collect();

    match name.parse::<KnownCommand>() {
        Ok(known) => CommandMessage::known(known, params),
        Err(_) => {
            warn!(command = name, "command is not in the catalog; sending anyway");
            Ok(CommandMessage::new(name, params))
        }
    }
}

pub struct ConsoleController {
    sink: Arc<dyn FrameSink>,
}

impl ConsoleController {
    pub fn new(sink: Arc<dyn FrameSink>) -> Self {
        Self { sink }
    }

    /// Parses `line` and sends the resulting command.
    ///
    /// Returns the message that was sent.
    ///
    /// # Errors
    ///
    /// [`ControlError::Protocol`] for an unparsable line, or
    /// [`ControlError::Channel`] if the channel is not open.
    pub fn submit_line(&self, line: &str) -> Result<CommandMessage, ControlError> {
        let msg = parse_line(line)?;
        self.send(&msg)?;
        Ok(msg)
    }

    /// Sends a catalog command, as a console button would.
    ///
    /// # Errors
    ///
    /// As for [`submit_line`](Self::submit_line).
    pub fn send_known(&self, command: KnownCommand, params: Vec<CommandParam>) -> Result<CommandMessage, ControlError> {
        let msg = CommandMessage::known(command, params)?;
        self.send(&msg)?;
        Ok(msg)
    }

    fn send(&self, msg: &CommandMessage) -> Result<(), ControlError> {
        send_message(self.sink.as_ref(), msg)?;
        info!(command = %msg.command, params = msg.params.len(), "command sent");
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
