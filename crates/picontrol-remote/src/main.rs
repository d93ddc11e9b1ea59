//! PiControl remote entry point.
//!
//! Connects to the listener on the remote host and forwards input to it, one
//! JSON object per WebSocket text frame.
//!
//! # Usage
//!
//! ```text
//! picontrol [OPTIONS] <COMMAND>
//!
//! Commands:
//!   relay        Replay touch/keyboard input from JSON lines on stdin
//!   console      Send each stdin line as a console command
//!   forget-host  Remove the remembered host
//!
//! Options:
//!   --host   <HOST>  Remote host name or IP (remembered for next time)
//!   --port   <PORT>  Listener port [default: from config, 8765]
//!   --secure         Use wss:// instead of ws://
//!   --config <PATH>  Config file [default: platform config dir]
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable           | Description                 |
//! |--------------------|-----------------------------|
//! | `PICONTROL_HOST`   | Remote host                 |
//! | `PICONTROL_PORT`   | Listener port               |
//! | `PICONTROL_CONFIG` | Config file path            |
//! | `RUST_LOG`         | Log filter (overrides config) |
//!
//! # Session lifecycle
//!
//! 1. Load the config and install the tracing subscriber.
//! 2. Resolve the host: `--host` wins and is remembered, otherwise the
//!    remembered host is used.
//! 3. Open the channel and wait for the `Connected` notification.
//! 4. Feed stdin lines to the chosen controller until EOF, Ctrl+C, or the
//!    connection drops.
//! 5. Close the channel gracefully.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use picontrol_remote::application::{run_script_line, ConsoleController, ControlError, FrameSink, TrackpadController};
use picontrol_remote::domain::{ChannelEvent, Endpoint, RemoteConfig};
use picontrol_remote::infrastructure::{
    config_dir, config_file_path, load_config_from, CommandChannel, FileStore, HostPreference, TracingSink,
};

/// How long to wait for the remote side to acknowledge a close.
const CLOSE_GRACE: Duration = Duration::from_secs(2);

// ── CLI argument definitions ──────────────────────────────────────────────────

/// PiControl remote trackpad and command console.
#[derive(Debug, Parser)]
#[command(
    name = "picontrol",
    about = "Remote trackpad and command console for a PiControl host",
    version
)]
struct Cli {
    /// Remote host name or IP address.
    ///
    /// Remembered after a successful start, so later sessions may omit it.
    #[arg(long, env = "PICONTROL_HOST")]
    host: Option<String>,

    /// Listener port.  Overrides `[connection] port` in the config file.
    #[arg(long, env = "PICONTROL_PORT")]
    port: Option<u16>,

    /// Connect with `wss://`.
    #[arg(long)]
    secure: bool,

    /// Path to the config file.
    #[arg(long, env = "PICONTROL_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
enum Command {
    /// Replay touch callbacks, key presses and right clicks from JSON lines on stdin.
    Relay,
    /// Send each stdin line as a console command, e.g. `gpio_on 17`.
    Console,
    /// Remove the remembered host.
    ForgetHost,
}

impl Cli {
    fn config_path(&self) -> anyhow::Result<PathBuf> {
        match &self.config {
            Some(path) => Ok(path.clone()),
            None => config_file_path().context("no --config given and no platform config directory"),
        }
    }

    /// The host store lives next to the config file.
    fn host_preference(&self) -> anyhow::Result<HostPreference<FileStore>> {
        let dir = match self.config.as_ref().and_then(|p| p.parent()) {
            Some(parent) => parent.to_path_buf(),
            None => config_dir().context("could not locate the host store")?,
        };
        Ok(HostPreference::new(FileStore::in_dir(&dir)))
    }

    fn endpoint(&self, host: &str, config: &RemoteConfig) -> anyhow::Result<Endpoint> {
        let port = self.port.unwrap_or(config.connection.port);
        let secure = self.secure || config.connection.secure;
        Endpoint::new(host, port, secure).with_context(|| format!("invalid host '{host}'"))
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config_path()?;
    let config = load_config_from(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;

    // `RUST_LOG` wins; otherwise the configured level applies.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level)))
        .init();

    let hosts = cli.host_preference()?;

    if cli.command == Command::ForgetHost {
        if !hosts.forget().context("failed to update the host store")? {
            info!("no remembered host");
        }
        return Ok(());
    }

    let gesture = config
        .gesture
        .to_gesture_config()
        .context("invalid [gesture] section in config")?;

    let Some(host) = hosts
        .resolve(cli.host.as_deref())
        .context("failed to read the host store")?
    else {
        bail!("no remote host: pass --host or set PICONTROL_HOST");
    };
    let endpoint = cli.endpoint(&host, &config)?;

    let (channel, mut events) = CommandChannel::new(Arc::new(TracingSink));
    let channel = Arc::new(channel);
    channel.open(&endpoint).context("failed to start the connection")?;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    tokio::select! {
        connected = wait_for_open(&mut events) => connected?,
        _ = &mut ctrl_c => {
            info!("received Ctrl+C while connecting");
            channel.close();
            return Ok(());
        }
    }

    let sink: Arc<dyn FrameSink> = channel.clone();
    let mut handler: Box<dyn FnMut(&str)> = match cli.command {
        Command::Relay => {
            let mut pad = TrackpadController::new(gesture, sink);
            Box::new(move |line: &str| {
                if let Err(e) = run_script_line(&mut pad, line) {
                    report(&e);
                }
            })
        }
        Command::Console => {
            let console = ConsoleController::new(sink);
            Box::new(move |line: &str| {
                if line.trim().is_empty() {
                    return;
                }
                if let Err(e) = console.submit_line(line) {
                    report(&e);
                }
            })
        }
        Command::ForgetHost => return Ok(()),
    };

    let mut lines = spawn_stdin_reader();
    loop {
        tokio::select! {
            line = lines.recv() => match line {
                Some(line) => handler(&line),
                None => {
                    info!("end of input");
                    break;
                }
            },
            event = events.recv() => match event {
                Some(event) => {
                    info!("{}", event.status_line());
                    if event.is_terminal() {
                        return Ok(());
                    }
                }
                None => break,
            },
            _ = &mut ctrl_c => {
                info!("received Ctrl+C, closing");
                break;
            }
        }
    }

    channel.close();
    let drained = tokio::time::timeout(CLOSE_GRACE, async {
        while let Some(event) = events.recv().await {
            info!("{}", event.status_line());
            if event.is_terminal() {
                break;
            }
        }
    })
    .await;
    if drained.is_err() {
        debug!("remote side did not acknowledge the close in time");
    }
    Ok(())
}

/// Waits for the handshake to finish.
///
/// # Errors
///
/// Fails when the connection attempt ends without reaching `Open`.
async fn wait_for_open(events: &mut mpsc::Receiver<ChannelEvent>) -> anyhow::Result<()> {
    while let Some(event) = events.recv().await {
        info!("{}", event.status_line());
        if matches!(event, ChannelEvent::Connected { .. }) {
            return Ok(());
        }
        if event.is_terminal() {
            bail!("{}", event.status_line());
        }
    }
    bail!("connection task ended without a status")
}

/// Reads stdin on a plain thread so a pending read never holds up shutdown.
fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(64);
    std::thread::spawn(move || {
        for line in std::io::stdin().lines() {
            match line {
                Ok(line) => {
                    if tx.blocking_send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("failed to read stdin: {e}");
                    break;
                }
            }
        }
    });
    rx
}

fn report(error: &ControlError) {
    match error {
        // Already logged once by the channel.
        e if e.is_not_connected() => {}
        ControlError::Input(e) => debug!("skipping input: {e}"),
        e => warn!("{e}"),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_relay_without_options() {
        let cli = Cli::parse_from(["picontrol", "relay"]);
        assert_eq!(cli.command, Command::Relay);
        assert_eq!(cli.port, None);
        assert!(!cli.secure);
    }

    #[test]
    fn test_cli_host_and_port_override() {
        // Arrange / Act
        let cli = Cli::parse_from(["picontrol", "--host", "10.0.0.5", "--port", "9000", "console"]);

        // Assert
        assert_eq!(cli.host.as_deref(), Some("10.0.0.5"));
        assert_eq!(cli.port, Some(9000));
        assert_eq!(cli.command, Command::Console);
    }

    #[test]
    fn test_cli_forget_host_subcommand() {
        let cli = Cli::parse_from(["picontrol", "forget-host"]);
        assert_eq!(cli.command, Command::ForgetHost);
    }

    #[test]
    fn test_cli_requires_a_subcommand() {
        assert!(Cli::try_parse_from(["picontrol"]).is_err());
    }

    #[test]
    fn test_endpoint_uses_config_port_when_cli_port_absent() {
        let cli = Cli::parse_from(["picontrol", "relay"]);
        let mut config = RemoteConfig::default();
        config.connection.port = 9100;

        let endpoint = cli.endpoint("pi.local", &config).unwrap();

        assert_eq!(endpoint.url(), "ws://pi.local:9100");
    }

    #[test]
    fn test_endpoint_cli_port_and_secure_win() {
        let cli = Cli::parse_from(["picontrol", "--port", "443", "--secure", "relay"]);

        let endpoint = cli.endpoint("pi.local", &RemoteConfig::default()).unwrap();

        assert_eq!(endpoint.url(), "wss://pi.local:443");
    }

    #[test]
    fn test_endpoint_rejects_blank_host() {
        let cli = Cli::parse_from(["picontrol", "relay"]);
        assert!(cli.endpoint("  ", &RemoteConfig::default()).is_err());
    }

    #[test]
    fn test_explicit_config_path_is_used() {
        let cli = Cli::parse_from(["picontrol", "--config", "/tmp/pc/config.toml", "relay"]);
        assert_eq!(cli.config_path().unwrap(), PathBuf::from("/tmp/pc/config.toml"));
    }
}
