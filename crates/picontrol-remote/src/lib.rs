//! picontrol-remote library crate.
//!
//! PiControl turns a touch surface and a keyboard into a remote trackpad for
//! a small single-board computer, and offers a command console for the same
//! machine.  Both talk to a listener on the remote host over one persistent
//! WebSocket connection, one JSON object per text frame.
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! touch callbacks / key presses / console lines
//!         ↓
//! [picontrol-remote]
//!   ├── domain/           Pure types: config schema, endpoint, channel state
//!   ├── application/      Controllers: trackpad, console, relay script
//!   └── infrastructure/
//!         ├── channel/    WebSocket command channel (tokio-tungstenite)
//!         ├── config/     TOML config file
//!         ├── store/      Persisted host preference
//!         └── sink/       Where inbound frames go
//!         ↓
//! remote listener  (ws://<host>:8765)
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no I/O and no async.
//! - `application` depends on `domain` and `picontrol-core`, and reaches the
//!   network only through the [`application::FrameSink`] trait.
//! - `infrastructure` implements those traits with `tokio` and `tungstenite`.
//!
//! # For beginners: why a trait between controllers and the socket?
//!
//! The controllers decide *what* to send; the channel decides *how*.  With a
//! trait in between, the controller tests swap in a mock sink and never open
//! a socket.

/// Domain layer: configuration schema, endpoint and channel state types.
pub mod domain;

/// Application layer: trackpad and console controllers.
pub mod application;

/// Infrastructure layer: WebSocket channel, config file, host store, sinks.
pub mod infrastructure;
