//! Domain layer: pure types with no I/O.
//!
//! - [`config`]   – the on-disk configuration schema and its defaults.
//! - [`endpoint`] – where the remote listener lives and how to address it.
//! - [`status`]   – the channel's connection state and status notifications.

pub mod config;
pub mod endpoint;
pub mod status;

pub use config::{ConnectionConfig, GestureSection, LoggingConfig, RemoteConfig};
pub use endpoint::{Endpoint, EndpointError, DEFAULT_PORT};
pub use status::{ChannelEvent, ChannelState};
