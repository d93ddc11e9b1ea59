//! Infrastructure layer: everything that touches the network or the disk.
//!
//! **Dependency rule**: this layer may depend on `application`, `domain` and
//! `picontrol_core`, but MUST NOT be imported by the `application` or
//! `domain` layers.
//!
//! # Sub-modules
//!
//! - **`channel`** – [`CommandChannel`], the WebSocket connection to the
//!   remote listener.  Implements [`FrameSink`](crate::application::FrameSink).
//!
//! - **`config`** – loads and saves the TOML config file from the platform
//!   config directory.
//!
//! - **`store`** – the persisted key-value store holding the remembered host.
//!
//! - **`sink`** – [`InboundSink`](crate::application::InboundSink)
//!   implementations for frames coming back from the remote host.

pub mod channel;
pub mod config;
pub mod sink;
pub mod store;

pub use channel::CommandChannel;
pub use config::{config_dir, config_file_path, load_config_from, save_config_to, ConfigError};
pub use sink::{RecordingSink, TracingSink};
pub use store::{FileStore, HostPreference, KeyValueStore, MemoryStore, StoreError, HOST_KEY};
