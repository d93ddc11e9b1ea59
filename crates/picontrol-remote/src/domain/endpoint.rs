//! Address of the remote listener.

use std::fmt;

use thiserror::Error;

/// Port the remote listeners use unless configured otherwise.
pub const DEFAULT_PORT: u16 = 8765;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EndpointError {
    #[error("host name is empty")]
    EmptyHost,

    #[error("host name `{0}` must not contain a scheme, path or whitespace")]
    InvalidHost(String),
}

/// A named host, a port, and whether to use TLS.
///
/// # Example
///
/// ```rust
/// use picontrol_remote::domain::Endpoint;
///
/// let ep = Endpoint::new("raspberrypi.local", 8765, false).unwrap();
/// assert_eq!(ep.url(), "ws://raspberrypi.local:8765");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    host: String,
    port: u16,
    secure: bool,
}

impl Endpoint {
    /// Builds an endpoint from a user-supplied host.
    ///
    /// Surrounding whitespace is trimmed.  IPv6 literals may be given with or
    /// without brackets.
    ///
    /// # Errors
    ///
    /// [`EndpointError::EmptyHost`] for a blank host, and
    /// [`EndpointError::InvalidHost`] when the host looks like a URL rather
    /// than a name.
    pub fn new(host: &str, port: u16, secure: bool) -> Result<Self, EndpointError> {
        let host = host.trim();
        if host.is_empty() {
            return Err(EndpointError::EmptyHost);
        }
        if host.contains("://") || host.contains('/') || host.chars().any(char::is_whitespace) {
            return Err(EndpointError::InvalidHost(host.to_string()));
        }
        Ok(Self {
            host: host.to_string(),
            port,
            secure,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn is_secure(&self) -> bool {
        self.secure
    }

    /// `ws://host:port` or `wss://host:port`.
    pub fn url(&self) -> String {
        let scheme = if self.secure { "wss" } else { "ws" };
        // Bare IPv6 literals need brackets before the port separator.
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("{scheme}://[{}]:{}", self.host, self.port)
        } else {
            format!("{scheme}://{}:{}", self.host, self.port)
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url())
    }
}
