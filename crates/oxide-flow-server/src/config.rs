//! Server configuration.

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Result, ServerError};

/// Address the server listens on.
///
/// Accepts the forms applications usually pass around:
/// - `""` - the default port on all interfaces
/// - `"8080"` or `":8080"` - a port on all interfaces
/// - `"127.0.0.1:8080"` - a full socket address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenAddr(SocketAddr);

impl ListenAddr {
    /// Port used when none is given.
    pub const DEFAULT_PORT: u16 = 8080;

    /// Parses a listen address.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::InvalidAddress`] if `s` is neither a port nor a
    /// socket address.
    ///
    /// # Example
    ///
    /// ```
    /// use oxide_flow_server::ListenAddr;
    ///
    /// let addr = ListenAddr::parse(":3000").unwrap();
    /// assert_eq!(addr.port(), 3000);
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let invalid = || ServerError::InvalidAddress(s.to_string());

        if s.is_empty() {
            return Ok(Self::default());
        }
        if let Some(port) = s.strip_prefix(':') {
            return port.parse::<u16>().map(Self::from).map_err(|_| invalid());
        }
        if let Ok(port) = s.parse::<u16>() {
            return Ok(Self::from(port));
        }
        s.parse::<SocketAddr>().map(Self).map_err(|_| invalid())
    }

    /// Returns the socket address.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        self.0
    }

    /// Returns the port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.0.port()
    }
}

impl Default for ListenAddr {
    fn default() -> Self {
        Self::from(Self::DEFAULT_PORT)
    }
}

impl From<u16> for ListenAddr {
    fn from(port: u16) -> Self {
        Self(SocketAddr::from(([0, 0, 0, 0], port)))
    }
}

impl From<SocketAddr> for ListenAddr {
    fn from(addr: SocketAddr) -> Self {
        Self(addr)
    }
}

impl FromStr for ListenAddr {
    type Err = ServerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ListenAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind.
    pub addr: ListenAddr,
    /// How long to wait for open connections after a shutdown signal.
    pub shutdown_timeout: Duration,
}

impl ServerConfig {
    /// Default grace period for open connections on shutdown.
    pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

    /// Creates a config for `addr` with the default shutdown timeout.
    #[must_use]
    pub const fn new(addr: ListenAddr) -> Self {
        Self {
            addr,
            shutdown_timeout: Self::DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }

    /// Sets the shutdown timeout.
    #[must_use]
    pub const fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(ListenAddr::default())
    }
}
