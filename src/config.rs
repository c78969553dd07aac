//! Pump and server configuration.
//!
//! Builder-style structs with defaults matching the stock echo server:
//! queues of 1000 messages each, no I/O deadlines, a one second limit on
//! the closing handshake, listening on `0.0.0.0:7778`.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use wspump::{PumpConfig, ServerConfig};
//!
//! let config = ServerConfig::default()
//!     .port(0)
//!     .pump(PumpConfig::default().outbound_capacity(64).write_timeout(Duration::from_secs(5)));
//! assert!(config.validate().is_ok());
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Default inbound queue capacity.
pub const DEFAULT_INBOUND_CAPACITY: usize = 1000;

/// Default outbound queue capacity.
pub const DEFAULT_OUTBOUND_CAPACITY: usize = 1000;

/// Default limit on the closing handshake once a connection shuts down.
pub const DEFAULT_CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

/// Default listen port of the echo server.
pub const DEFAULT_SERVER_PORT: u16 = 7778;

/// Default listen address of the echo server.
const DEFAULT_BIND_IP: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

// ============================================================================
// PumpConfig
// ============================================================================

/// Settings for one [`Pump`](crate::Pump).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PumpConfig {
    /// Capacity of the inbound queue (socket → `receive`).
    pub inbound_capacity: usize,
    /// Capacity of the outbound queue (`send` → socket).
    pub outbound_capacity: usize,
    /// Deadline for a single socket read. `None` waits forever.
    pub read_timeout: Option<Duration>,
    /// Deadline for a single socket write. `None` waits forever.
    pub write_timeout: Option<Duration>,
    /// Limit on flushing and closing the socket after shutdown. Always
    /// enforced; the socket is dropped once it expires.
    pub close_timeout: Duration,
}

impl Default for PumpConfig {
    fn default() -> Self {
        Self {
            inbound_capacity: DEFAULT_INBOUND_CAPACITY,
            outbound_capacity: DEFAULT_OUTBOUND_CAPACITY,
            read_timeout: None,
            write_timeout: None,
            close_timeout: DEFAULT_CLOSE_TIMEOUT,
        }
    }
}

impl PumpConfig {
    /// Sets the inbound queue capacity.
    #[inline]
    #[must_use]
    pub fn inbound_capacity(mut self, capacity: usize) -> Self {
        self.inbound_capacity = capacity;
        self
    }

    /// Sets the outbound queue capacity.
    #[inline]
    #[must_use]
    pub fn outbound_capacity(mut self, capacity: usize) -> Self {
        self.outbound_capacity = capacity;
        self
    }

    /// Sets the per-read deadline.
    #[inline]
    #[must_use]
    pub fn read_timeout(mut self, limit: Duration) -> Self {
        self.read_timeout = Some(limit);
        self
    }

    /// Sets the per-write deadline.
    #[inline]
    #[must_use]
    pub fn write_timeout(mut self, limit: Duration) -> Self {
        self.write_timeout = Some(limit);
        self
    }

    /// Sets the closing handshake limit.
    #[inline]
    #[must_use]
    pub fn close_timeout(mut self, limit: Duration) -> Self {
        self.close_timeout = limit;
        self
    }

    /// Checks that both queues can hold at least one message.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a capacity is zero.
    pub fn validate(&self) -> Result<()> {
        if self.inbound_capacity == 0 {
            return Err(Error::config("inbound_capacity must be at least 1"));
        }
        if self.outbound_capacity == 0 {
            return Err(Error::config("outbound_capacity must be at least 1"));
        }
        Ok(())
    }
}

// ============================================================================
// ServerConfig
// ============================================================================

/// Settings for the pumped WebSocket [`Server`](crate::Server).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to bind.
    pub ip: IpAddr,
    /// Port to bind. 0 lets the OS pick.
    pub port: u16,
    /// Settings applied to every accepted connection.
    pub pump: PumpConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            ip: DEFAULT_BIND_IP,
            port: DEFAULT_SERVER_PORT,
            pump: PumpConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Sets the bind address.
    #[inline]
    #[must_use]
    pub fn ip(mut self, ip: IpAddr) -> Self {
        self.ip = ip;
        self
    }

    /// Sets the bind port.
    #[inline]
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the per-connection pump settings.
    #[inline]
    #[must_use]
    pub fn pump(mut self, pump: PumpConfig) -> Self {
        self.pump = pump;
        self
    }

    /// Returns the socket address to bind.
    #[inline]
    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.ip, self.port)
    }

    /// Validates the embedded pump settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the pump settings are invalid.
    pub fn validate(&self) -> Result<()> {
        self.pump.validate()
    }
}

// ============================================================================
// Tests
// ============================================================================
