//! Error types for wspump.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use wspump::{Error, Message, Pump, Result};
//!
//! fn reply(pump: &Pump) -> Result<()> {
//!     match pump.send(Message::text("pong")) {
//!         Err(Error::QueueFull { .. }) => Ok(()), // drop under backpressure
//!         other => other,
//!     }
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`] |
//! | Connection | [`Error::Dial`], [`Error::ConnectionClosed`] |
//! | I/O | [`Error::Read`], [`Error::Write`], [`Error::Timeout`] |
//! | Backpressure | [`Error::QueueFull`] |
//! | Protocol | [`Error::Protocol`] |
//! | Load harness | [`Error::ResultsClosed`] |
//! | External | [`Error::Io`], [`Error::Json`], [`Error::WebSocket`] |

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;

use thiserror::Error;
use tokio_tungstenite::tungstenite::Error as WsError;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Every failure is local to one connection or one worker; nothing in this
/// enum is meant to take the process down except a failed listener bind.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when a config struct fails validation.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// Outbound connection could not be established.
    ///
    /// Covers TCP connect failures and rejected WebSocket handshakes.
    #[error("Dial {address} failed: {message}")]
    Dial {
        /// Address that was dialed.
        address: String,
        /// Description of the failure.
        message: String,
    },

    /// The connection has been shut down.
    ///
    /// Returned by every pump operation once the close signal has fired,
    /// and by socket reads when the peer closed the stream.
    #[error("Connection closed")]
    ConnectionClosed,

    // ========================================================================
    // I/O Errors
    // ========================================================================
    /// Reading a message from the socket failed.
    #[error("Read failed: {message}")]
    Read {
        /// Description of the read failure.
        message: String,
    },

    /// Writing a message to the socket failed.
    #[error("Write failed: {message}")]
    Write {
        /// Description of the write failure.
        message: String,
    },

    /// An I/O deadline expired.
    #[error("Timeout after {timeout_ms}ms: {operation}")]
    Timeout {
        /// Description of the operation that timed out.
        operation: String,
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    // ========================================================================
    // Backpressure
    // ========================================================================
    /// The outbound queue has no free slot.
    ///
    /// Nothing was enqueued. The caller decides whether to drop or retry.
    #[error("Queue full (capacity {capacity})")]
    QueueFull {
        /// Capacity of the queue that rejected the message.
        capacity: usize,
    },

    // ========================================================================
    // Protocol Errors
    // ========================================================================
    /// Message could not be mapped onto the wire.
    #[error("Protocol error: {message}")]
    Protocol {
        /// Description of the protocol violation.
        message: String,
    },

    // ========================================================================
    // Load Harness Errors
    // ========================================================================
    /// The latency results channel has no receiver left.
    ///
    /// A worker cannot publish samples once the collector is gone.
    #[error("Results channel closed")]
    ResultsClosed,

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a dial error.
    #[inline]
    pub fn dial(address: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Dial {
            address: address.into(),
            message: message.into(),
        }
    }

    /// Creates a read error.
    #[inline]
    pub fn read(message: impl Into<String>) -> Self {
        Self::Read {
            message: message.into(),
        }
    }

    /// Creates a write error.
    #[inline]
    pub fn write(message: impl Into<String>) -> Self {
        Self::Write {
            message: message.into(),
        }
    }

    /// Creates a timeout error.
    #[inline]
    pub fn timeout(operation: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout_ms,
        }
    }

    /// Creates a queue full error.
    #[inline]
    pub fn queue_full(capacity: usize) -> Self {
        Self::QueueFull { capacity }
    }

    /// Creates a protocol error.
    #[inline]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a timeout error.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Returns `true` if the connection is gone or never existed.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Dial { .. }
                | Self::ConnectionClosed
                | Self::Read { .. }
                | Self::Write { .. }
                | Self::WebSocket(_)
        )
    }

    /// Returns `true` if this is the backpressure signal.
    #[inline]
    #[must_use]
    pub fn is_backpressure(&self) -> bool {
        matches!(self, Self::QueueFull { .. })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::ErrorKind;

    #[test]
    fn test_error_display() {
        let err = Error::dial("ws://127.0.0.1:1/", "connection refused");
        assert_eq!(
            err.to_string(),
            "Dial ws://127.0.0.1:1/ failed: connection refused"
        );
    }

    #[test]
    fn test_queue_full_display() {
        let err = Error::queue_full(8);
        assert_eq!(err.to_string(), "Queue full (capacity 8)");
    }

    #[test]
    fn test_results_closed_is_not_a_connection_error() {
        let err = Error::ResultsClosed;
        assert_eq!(err.to_string(), "Results channel closed");
        assert!(!err.is_connection_error());
        assert!(!matches!(err, Error::Protocol { .. }));
    }

    #[test]
    fn test_is_timeout() {
        let timeout_err = Error::timeout("read", 5000);
        let other_err = Error::read("reset");

        assert!(timeout_err.is_timeout());
        assert!(!other_err.is_timeout());
    }

    #[test]
    fn test_is_connection_error() {
        assert!(Error::dial("x", "y").is_connection_error());
        assert!(Error::ConnectionClosed.is_connection_error());
        assert!(Error::read("eof").is_connection_error());
        assert!(Error::write("broken pipe").is_connection_error());
        assert!(!Error::queue_full(1).is_connection_error());
        assert!(!Error::config("test").is_connection_error());
    }

    #[test]
    fn test_is_backpressure() {
        assert!(Error::queue_full(1).is_backpressure());
        assert!(!Error::ConnectionClosed.is_backpressure());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = IoError::new(ErrorKind::AddrInUse, "address in use");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<String>("invalid").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
