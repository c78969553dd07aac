//! Transport layer.
//!
//! The pump and the load workers talk to a socket only through the traits in
//! this module: read one message, write one message, close. Handshake and
//! framing belong to the implementation underneath.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   split()   ┌──────────────────┐
//! │   Socket     │────────────►│ MessageReader    │  owned by the read loop
//! │ (handshaked) │             ├──────────────────┤
//! │              │             │ MessageWriter    │  owned by the write loop
//! └──────────────┘             └──────────────────┘
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `message` | Transport-neutral [`Message`] |
//! | `websocket` | `tokio-tungstenite` socket and [`WsDialer`] |
//! | `memory` | In-process socket pair |
//! | `server` | Listener that pumps every accepted connection |

// ============================================================================
// Imports
// ============================================================================

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;

use crate::error::{Error, Result};

// ============================================================================
// Submodules
// ============================================================================

/// Transport-neutral message type.
pub mod message;

/// In-process socket pair.
pub mod memory;

/// Listener that pumps every accepted connection.
pub mod server;

/// WebSocket socket implementation and dialer.
pub mod websocket;

// ============================================================================
// Re-exports
// ============================================================================

pub use memory::{MemoryDialer, MemorySocket};
pub use message::{Message, MessageKind};
pub use server::Server;
pub use websocket::WsDialer;

// ============================================================================
// Traits
// ============================================================================

/// Receiving half of a socket.
#[async_trait]
pub trait MessageReader: Send + 'static {
    /// Waits for the next data message.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionClosed`] if the peer closed the stream
    /// - [`Error::Read`] on any transport failure
    async fn read_message(&mut self) -> Result<Message>;
}

/// Sending half of a socket.
#[async_trait]
pub trait MessageWriter: Send + 'static {
    /// Writes one message and flushes it.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionClosed`] if the writer was already closed
    /// - [`Error::Write`] on any transport failure
    /// - [`Error::Protocol`] if the message cannot be framed
    async fn write_message(&mut self, message: Message) -> Result<()>;

    /// Closes the socket.
    ///
    /// Closing twice is not an error.
    async fn close(&mut self) -> Result<()>;
}

/// An established duplex connection.
pub trait Socket: Send + 'static {
    /// Receiving half.
    type Reader: MessageReader;
    /// Sending half.
    type Writer: MessageWriter;

    /// Splits the socket so each direction can be driven independently.
    fn split(self) -> (Self::Reader, Self::Writer);
}

/// Opens new client sockets.
#[async_trait]
pub trait Dialer: Send + Sync + 'static {
    /// Socket type produced by this dialer.
    type Socket: Socket;

    /// Dials a fresh connection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Dial`] if the connection cannot be established.
    async fn dial(&self) -> Result<Self::Socket>;

    /// Human-readable target, used in logs.
    fn target(&self) -> &str;
}

// ============================================================================
// Deadlines
// ============================================================================

/// Runs `op` under an optional deadline.
///
/// An expired deadline becomes [`Error::Timeout`] naming `operation`.
pub(crate) async fn with_deadline<T>(
    limit: Option<Duration>,
    operation: &str,
    op: impl Future<Output = Result<T>>,
) -> Result<T> {
    match limit {
        Some(limit) => timeout(limit, op)
            .await
            .map_err(|_| Error::timeout(operation, limit.as_millis() as u64))?,
        None => op.await,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_deadline_passes_result_through() {
        let value = with_deadline(Some(Duration::from_secs(1)), "read", async { Ok(5) })
            .await
            .unwrap();
        assert_eq!(value, 5);
    }

    #[tokio::test]
    async fn test_deadline_expires() {
        let err = with_deadline::<()>(Some(Duration::from_millis(10)), "read", async {
            std::future::pending::<Result<()>>().await
        })
        .await
        .unwrap_err();

        assert!(err.is_timeout());
        assert_eq!(err.to_string(), "Timeout after 10ms: read");
    }

    #[tokio::test]
    async fn test_no_deadline() {
        let err = with_deadline::<()>(None, "write", async { Err(Error::write("boom")) })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Write { .. }));
    }
}
