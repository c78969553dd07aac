//! In-process socket pair.
//!
//! Two [`MemorySocket`]s joined by bounded channels behave like the two ends
//! of a connection: what one end writes the other reads, and closing or
//! dropping one end makes the other read [`Error::ConnectionClosed`]. A small
//! capacity makes writes block until the peer reads, which is how a slow
//! peer is simulated.

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::{Error, Result};

use super::{Dialer, Message, MessageReader, MessageWriter, Socket};

// ============================================================================
// MemorySocket
// ============================================================================

/// One end of an in-process connection.
pub struct MemorySocket {
    tx: mpsc::Sender<Message>,
    rx: mpsc::Receiver<Message>,
}

impl MemorySocket {
    /// Creates a connected pair, each direction buffering `capacity` messages.
    #[must_use]
    pub fn pair(capacity: usize) -> (Self, Self) {
        let capacity = capacity.max(1);
        let (a_tx, b_rx) = mpsc::channel(capacity);
        let (b_tx, a_rx) = mpsc::channel(capacity);

        (Self { tx: a_tx, rx: a_rx }, Self { tx: b_tx, rx: b_rx })
    }
}

impl Socket for MemorySocket {
    type Reader = MemoryReader;
    type Writer = MemoryWriter;

    fn split(self) -> (Self::Reader, Self::Writer) {
        (
            MemoryReader { rx: self.rx },
            MemoryWriter { tx: Some(self.tx) },
        )
    }
}

/// Receiving half of a [`MemorySocket`].
pub struct MemoryReader {
    rx: mpsc::Receiver<Message>,
}

#[async_trait]
impl MessageReader for MemoryReader {
    async fn read_message(&mut self) -> Result<Message> {
        self.rx.recv().await.ok_or(Error::ConnectionClosed)
    }
}

/// Sending half of a [`MemorySocket`].
pub struct MemoryWriter {
    tx: Option<mpsc::Sender<Message>>,
}

#[async_trait]
impl MessageWriter for MemoryWriter {
    async fn write_message(&mut self, message: Message) -> Result<()> {
        let tx = self.tx.as_ref().ok_or(Error::ConnectionClosed)?;
        tx.send(message)
            .await
            .map_err(|_| Error::write("peer dropped"))
    }

    async fn close(&mut self) -> Result<()> {
        self.tx = None;
        Ok(())
    }
}

// ============================================================================
// MemoryDialer
// ============================================================================

/// Dialer that hands the far end of every new pair to `accept`.
///
/// `accept` plays the server: typically it spawns a task that drives the
/// socket it is given.
pub struct MemoryDialer<F> {
    accept: F,
    capacity: usize,
}

impl<F> MemoryDialer<F>
where
    F: Fn(MemorySocket) + Send + Sync + 'static,
{
    /// Creates a dialer with the given per-direction capacity.
    #[must_use]
    pub fn new(capacity: usize, accept: F) -> Self {
        Self { accept, capacity }
    }
}

#[async_trait]
impl<F> Dialer for MemoryDialer<F>
where
    F: Fn(MemorySocket) + Send + Sync + 'static,
{
    type Socket = MemorySocket;

    async fn dial(&self) -> Result<MemorySocket> {
        let (client, server) = MemorySocket::pair(self.capacity);
        (self.accept)(server);
        Ok(client)
    }

    fn target(&self) -> &str {
        "memory"
    }
}

// ============================================================================
// Tests
// ============================================================================
