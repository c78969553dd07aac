//! Per-connection message pump.
//!
//! A [`Pump`] owns one socket and two tokio tasks:
//!
//! - the **read loop** moves messages from the socket into the bounded
//!   inbound queue drained by [`Pump::receive`];
//! - the **write loop** moves messages from the bounded outbound queue fed
//!   by [`Pump::send`] onto the socket, in FIFO order.
//!
//! Both loops race every wait against the close signal. When it fires the
//! write loop stops without draining the outbound queue and closes the
//! socket, giving up on the closing handshake after
//! [`PumpConfig::close_timeout`]; the read loop drops whatever message it
//! was about to enqueue.
//! A read or write failure fires the signal, so one failing direction takes
//! the other down with it.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use crate::config::PumpConfig;
use crate::error::{Error, Result};
use crate::identifiers::ConnId;
use crate::transport::{Message, MessageReader, MessageWriter, Socket, with_deadline};

use super::signal::{CloseHandle, CloseSignal};

// ============================================================================
// Pump
// ============================================================================

/// Bidirectional message pump over one socket.
///
/// # Ownership
///
/// `receive` takes `&mut self`, so the inbound queue has exactly one
/// consumer. `send` takes `&self` and never awaits. Use
/// [`Pump::close_handle`] to close the pump from another task.
///
/// Dropping a pump closes it.
pub struct Pump {
    /// Connection identifier for logs.
    id: ConnId,
    /// Inbound queue, filled by the read loop.
    inbound: mpsc::Receiver<Message>,
    /// Outbound queue, drained by the write loop.
    outbound: mpsc::Sender<Message>,
    /// Outbound queue capacity, reported in [`Error::QueueFull`].
    outbound_capacity: usize,
    /// Shared close signal.
    signal: Arc<CloseSignal>,
    /// Loop tasks, taken by [`Pump::join`].
    tasks: Option<(JoinHandle<()>, JoinHandle<()>)>,
}

impl Pump {
    /// Creates a pump with default settings and starts both loops.
    ///
    /// Must be called inside a tokio runtime.
    #[must_use]
    pub fn new<S: Socket>(socket: S) -> Self {
        Self::with_config(socket, &PumpConfig::default())
    }

    /// Creates a pump and starts both loops.
    ///
    /// Zero capacities are raised to 1.
    #[must_use]
    pub fn with_config<S: Socket>(socket: S, config: &PumpConfig) -> Self {
        let id = ConnId::next();
        let inbound_capacity = config.inbound_capacity.max(1);
        let outbound_capacity = config.outbound_capacity.max(1);

        let (inbound_tx, inbound) = mpsc::channel(inbound_capacity);
        let (outbound, outbound_rx) = mpsc::channel(outbound_capacity);
        let signal = CloseSignal::new();

        let (reader, writer) = socket.split();

        let read_task = tokio::spawn(read_loop(
            id,
            reader,
            inbound_tx,
            Arc::clone(&signal),
            config.clone(),
        ));
        let write_task = tokio::spawn(write_loop(
            id,
            writer,
            outbound_rx,
            Arc::clone(&signal),
            config.clone(),
        ));

        debug!(conn_id = %id, inbound_capacity, outbound_capacity, "Pump started");

        Self {
            id,
            inbound,
            outbound,
            outbound_capacity,
            signal,
            tasks: Some((read_task, write_task)),
        }
    }

    /// Returns the connection identifier.
    #[inline]
    #[must_use]
    pub fn id(&self) -> ConnId {
        self.id
    }

    /// Enqueues a message for the write loop without waiting.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionClosed`] if the pump is closed
    /// - [`Error::QueueFull`] if the outbound queue has no free slot
    pub fn send(&self, message: Message) -> Result<()> {
        if self.signal.is_fired() {
            return Err(Error::ConnectionClosed);
        }

        match self.outbound.try_send(message) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                trace!(conn_id = %self.id, "Outbound queue full");
                Err(Error::queue_full(self.outbound_capacity))
            }
            Err(TrySendError::Closed(_)) => Err(Error::ConnectionClosed),
        }
    }

    /// Waits for the next inbound message.
    ///
    /// Once the pump is closed this returns [`Error::ConnectionClosed`]
    /// immediately, even if messages are still queued.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if the pump is or becomes closed.
    pub async fn receive(&mut self) -> Result<Message> {
        tokio::select! {
            biased;

            () = self.signal.wait() => Err(Error::ConnectionClosed),

            message = self.inbound.recv() => message.ok_or(Error::ConnectionClosed),
        }
    }

    /// Closes the pump. Idempotent.
    ///
    /// Wakes both loops; the write loop then closes the socket.
    pub fn close(&self) {
        if self.signal.fire() {
            debug!(conn_id = %self.id, "Pump closed");
        }
    }

    /// Returns `true` once the pump is closed.
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.signal.is_fired()
    }

    /// Waits until the pump is closed, by any party.
    pub async fn closed(&self) {
        self.signal.wait().await;
    }

    /// Returns a handle that can close this pump from another task.
    #[must_use]
    pub fn close_handle(&self) -> CloseHandle {
        CloseHandle::new(Arc::clone(&self.signal))
    }

    /// Waits for both loops to exit.
    ///
    /// Does not close the pump; call [`Pump::close`] first to stop it.
    pub async fn join(mut self) {
        if let Some((read_task, write_task)) = self.tasks.take() {
            for (name, task) in [("read", read_task), ("write", write_task)] {
                if let Err(e) = task.await {
                    warn!(conn_id = %self.id, loop_name = name, error = %e, "Pump loop failed");
                }
            }
        }
        trace!(conn_id = %self.id, "Pump joined");
    }
}

impl Drop for Pump {
    fn drop(&mut self) {
        self.signal.fire();
    }
}

// ============================================================================
// Loops
// ============================================================================

/// Socket → inbound queue.
async fn read_loop<R: MessageReader>(
    id: ConnId,
    mut reader: R,
    inbound: mpsc::Sender<Message>,
    signal: Arc<CloseSignal>,
    config: PumpConfig,
) {
    loop {
        let result = tokio::select! {
            biased;

            () = signal.wait() => break,

            result = with_deadline(config.read_timeout, "read", reader.read_message()) => result,
        };

        let message = match result {
            Ok(message) => message,
            Err(Error::ConnectionClosed) => {
                debug!(conn_id = %id, "Socket closed by peer");
                signal.fire();
                break;
            }
            Err(e) => {
                debug!(conn_id = %id, error = %e, "Socket read failed");
                signal.fire();
                break;
            }
        };

        trace!(conn_id = %id, len = message.payload().len(), "Message read");

        tokio::select! {
            biased;

            // Shutdown wins; the message just read is dropped
            () = signal.wait() => break,

            sent = inbound.send(message) => {
                if sent.is_err() {
                    signal.fire();
                    break;
                }
            }
        }
    }

    debug!(conn_id = %id, "Read loop terminated");
}

/// Outbound queue → socket.
async fn write_loop<W: MessageWriter>(
    id: ConnId,
    mut writer: W,
    mut outbound: mpsc::Receiver<Message>,
    signal: Arc<CloseSignal>,
    config: PumpConfig,
) {
    loop {
        let message = tokio::select! {
            biased;

            () = signal.wait() => break,

            message = outbound.recv() => match message {
                Some(message) => message,
                None => {
                    signal.fire();
                    break;
                }
            },
        };

        let result = tokio::select! {
            biased;

            () = signal.wait() => break,

            result = with_deadline(config.write_timeout, "write", writer.write_message(message)) => result,
        };

        if let Err(e) = result {
            debug!(conn_id = %id, error = %e, "Socket write failed");
            signal.fire();
            break;
        }

        trace!(conn_id = %id, "Message written");
    }

    let dropped = outbound.len();
    if dropped > 0 {
        debug!(conn_id = %id, dropped, "Discarded unsent messages on close");
    }

    // A write cancelled above may have left a frame buffered; a stalled peer
    // must not keep the socket alive past the close limit
    if let Err(e) = with_deadline(Some(config.close_timeout), "close", writer.close()).await {
        debug!(conn_id = %id, error = %e, "Socket close failed");
    }
    drop(writer);

    debug!(conn_id = %id, "Write loop terminated");
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use proptest::prelude::*;
    use tokio::time::timeout;
    use tokio_test::assert_ok;

    use crate::transport::{Dialer, MemorySocket, MessageKind, WsDialer};

    const WAIT: Duration = Duration::from_secs(2);

    fn small_config(capacity: usize) -> PumpConfig {
        PumpConfig::default()
            .inbound_capacity(capacity)
            .outbound_capacity(capacity)
    }

    #[tokio::test]
    async fn test_receive_delivers_peer_messages() {
        let (local, peer) = MemorySocket::pair(8);
        let mut pump = Pump::new(local);
        let (_peer_read, mut peer_write) = peer.split();

        peer_write.write_message(Message::text("hello")).await.unwrap();
        peer_write.write_message(Message::binary(vec![1, 2, 3])).await.unwrap();

        let first = timeout(WAIT, pump.receive()).await.unwrap().unwrap();
        let second = timeout(WAIT, pump.receive()).await.unwrap().unwrap();

        assert_eq!(first.payload(), b"hello");
        assert_eq!(second.kind(), MessageKind::Binary);
        assert_eq!(second.payload(), &[1, 2, 3]);
    }

    #[tokio::test]
    async fn test_send_reaches_peer() {
        let (local, peer) = MemorySocket::pair(8);
        let pump = Pump::new(local);
        let (mut peer_read, _peer_write) = peer.split();

        assert_ok!(pump.send(Message::text("pong")));

        let written = timeout(WAIT, peer_read.read_message()).await.unwrap().unwrap();
        assert_eq!(written.payload(), b"pong");
    }

    #[tokio::test]
    async fn test_send_on_full_queue_returns_queue_full() {
        let (local, _peer) = MemorySocket::pair(1);
        let pump = Pump::with_config(local, &small_config(2));

        // Current-thread runtime: the write loop cannot run between these calls
        assert_ok!(pump.send(Message::text("1")));
        assert_ok!(pump.send(Message::text("2")));

        let err = pump.send(Message::text("3")).unwrap_err();
        assert!(matches!(err, Error::QueueFull { capacity: 2 }));
        assert!(!pump.is_closed());
    }

    #[tokio::test]
    async fn test_operations_after_close_fail_fast() {
        let (local, _peer) = MemorySocket::pair(8);
        let mut pump = Pump::new(local);

        pump.close();
        pump.close();

        assert!(pump.is_closed());
        assert!(matches!(
            pump.send(Message::text("late")),
            Err(Error::ConnectionClosed)
        ));

        let received = timeout(WAIT, pump.receive()).await.expect("receive must not block");
        assert!(matches!(received, Err(Error::ConnectionClosed)));
    }

    #[tokio::test]
    async fn test_close_wakes_blocked_receive() {
        let (local, _peer) = MemorySocket::pair(8);
        let mut pump = Pump::new(local);
        let handle = pump.close_handle();

        let closer = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            handle.close()
        });

        let received = timeout(WAIT, pump.receive()).await.unwrap();
        assert!(matches!(received, Err(Error::ConnectionClosed)));
        assert!(closer.await.unwrap());
    }

    #[tokio::test]
    async fn test_close_closes_socket_and_joins() {
        let (local, peer) = MemorySocket::pair(8);
        let pump = Pump::new(local);
        let (mut peer_read, _peer_write) = peer.split();

        pump.close();
        timeout(WAIT, pump.join()).await.expect("loops exit after close");

        let read = timeout(WAIT, peer_read.read_message()).await.unwrap();
        assert!(matches!(read, Err(Error::ConnectionClosed)));
    }

    #[tokio::test]
    async fn test_peer_close_closes_pump() {
        let (local, peer) = MemorySocket::pair(8);
        let mut pump = Pump::new(local);
        drop(peer);

        let received = timeout(WAIT, pump.receive()).await.unwrap();
        assert!(matches!(received, Err(Error::ConnectionClosed)));
        timeout(WAIT, pump.closed()).await.expect("signal fired");
    }

    #[tokio::test]
    async fn test_read_timeout_closes_pump() {
        let (local, _peer) = MemorySocket::pair(8);
        let config = PumpConfig::default().read_timeout(Duration::from_millis(20));
        let pump = Pump::with_config(local, &config);

        timeout(WAIT, pump.closed()).await.expect("idle read times out");
        assert!(pump.is_closed());
    }

    #[tokio::test]
    async fn test_write_failure_closes_pump() {
        let (local, peer) = MemorySocket::pair(8);
        let pump = Pump::new(local);
        let (peer_read, _peer_write) = peer.split();
        drop(peer_read);

        assert_ok!(pump.send(Message::text("into the void")));
        timeout(WAIT, pump.closed()).await.expect("write error fires close");
    }

    #[tokio::test]
    async fn test_drop_stops_loops() {
        let (local, peer) = MemorySocket::pair(8);
        let pump = Pump::new(local);
        let (mut peer_read, _peer_write) = peer.split();

        drop(pump);

        let read = timeout(WAIT, peer_read.read_message()).await.unwrap();
        assert!(matches!(read, Err(Error::ConnectionClosed)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_close_is_idempotent() {
        let (local, _peer) = MemorySocket::pair(8);
        let pump = Pump::new(local);

        let closers: Vec<_> = (0..32)
            .map(|_| {
                let handle = pump.close_handle();
                tokio::spawn(async move { handle.close() })
            })
            .collect();

        let mut fired = 0;
        for closer in closers {
            if closer.await.unwrap() {
                fired += 1;
            }
        }
        pump.close();

        assert_eq!(fired, 1);
        timeout(WAIT, pump.join()).await.expect("loops exit");
    }

    #[tokio::test]
    async fn test_close_discards_queued_outbound() {
        let (local, peer) = MemorySocket::pair(1);
        let pump = Pump::with_config(local, &small_config(8));
        let (mut peer_read, _peer_write) = peer.split();

        for i in 0..5 {
            assert_ok!(pump.send(Message::text(i.to_string())));
        }
        // Write loop fills the one-slot socket buffer, then parks on "1"
        tokio::time::sleep(Duration::from_millis(20)).await;

        pump.close();
        timeout(WAIT, pump.join()).await.expect("loops exit after close");

        let first = timeout(WAIT, peer_read.read_message()).await.unwrap().unwrap();
        assert_eq!(first.payload(), b"0");

        let rest = timeout(WAIT, peer_read.read_message()).await.unwrap();
        assert!(matches!(rest, Err(Error::ConnectionClosed)));
    }

    #[tokio::test]
    async fn test_close_releases_websocket_when_peer_stops_reading() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("ws://{}", listener.local_addr().unwrap());
        let accept = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            tokio_tungstenite::accept_async(stream).await.unwrap()
        });

        // Connected, never read from
        let _client = WsDialer::new(&url).unwrap().dial().await.unwrap();
        let pump = Pump::new(accept.await.unwrap());

        for _ in 0..64 {
            assert_ok!(pump.send(Message::binary(vec![0u8; 1 << 20])));
        }
        tokio::time::sleep(Duration::from_millis(500)).await;

        pump.close();
        timeout(Duration::from_secs(3), pump.join())
            .await
            .expect("socket released within the close limit");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_outbound_is_fifo(
            payloads in proptest::collection::vec(proptest::collection::vec(any::<u8>(), 0..16), 1..40),
            capacity in 1usize..8,
        ) {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();

            let written = rt.block_on(async {
                let (local, peer) = MemorySocket::pair(capacity);
                let pump = Pump::with_config(local, &small_config(capacity));
                let (mut peer_read, _peer_write) = peer.split();

                let mut written = Vec::with_capacity(payloads.len());
                for payload in &payloads {
                    // Backpressure: let the write loop drain, then retry
                    loop {
                        match pump.send(Message::binary(payload.clone())) {
                            Ok(()) => break,
                            Err(Error::QueueFull { .. }) => {
                                let message = peer_read.read_message().await.unwrap();
                                written.push(message.into_payload());
                            }
                            Err(e) => panic!("unexpected send error: {e}"),
                        }
                    }
                }
                while written.len() < payloads.len() {
                    written.push(peer_read.read_message().await.unwrap().into_payload());
                }
                written
            });

            prop_assert_eq!(written, payloads);
        }
    }
}
