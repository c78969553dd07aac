//! WebSocket socket implementation.
//!
//! Any handshaked `tokio_tungstenite::WebSocketStream` is a [`Socket`]. The
//! stream is split with `futures_util` so the reader and the writer can live
//! in different tasks. Ping/pong replies are left to tungstenite.

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{Error as WsError, Message as WsMessage};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, trace};
use url::Url;

use crate::error::{Error, Result};

use super::{Dialer, Message, MessageKind, MessageReader, MessageWriter, Socket};

// ============================================================================
// Socket
// ============================================================================

impl<S> Socket for WebSocketStream<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    type Reader = WsReader<S>;
    type Writer = WsWriter<S>;

    fn split(self) -> (Self::Reader, Self::Writer) {
        let (sink, stream) = StreamExt::split(self);
        (WsReader { stream }, WsWriter { sink, closed: false })
    }
}

// ============================================================================
// WsReader
// ============================================================================

/// Receiving half of a WebSocket stream.
pub struct WsReader<S> {
    stream: SplitStream<WebSocketStream<S>>,
}

#[async_trait]
impl<S> MessageReader for WsReader<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    async fn read_message(&mut self) -> Result<Message> {
        loop {
            match self.stream.next().await {
                Some(Ok(frame)) => match Message::from_ws(frame) {
                    // Control frames are answered by tungstenite itself
                    Some(message) if message.kind() == MessageKind::Control => {
                        trace!("Skipping control frame");
                    }
                    Some(message) => return Ok(message),
                    None => {
                        debug!("WebSocket closed by remote");
                        return Err(Error::ConnectionClosed);
                    }
                },
                Some(Err(e)) => return Err(Error::read(e.to_string())),
                None => return Err(Error::ConnectionClosed),
            }
        }
    }
}

// ============================================================================
// WsWriter
// ============================================================================

/// Sending half of a WebSocket stream.
pub struct WsWriter<S> {
    sink: SplitSink<WebSocketStream<S>, WsMessage>,
    closed: bool,
}

#[async_trait]
impl<S> MessageWriter for WsWriter<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    async fn write_message(&mut self, message: Message) -> Result<()> {
        if self.closed {
            return Err(Error::ConnectionClosed);
        }

        let frame = message.into_ws()?;
        self.sink
            .send(frame)
            .await
            .map_err(|e| Error::write(e.to_string()))
    }

    async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        match self.sink.close().await {
            Ok(()) => Ok(()),
            // The peer may have closed first
            Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => Ok(()),
            Err(e) => Err(Error::write(e.to_string())),
        }
    }
}

// ============================================================================
// WsDialer
// ============================================================================

/// Dials `ws://` URLs with `tokio_tungstenite::connect_async`.
#[derive(Debug, Clone)]
pub struct WsDialer {
    url: Url,
}

impl WsDialer {
    /// Creates a dialer for a `ws://` or `wss://` URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the URL does not parse or has another scheme.
    pub fn new(url: &str) -> Result<Self> {
        let url = Url::parse(url).map_err(|e| Error::config(format!("invalid URL {url}: {e}")))?;

        match url.scheme() {
            "ws" | "wss" => Ok(Self { url }),
            other => Err(Error::config(format!(
                "unsupported scheme {other}, expected ws or wss"
            ))),
        }
    }

    /// Creates a dialer from an already validated URL.
    #[inline]
    #[must_use]
    pub fn from_url(url: Url) -> Self {
        Self { url }
    }

    /// Returns the dial target.
    #[inline]
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl Dialer for WsDialer {
    type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

    async fn dial(&self) -> Result<Self::Socket> {
        let (stream, response) = connect_async(self.url.as_str())
            .await
            .map_err(|e| Error::dial(self.url.as_str(), e.to_string()))?;

        debug!(url = %self.url, status = %response.status(), "WebSocket dialed");

        Ok(stream)
    }

    fn target(&self) -> &str {
        self.url.as_str()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialer_accepts_ws_url() {
        let dialer = WsDialer::new("ws://127.0.0.1:2000").expect("valid url");
        assert_eq!(dialer.url().port(), Some(2000));
        assert_eq!(dialer.target(), "ws://127.0.0.1:2000/");
    }

    #[test]
    fn test_dialer_rejects_http_scheme() {
        let err = WsDialer::new("http://127.0.0.1:2000").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_dialer_rejects_garbage() {
        assert!(WsDialer::new("not a url").is_err());
    }

    #[tokio::test]
    async fn test_dial_refused_is_dial_error() {
        // Bind then drop to get a port with nothing listening
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let dialer = WsDialer::new(&format!("ws://127.0.0.1:{port}")).unwrap();
        let err = dialer.dial().await.unwrap_err();
        assert!(matches!(err, Error::Dial { .. }));
    }
}
