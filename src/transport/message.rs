//! Transport-neutral message type.
//!
//! A [`Message`] is what crosses the pump queues. It is immutable once
//! built and moves by value from producer to queue to consumer.

// ============================================================================
// Imports
// ============================================================================

use tokio_tungstenite::tungstenite::Message as WsMessage;

use crate::error::{Error, Result};

// ============================================================================
// MessageKind
// ============================================================================

/// Frame kind of a [`Message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// UTF-8 text frame.
    Text,
    /// Binary frame.
    Binary,
    /// Control frame (ping/pong). Sent as a WebSocket ping.
    Control,
}

// ============================================================================
// Message
// ============================================================================

/// One application-level message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    kind: MessageKind,
    payload: Vec<u8>,
}

impl Message {
    /// Creates a message of the given kind.
    #[inline]
    #[must_use]
    pub fn new(kind: MessageKind, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            kind,
            payload: payload.into(),
        }
    }

    /// Creates a text message.
    #[inline]
    #[must_use]
    pub fn text(payload: impl Into<Vec<u8>>) -> Self {
        Self::new(MessageKind::Text, payload)
    }

    /// Creates a binary message.
    #[inline]
    #[must_use]
    pub fn binary(payload: impl Into<Vec<u8>>) -> Self {
        Self::new(MessageKind::Binary, payload)
    }

    /// Returns the frame kind.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    /// Returns the payload bytes.
    #[inline]
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Consumes the message, returning its payload.
    #[inline]
    #[must_use]
    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }

    /// Maps this message onto a WebSocket frame.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] if a text payload is not valid UTF-8.
    pub(crate) fn into_ws(self) -> Result<WsMessage> {
        match self.kind {
            MessageKind::Text => {
                let text = String::from_utf8(self.payload)
                    .map_err(|_| Error::protocol("text payload is not valid UTF-8"))?;
                Ok(WsMessage::Text(text.into()))
            }
            MessageKind::Binary => Ok(WsMessage::Binary(self.payload.into())),
            MessageKind::Control => Ok(WsMessage::Ping(self.payload.into())),
        }
    }

    /// Maps a WebSocket data frame onto a message.
    ///
    /// Returns `None` for close and raw frames, which never reach the pump.
    pub(crate) fn from_ws(message: WsMessage) -> Option<Self> {
        match message {
            WsMessage::Text(text) => Some(Self::text(text.as_str())),
            WsMessage::Binary(data) => Some(Self::binary(data.to_vec())),
            WsMessage::Ping(data) | WsMessage::Pong(data) => {
                Some(Self::new(MessageKind::Control, data.to_vec()))
            }
            WsMessage::Close(_) | WsMessage::Frame(_) => None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
