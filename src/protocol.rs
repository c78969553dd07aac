//! Ping/pong wire payloads.
//!
//! JSON objects carried in text frames.
//!
//! # Format
//!
//! Request:
//! ```json
//! { "msg": "ping", "id": "<workerId>" }
//! ```
//!
//! Response:
//! ```json
//! { "msg": "pong" }
//! ```

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::{from_slice, to_vec};

use crate::error::Result;
use crate::identifiers::WorkerId;
use crate::transport::Message;

// ============================================================================
// Constants
// ============================================================================

/// Token carried by requests.
pub const PING: &str = "ping";

/// Token a reply must carry to be accepted.
pub const PONG: &str = "pong";

/// Canned response body.
const PONG_BODY: &[u8] = br#"{"msg":"pong"}"#;

// ============================================================================
// Payloads
// ============================================================================

/// Request sent by a load worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingRequest {
    /// Always [`PING`].
    pub msg: String,
    /// Sending worker, as a decimal string.
    pub id: String,
}

impl PingRequest {
    /// Creates a ping tagged with `worker`.
    #[must_use]
    pub fn new(worker: WorkerId) -> Self {
        Self {
            msg: PING.to_string(),
            id: worker.to_string(),
        }
    }

    /// Encodes the request as a text message.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) if serialization fails.
    pub fn to_message(&self) -> Result<Message> {
        Ok(Message::text(to_vec(self)?))
    }
}

/// Reply expected from the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PongResponse {
    /// [`PONG`] when the reply is valid.
    pub msg: String,
}

// ============================================================================
// Rules
// ============================================================================

/// Response rule of the stock server: every request gets `{"msg":"pong"}`.
#[must_use]
pub fn pong_rule(_request: &[u8]) -> Vec<u8> {
    PONG_BODY.to_vec()
}

/// Returns `true` iff `payload` decodes to a reply whose `msg` is `"pong"`.
///
/// Anything else, including undecodable bytes, is simply not verified.
#[must_use]
pub fn verify_reply(payload: &[u8]) -> bool {
    from_slice::<PongResponse>(payload).is_ok_and(|reply| reply.msg == PONG)
}

// ============================================================================
// Tests
// ============================================================================
