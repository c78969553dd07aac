//! Request handler loop.
//!
//! Drives one [`Pump`]: receive a request, apply the response rule, send the
//! response as a text message. Any pump error ends the loop and closes the
//! pump; the handler itself keeps no state between messages.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::Error;
use crate::identifiers::ConnId;
use crate::protocol::pong_rule;
use crate::transport::Message;

use super::connection::Pump;

// ============================================================================
// Types
// ============================================================================

/// Pure function mapping a request payload to a response payload.
pub type ResponseRule = Arc<dyn Fn(&[u8]) -> Vec<u8> + Send + Sync>;

/// How a handler loop ended.
#[derive(Debug)]
pub struct HandlerSummary {
    /// Connection that was served.
    pub conn_id: ConnId,
    /// Number of requests answered.
    pub handled: u64,
    /// Pump error that ended the loop.
    pub reason: Error,
}

// ============================================================================
// RequestHandler
// ============================================================================

/// Answers every inbound message through a [`ResponseRule`].
#[derive(Clone)]
pub struct RequestHandler {
    rule: ResponseRule,
}

impl fmt::Debug for RequestHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestHandler").finish_non_exhaustive()
    }
}

impl Default for RequestHandler {
    fn default() -> Self {
        Self::new(pong_rule)
    }
}

impl RequestHandler {
    /// Creates a handler from a response rule.
    #[must_use]
    pub fn new(rule: impl Fn(&[u8]) -> Vec<u8> + Send + Sync + 'static) -> Self {
        Self {
            rule: Arc::new(rule),
        }
    }

    /// Serves `pump` until a receive or send fails.
    ///
    /// The pump is closed and both of its loops have exited when this
    /// returns.
    pub async fn run(&self, mut pump: Pump) -> HandlerSummary {
        let conn_id = pump.id();
        let mut handled = 0u64;

        let reason = loop {
            let request = match pump.receive().await {
                Ok(request) => request,
                Err(e) => break e,
            };

            let response = Message::text((self.rule)(request.payload()));
            if let Err(e) = pump.send(response) {
                break e;
            }
            handled += 1;
        };

        pump.close();
        pump.join().await;

        debug!(conn_id = %conn_id, handled, reason = %reason, "Handler finished");

        HandlerSummary {
            conn_id,
            handled,
            reason,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
