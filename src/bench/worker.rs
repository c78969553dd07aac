//! Load worker.
//!
//! A worker dials its own connection and performs synchronous round trips on
//! it: write a ping, read one reply, verify it. It talks to the socket
//! directly; there is no pump on the client side.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

use crate::config::DEFAULT_CLOSE_TIMEOUT;
use crate::error::{Error, Result};
use crate::identifiers::WorkerId;
use crate::protocol::{PingRequest, verify_reply};
use crate::transport::{Dialer, MessageReader, MessageWriter, Socket, with_deadline};

use super::aggregator::LatencySample;
use super::counters::Counters;

// ============================================================================
// WorkerReport
// ============================================================================

/// How a worker's run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum WorkerOutcome {
    /// All iterations ran.
    Completed,
    /// The connection could not be established.
    DialFailed(String),
    /// A write or read failed; remaining iterations were skipped.
    Aborted(String),
}

/// Per-worker result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkerReport {
    /// Worker identifier.
    pub id: WorkerId,
    /// Requests this worker attempted.
    pub sent: u64,
    /// Requests this worker saw verified.
    pub verified: u64,
    /// How the run ended.
    pub outcome: WorkerOutcome,
}

// ============================================================================
// Worker
// ============================================================================

/// One concurrent unit of the load harness.
pub struct Worker<D> {
    /// Identity embedded in every ping.
    id: WorkerId,
    /// Opens this worker's connection.
    dialer: Arc<D>,
    /// Round trips to perform.
    messages: usize,
    /// Deadline for each write and each read.
    io_timeout: Option<Duration>,
    /// Totals shared with all other workers.
    counters: Arc<Counters>,
    /// Shared results channel.
    results: mpsc::Sender<LatencySample>,
}

impl<D: Dialer> Worker<D> {
    /// Creates a worker.
    #[must_use]
    pub fn new(
        id: WorkerId,
        dialer: Arc<D>,
        messages: usize,
        counters: Arc<Counters>,
        results: mpsc::Sender<LatencySample>,
    ) -> Self {
        Self {
            id,
            dialer,
            messages,
            io_timeout: None,
            counters,
            results,
        }
    }

    /// Bounds every write and every read.
    #[must_use]
    pub fn with_io_timeout(mut self, limit: Option<Duration>) -> Self {
        self.io_timeout = limit;
        self
    }

    /// Runs the worker to completion.
    ///
    /// Never fails: dial and I/O errors end this worker only and are
    /// reported in the returned [`WorkerReport`].
    pub async fn run(self) -> WorkerReport {
        let mut report = WorkerReport {
            id: self.id,
            sent: 0,
            verified: 0,
            outcome: WorkerOutcome::Completed,
        };

        let socket = match self.dialer.dial().await {
            Ok(socket) => socket,
            Err(e) => {
                warn!(worker_id = %self.id, addr = self.dialer.target(), error = %e, "Worker dial failed");
                report.outcome = WorkerOutcome::DialFailed(e.to_string());
                return report;
            }
        };

        let (mut reader, mut writer) = socket.split();
        debug!(worker_id = %self.id, messages = self.messages, "Worker started");

        for _ in 0..self.messages {
            match self.round_trip(&mut reader, &mut writer, &mut report).await {
                Ok(()) => {}
                Err(e) => {
                    debug!(worker_id = %self.id, error = %e, "Worker aborted");
                    report.outcome = WorkerOutcome::Aborted(e.to_string());
                    break;
                }
            }
        }

        // Bounded even without an I/O deadline, so a stalled peer cannot hold
        // up the join barrier
        let close_limit = self
            .io_timeout
            .map_or(DEFAULT_CLOSE_TIMEOUT, |limit| limit.min(DEFAULT_CLOSE_TIMEOUT));
        if let Err(e) = with_deadline(Some(close_limit), "close", writer.close()).await {
            trace!(worker_id = %self.id, error = %e, "Socket close failed");
        }

        debug!(
            worker_id = %self.id,
            sent = report.sent,
            verified = report.verified,
            "Worker finished"
        );

        report
    }

    /// One timed request/response cycle.
    ///
    /// An unverified reply is not an error.
    async fn round_trip<R: MessageReader, W: MessageWriter>(
        &self,
        reader: &mut R,
        writer: &mut W,
        report: &mut WorkerReport,
    ) -> Result<()> {
        let started = Instant::now();
        let ping = PingRequest::new(self.id).to_message()?;

        self.counters.record_sent();
        report.sent += 1;

        with_deadline(self.io_timeout, "write", writer.write_message(ping)).await?;
        let reply = with_deadline(self.io_timeout, "read", reader.read_message()).await?;

        if !verify_reply(reply.payload()) {
            trace!(worker_id = %self.id, "Reply not verified");
            return Ok(());
        }

        let sample = LatencySample::from(started.elapsed());
        self.results
            .send(sample)
            .await
            .map_err(|_| Error::ResultsClosed)?;

        self.counters.record_success();
        report.verified += 1;

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
