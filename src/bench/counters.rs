//! Shared round-trip counters.
//!
//! One [`Counters`] is shared by every worker of a run through an `Arc`.
//! Increments are atomic; the final values are read after the join
//! barrier.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Process-wide totals of one load run.
#[derive(Debug, Default)]
pub struct Counters {
    sent: AtomicU64,
    succeeded: AtomicU64,
}

/// Point-in-time copy of [`Counters`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CounterSnapshot {
    /// Requests attempted.
    pub sent: u64,
    /// Requests answered with a verified reply.
    pub succeeded: u64,
}

impl Counters {
    /// Creates zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one send attempt.
    #[inline]
    pub fn record_sent(&self) {
        self.sent.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts one verified round trip.
    #[inline]
    pub fn record_success(&self) {
        self.succeeded.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the current totals.
    #[must_use]
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            sent: self.sent.load(Ordering::Relaxed),
            succeeded: self.succeeded.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_increments_are_not_lost() {
        let counters = Arc::new(Counters::new());

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let counters = Arc::clone(&counters);
                tokio::spawn(async move {
                    for i in 0..1000 {
                        counters.record_sent();
                        if i % 2 == 0 {
                            counters.record_success();
                        }
                    }
                })
            })
            .collect();

        for task in tasks {
            task.await.unwrap();
        }

        let snapshot = counters.snapshot();
        assert_eq!(snapshot.sent, 16_000);
        assert_eq!(snapshot.succeeded, 8_000);
    }
}
