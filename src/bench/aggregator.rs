//! Latency collection and summary statistics.
//!
//! Workers publish [`LatencySample`]s on one shared channel. A single
//! collector task appends them to a `Vec` until every sender is gone; the
//! runner drops its own sender only after all workers have been joined, so
//! [`Stats::from_samples`] always runs over the complete, no longer shared
//! sample set.

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::trace;

// ============================================================================
// Constants
// ============================================================================

/// Nanoseconds per millisecond, the display unit.
const NANOS_PER_MILLI: f64 = 1e6;

// ============================================================================
// LatencySample
// ============================================================================

/// Duration of one verified round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LatencySample {
    nanos: u64,
}

impl LatencySample {
    /// Creates a sample from raw nanoseconds.
    #[inline]
    #[must_use]
    pub const fn from_nanos(nanos: u64) -> Self {
        Self { nanos }
    }

    /// Returns the duration in nanoseconds.
    #[inline]
    #[must_use]
    pub const fn as_nanos(self) -> u64 {
        self.nanos
    }
}

impl From<Duration> for LatencySample {
    fn from(elapsed: Duration) -> Self {
        Self::from_nanos(u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX))
    }
}

// ============================================================================
// Collector
// ============================================================================

/// Spawns the collector task.
///
/// The task resolves to every sample received, in arrival order, once all
/// senders have been dropped.
pub fn spawn_collector(mut rx: mpsc::Receiver<LatencySample>) -> JoinHandle<Vec<LatencySample>> {
    tokio::spawn(async move {
        let mut samples = Vec::new();
        while let Some(sample) = rx.recv().await {
            samples.push(sample);
        }
        trace!(count = samples.len(), "Collector drained");
        samples
    })
}

// ============================================================================
// Stats
// ============================================================================

/// Summary of a sample set, in nanoseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    /// Number of samples.
    pub count: usize,
    /// Smallest sample.
    pub min_ns: u64,
    /// Largest sample.
    pub max_ns: u64,
    /// Mean, truncated to whole nanoseconds.
    pub mean_ns: u64,
}

impl Stats {
    /// Computes min/max/mean. An empty set yields all zeros.
    #[must_use]
    pub fn from_samples(samples: &[LatencySample]) -> Self {
        let mut min: Option<u64> = None;
        let mut max = 0u64;
        let mut sum = 0u128;

        for sample in samples {
            let nanos = sample.as_nanos();
            min = Some(min.map_or(nanos, |m| m.min(nanos)));
            max = max.max(nanos);
            sum += u128::from(nanos);
        }

        let count = samples.len();
        let mean_ns = if count == 0 {
            0
        } else {
            u64::try_from(sum / count as u128).unwrap_or(u64::MAX)
        };

        Self {
            count,
            min_ns: min.unwrap_or(0),
            max_ns: max,
            mean_ns,
        }
    }

    /// Smallest sample in milliseconds.
    #[inline]
    #[must_use]
    pub fn min_ms(&self) -> f64 {
        self.min_ns as f64 / NANOS_PER_MILLI
    }

    /// Largest sample in milliseconds.
    #[inline]
    #[must_use]
    pub fn max_ms(&self) -> f64 {
        self.max_ns as f64 / NANOS_PER_MILLI
    }

    /// Mean in milliseconds.
    #[inline]
    #[must_use]
    pub fn mean_ms(&self) -> f64 {
        self.mean_ns as f64 / NANOS_PER_MILLI
    }
}

// ============================================================================
// Tests
// ============================================================================
