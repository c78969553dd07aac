//! End-of-run report.

use std::fmt;

use serde::Serialize;

use super::aggregator::Stats;
use super::worker::{WorkerOutcome, WorkerReport};

/// Everything a load run produced.
#[derive(Debug, Clone, Serialize)]
pub struct BenchReport {
    /// Requests attempted across all workers.
    pub sent: u64,
    /// Requests answered with a verified reply.
    pub succeeded: u64,
    /// Latency summary over all verified round trips.
    pub stats: Stats,
    /// Per-worker results, ordered by worker id.
    pub workers: Vec<WorkerReport>,
}

impl BenchReport {
    /// Number of workers that could not connect.
    #[must_use]
    pub fn dial_failures(&self) -> usize {
        self.workers
            .iter()
            .filter(|w| matches!(w.outcome, WorkerOutcome::DialFailed(_)))
            .count()
    }
}

impl fmt::Display for BenchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "count: {}, success: {}", self.sent, self.succeeded)?;
        write!(
            f,
            "maxLat: {:8.2}ms, minLat: {:8.2}ms, avgLat: {:8.2}ms",
            self.stats.max_ms(),
            self.stats.min_ms(),
            self.stats.mean_ms()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::identifiers::WorkerId;

    fn report() -> BenchReport {
        BenchReport {
            sent: 3,
            succeeded: 2,
            stats: Stats {
                count: 2,
                min_ns: 1_000_000,
                max_ns: 3_000_000,
                mean_ns: 2_000_000,
            },
            workers: vec![
                WorkerReport {
                    id: WorkerId::new(0),
                    sent: 3,
                    verified: 2,
                    outcome: WorkerOutcome::Completed,
                },
                WorkerReport {
                    id: WorkerId::new(1),
                    sent: 0,
                    verified: 0,
                    outcome: WorkerOutcome::DialFailed("refused".into()),
                },
            ],
        }
    }

    #[test]
    fn test_display_summary() {
        assert_eq!(
            report().to_string(),
            "count: 3, success: 2\nmaxLat:     3.00ms, minLat:     1.00ms, avgLat:     2.00ms"
        );
    }

    #[test]
    fn test_dial_failures() {
        assert_eq!(report().dial_failures(), 1);
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(report()).unwrap();
        assert_eq!(json["sent"], 3);
        assert_eq!(json["stats"]["mean_ns"], 2_000_000);
        assert_eq!(json["workers"][0]["id"], 0);
        assert_eq!(json["workers"][0]["outcome"]["status"], "completed");
        assert_eq!(json["workers"][1]["outcome"]["reason"], "refused");
    }
}
