//! Concurrent ping/pong load harness.
//!
//! N workers each dial their own connection and perform M synchronous round
//! trips. Shared [`Counters`] track attempts and verified replies; latency
//! samples flow through one channel to a collector and are summarised once
//! every worker has finished.
//!
//! # Example
//!
//! ```no_run
//! use wspump::bench::{self, BenchConfig};
//!
//! # async fn example() -> wspump::Result<()> {
//! let report = bench::run(&BenchConfig::default().port(7778).workers(50).messages(20)).await?;
//! println!("{report}");
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `config` | [`BenchConfig`] |
//! | `counters` | Shared atomic totals |
//! | `worker` | One worker's dial + round-trip loop |
//! | `aggregator` | Sample collector and [`Stats`] |
//! | `report` | [`BenchReport`] |
//! | `runner` | Spawning, join barrier, report |

// ============================================================================
// Submodules
// ============================================================================

/// Latency collection and statistics.
pub mod aggregator;

/// Load harness configuration.
pub mod config;

/// Shared round-trip counters.
pub mod counters;

/// End-of-run report.
pub mod report;

/// Load run orchestration.
pub mod runner;

/// Load worker.
pub mod worker;

// ============================================================================
// Re-exports
// ============================================================================

pub use aggregator::{LatencySample, Stats, spawn_collector};
pub use config::BenchConfig;
pub use counters::{CounterSnapshot, Counters};
pub use report::BenchReport;
pub use runner::{run, run_with_dialer};
pub use worker::{Worker, WorkerOutcome, WorkerReport};
