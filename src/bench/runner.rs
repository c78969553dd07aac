//! Load run orchestration.
//!
//! Spawns the collector and one task per worker, waits for every worker
//! (the join barrier), then closes the results channel and computes the
//! report.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{error, info};

use crate::error::Result;
use crate::identifiers::WorkerId;
use crate::transport::{Dialer, WsDialer};

use super::aggregator::{Stats, spawn_collector};
use super::config::BenchConfig;
use super::counters::Counters;
use super::report::BenchReport;
use super::worker::Worker;

// ============================================================================
// Runner
// ============================================================================

/// Runs a load test against the `ws://` target in `config`.
///
/// # Errors
///
/// Returns [`Error::Config`](crate::Error::Config) if `config` is invalid.
/// Connection failures never fail the run; they show up in the report.
pub async fn run(config: &BenchConfig) -> Result<BenchReport> {
    config.validate()?;
    let dialer = WsDialer::from_url(config.url()?);
    run_with_dialer(config, Arc::new(dialer)).await
}

/// Runs a load test with a caller-supplied dialer.
///
/// `config.host` and `config.port` are ignored; the dialer decides where
/// workers connect.
///
/// # Errors
///
/// Returns [`Error::Config`](crate::Error::Config) if `config` is invalid.
pub async fn run_with_dialer<D: Dialer>(config: &BenchConfig, dialer: Arc<D>) -> Result<BenchReport> {
    config.validate()?;

    info!(
        addr = dialer.target(),
        workers = config.workers,
        messages = config.messages,
        "Load test starting"
    );

    let counters = Arc::new(Counters::new());
    let (results_tx, results_rx) = mpsc::channel(config.results_buffer);
    let collector = spawn_collector(results_rx);

    let mut workers = JoinSet::new();
    for id in 0..config.workers {
        let worker = Worker::new(
            WorkerId::new(u32::try_from(id).unwrap_or(u32::MAX)),
            Arc::clone(&dialer),
            config.messages,
            Arc::clone(&counters),
            results_tx.clone(),
        )
        .with_io_timeout(config.io_timeout);
        workers.spawn(worker.run());
    }
    drop(results_tx);

    let mut reports = Vec::with_capacity(config.workers);
    while let Some(joined) = workers.join_next().await {
        match joined {
            Ok(report) => reports.push(report),
            Err(e) => error!(error = %e, "Worker task failed"),
        }
    }
    reports.sort_by_key(|report| report.id);

    let samples = match collector.await {
        Ok(samples) => samples,
        Err(e) => {
            error!(error = %e, "Collector task failed");
            Vec::new()
        }
    };

    let totals = counters.snapshot();
    let stats = Stats::from_samples(&samples);

    info!(
        sent = totals.sent,
        succeeded = totals.succeeded,
        samples = stats.count,
        "Load test done"
    );

    Ok(BenchReport {
        sent: totals.sent,
        succeeded: totals.succeeded,
        stats,
        workers: reports,
    })
}

// ============================================================================
// Tests
// ============================================================================
