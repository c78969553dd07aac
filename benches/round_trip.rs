//! Round-trip benchmark suite.
//!
//! Benchmarks full load runs against a local pumped server:
//! - Worker counts: 1, 10, 50
//! - Round trips per worker: 20
//!
//! Run with: cargo bench --bench round_trip
//! Results saved to: target/criterion/

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use tokio::runtime::Runtime;

use wspump::bench::{self, BenchConfig};
use wspump::transport::MemoryDialer;
use wspump::{Pump, RequestHandler, Server, ServerConfig};

// ============================================================================
// Benchmark Parameters
// ============================================================================

const WORKER_COUNTS: &[usize] = &[1, 10, 50];
const MESSAGES_PER_WORKER: usize = 20;

// ============================================================================
// Benchmark: WebSocket Loopback
// ============================================================================

fn bench_websocket(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    let port = rt.block_on(async {
        let config = ServerConfig::default()
            .ip(IpAddr::V4(Ipv4Addr::LOCALHOST))
            .port(0);
        let server = Server::bind(&config, RequestHandler::default())
            .await
            .expect("bind should succeed");
        let port = server.local_addr().port();
        tokio::spawn(server.run());
        port
    });

    let mut group = c.benchmark_group("websocket_round_trip");
    group.sample_size(20);
    group.measurement_time(Duration::from_secs(10));

    for &workers in WORKER_COUNTS {
        let config = BenchConfig::default()
            .port(port)
            .workers(workers)
            .messages(MESSAGES_PER_WORKER);

        group.bench_with_input(BenchmarkId::new("workers", workers), &config, |b, config| {
            b.to_async(&rt).iter(|| async {
                let report = bench::run(config).await.expect("valid config");
                assert_eq!(report.succeeded, report.sent);
                report
            });
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: In-Memory Pump
// ============================================================================

fn bench_memory_pump(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    let mut group = c.benchmark_group("memory_round_trip");
    group.sample_size(20);

    for &workers in WORKER_COUNTS {
        let config = BenchConfig::default()
            .workers(workers)
            .messages(MESSAGES_PER_WORKER);

        group.bench_with_input(BenchmarkId::new("workers", workers), &config, |b, config| {
            b.to_async(&rt).iter(|| async {
                let dialer = MemoryDialer::new(16, |socket| {
                    tokio::spawn(async move {
                        RequestHandler::default().run(Pump::new(socket)).await
                    });
                });
                bench::run_with_dialer(config, std::sync::Arc::new(dialer))
                    .await
                    .expect("valid config")
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_websocket, bench_memory_pump);
criterion_main!(benches);
