//! Ping/pong load generator.
//!
//! Usage:
//!   wspump-bench -h 127.0.0.1 -p 7778 -t 50 -m 100
//!   wspump-bench --port 7778 --json          # machine-readable report

use std::time::Duration;

use clap::{ArgAction, Parser};
use tracing::info;
use tracing_subscriber::EnvFilter;

use wspump::Result;
use wspump::bench::{self, BenchConfig};

// ============================================================================
// Arguments
// ============================================================================

/// Opens N WebSocket connections and measures ping/pong round trips.
#[derive(Debug, Parser)]
#[command(name = "wspump-bench", version, disable_help_flag = true)]
struct Args {
    /// Target host.
    #[arg(short = 'h', long, default_value = bench::config::DEFAULT_HOST)]
    host: String,

    /// Target port.
    #[arg(short = 'p', long, default_value_t = bench::config::DEFAULT_PORT)]
    port: u16,

    /// Number of concurrent workers.
    #[arg(short = 't', long = "threadNums", default_value_t = bench::config::DEFAULT_WORKERS)]
    thread_nums: usize,

    /// Round trips per worker.
    #[arg(short = 'm', long = "msgNums", default_value_t = bench::config::DEFAULT_MESSAGES)]
    msg_nums: usize,

    /// Deadline for each write and each read, in milliseconds (0 disables).
    #[arg(long = "timeout-ms", default_value_t = 30_000)]
    timeout_ms: u64,

    /// Print the report as JSON.
    #[arg(long)]
    json: bool,

    /// Enable debug logging.
    #[arg(long)]
    debug: bool,

    /// Print help.
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,
}

impl Args {
    fn config(&self) -> BenchConfig {
        let io_timeout = (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms));

        BenchConfig::default()
            .host(self.host.clone())
            .port(self.port)
            .workers(self.thread_nums)
            .messages(self.msg_nums)
            .io_timeout(io_timeout)
    }
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging(args.debug);

    if let Err(e) = run(&args).await {
        eprintln!("[ERROR] {e}");
        std::process::exit(1);
    }
}

async fn run(args: &Args) -> Result<()> {
    let config = args.config();

    info!(
        "test ws://{}:{} {} * {}",
        config.host, config.port, config.workers, config.messages
    );

    let report = bench::run(&config).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        info!("done");
        println!("{report}");
    }

    Ok(())
}

fn init_logging(debug: bool) {
    let filter = if debug { "wspump=debug" } else { "wspump=info" };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();
}
