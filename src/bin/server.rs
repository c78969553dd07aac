//! Pumped ping/pong WebSocket server.
//!
//! Usage:
//!   wspump-server                    # 0.0.0.0:7778
//!   wspump-server --port 0 --debug   # random port, verbose

use std::net::IpAddr;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use wspump::config::DEFAULT_SERVER_PORT;
use wspump::{RequestHandler, Result, Server, ServerConfig};

/// Answers every WebSocket message with `{"msg":"pong"}`.
#[derive(Debug, Parser)]
#[command(name = "wspump-server", version)]
struct Args {
    /// Address to bind.
    #[arg(long, default_value = "0.0.0.0")]
    bind: IpAddr,

    /// Port to bind.
    #[arg(long, default_value_t = DEFAULT_SERVER_PORT)]
    port: u16,

    /// Enable debug logging.
    #[arg(long)]
    debug: bool,
}

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
    let config = ServerConfig::default().ip(args.bind).port(args.port);
    let server = Server::bind(&config, RequestHandler::default()).await?;

    info!(url = %server.ws_url(), "Listening");

    tokio::select! {
        () = server.run() => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down");
        }
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
