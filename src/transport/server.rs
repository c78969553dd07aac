//! Pumped WebSocket server.
//!
//! Accepts TCP connections, upgrades each to WebSocket (any origin, no
//! TLS), wraps it in a [`Pump`] and serves it with a [`RequestHandler`].
//!
//! # Connection Flow
//!
//! 1. `Server::bind` - Bind the listener (fatal on failure)
//! 2. `Server::run` - Accept loop, one task per connection
//! 3. Handshake via `tokio_tungstenite::accept_async`
//! 4. `RequestHandler::run` until the connection ends

// ============================================================================
// Imports
// ============================================================================

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, warn};

use crate::config::{PumpConfig, ServerConfig};
use crate::error::{Error, Result};
use crate::pump::{Pump, RequestHandler};

// ============================================================================
// Server
// ============================================================================

/// A bound WebSocket server.
///
/// # Example
///
/// ```no_run
/// use wspump::{RequestHandler, Server, ServerConfig};
///
/// # async fn example() -> wspump::Result<()> {
/// let server = Server::bind(&ServerConfig::default(), RequestHandler::default()).await?;
/// println!("listening on {}", server.ws_url());
/// server.run().await;
/// # Ok(())
/// # }
/// ```
pub struct Server {
    /// TCP listener for incoming connections.
    listener: TcpListener,
    /// Address the listener is bound to.
    local_addr: SocketAddr,
    /// Settings for every pump.
    pump_config: PumpConfig,
    /// Handler shared by every connection.
    handler: Arc<RequestHandler>,
}

impl Server {
    /// Binds the listener.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the pump settings are invalid
    /// - [`Error::Io`] if binding fails
    pub async fn bind(config: &ServerConfig, handler: RequestHandler) -> Result<Self> {
        config.validate()?;

        let listener = TcpListener::bind(config.addr()).await?;
        let local_addr = listener.local_addr()?;

        debug!(%local_addr, "WebSocket server bound");

        Ok(Self {
            listener,
            local_addr,
            pump_config: config.pump.clone(),
            handler: Arc::new(handler),
        })
    }

    /// Returns the bound address.
    #[inline]
    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Returns a `ws://` URL that reaches this server.
    ///
    /// An unspecified bind address is reported as loopback.
    #[must_use]
    pub fn ws_url(&self) -> String {
        let ip = if self.local_addr.ip().is_unspecified() {
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        } else {
            self.local_addr.ip()
        };
        format!("ws://{}", SocketAddr::new(ip, self.local_addr.port()))
    }

    /// Runs the accept loop forever.
    ///
    /// Accept and handshake failures are logged and never stop the loop.
    pub async fn run(self) {
        info!(addr = %self.local_addr, "Server accepting connections");

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let handler = Arc::clone(&self.handler);
                    let pump_config = self.pump_config.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, addr, &pump_config, &handler).await
                        {
                            warn!(error = %e, ?addr, "Connection handling failed");
                        }
                    });
                }
                Err(e) => {
                    error!(error = %e, "Accept failed");
                }
            }
        }
    }
}

/// Upgrades one TCP stream and serves it to completion.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    pump_config: &PumpConfig,
    handler: &RequestHandler,
) -> Result<()> {
    debug!(?addr, "New TCP connection");

    let ws_stream = tokio_tungstenite::accept_async(stream)
        .await
        .map_err(|e| Error::protocol(format!("WebSocket upgrade failed: {e}")))?;

    let pump = Pump::with_config(ws_stream, pump_config);
    debug!(conn_id = %pump.id(), ?addr, "WebSocket connection established");

    let summary = handler.run(pump).await;
    debug!(
        conn_id = %summary.conn_id,
        handled = summary.handled,
        reason = %summary.reason,
        "Connection finished"
    );

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
