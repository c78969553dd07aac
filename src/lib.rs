//! wspump - Bounded per-connection WebSocket message pump.
//!
//! This library decouples a socket's blocking reads and writes from the
//! application through two bounded queues, and ships a concurrent ping/pong
//! load harness to measure round-trip latency against it.
//!
//! # Architecture
//!
//! ```text
//!  bench::Worker ──► socket ──► Pump (read loop) ──► RequestHandler
//!        ▲                                               │
//!        └──────── socket ◄── Pump (write loop) ◄────────┘
//!        │
//!        └──► results channel ──► collector ──► Stats
//! ```
//!
//! Key design principles:
//!
//! - Each [`Pump`] owns its socket plus one read task and one write task
//! - [`Pump::send`] never waits: a full queue is reported as [`Error::QueueFull`]
//! - One close signal per pump, fired exactly once, wakes every waiter
//! - Failures stay local to one connection or one worker
//!
//! # Quick Start
//!
//! ```no_run
//! use wspump::{RequestHandler, Result, Server, ServerConfig};
//! use wspump::bench::{self, BenchConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let server = Server::bind(&ServerConfig::default().port(0), RequestHandler::default()).await?;
//!     let port = server.local_addr().port();
//!     tokio::spawn(server.run());
//!
//!     let report = bench::run(&BenchConfig::default().port(port).workers(10).messages(5)).await?;
//!     println!("{report}");
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`bench`] | Load workers, aggregation, report |
//! | [`config`] | Pump and server settings |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`protocol`] | Ping/pong payloads |
//! | [`pump`] | [`Pump`] and [`RequestHandler`] |
//! | [`transport`] | Socket traits, WebSocket and in-memory sockets, [`Server`] |

// ============================================================================
// Modules
// ============================================================================

/// Concurrent ping/pong load harness.
pub mod bench;

/// Pump and server configuration.
pub mod config;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers for connections and workers.
pub mod identifiers;

/// Ping/pong wire payloads.
pub mod protocol;

/// Connection pump and request handler.
pub mod pump;

/// Socket traits and implementations.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Configuration
pub use config::{PumpConfig, ServerConfig};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{ConnId, WorkerId};

// Pump types
pub use pump::{CloseHandle, HandlerSummary, Pump, RequestHandler, ResponseRule};

// Transport types
pub use transport::{
    Dialer, MemorySocket, Message, MessageKind, MessageReader, MessageWriter, Server, Socket,
    WsDialer,
};
