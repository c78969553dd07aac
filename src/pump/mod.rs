//! Connection pump and request handler.
//!
//! # Architecture
//!
//! ```text
//!             ┌──────────── Pump ─────────────┐
//!  socket ──► │ read loop ──► inbound  (K_in) │ ──► receive()
//!             │                               │          │
//!             │                               │     RequestHandler
//!             │                               │          │
//!  socket ◄── │ write loop ◄── outbound(K_out)│ ◄── send()
//!             └──────── close signal ─────────┘
//! ```
//!
//! # Shutdown
//!
//! Either loop failing, the peer closing, [`Pump::close`] or dropping the
//! pump fires the close signal once. Every pending and future `receive`
//! and `send` then returns [`Error::ConnectionClosed`](crate::Error::ConnectionClosed).

// ============================================================================
// Submodules
// ============================================================================

/// The pump and its two loops.
pub mod connection;

/// Request handler loop.
pub mod handler;

/// One-shot close signal.
pub mod signal;

// ============================================================================
// Re-exports
// ============================================================================

pub use connection::Pump;
pub use handler::{HandlerSummary, RequestHandler, ResponseRule};
pub use signal::CloseHandle;
