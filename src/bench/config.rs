//! Load harness configuration.

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Default target host.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default target port.
pub const DEFAULT_PORT: u16 = 2000;

/// Default number of concurrent workers.
pub const DEFAULT_WORKERS: usize = 10;

/// Default number of round trips per worker.
pub const DEFAULT_MESSAGES: usize = 1;

/// Default deadline for each write and each read.
pub const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(30);

/// Default buffer of the shared results channel.
pub const DEFAULT_RESULTS_BUFFER: usize = 1000;

// ============================================================================
// BenchConfig
// ============================================================================

/// Settings for one load run.
///
/// # Example
///
/// ```
/// use wspump::bench::BenchConfig;
///
/// let config = BenchConfig::default().port(7778).workers(4).messages(100);
/// assert_eq!(config.url().unwrap().as_str(), "ws://127.0.0.1:7778/");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchConfig {
    /// Target host.
    pub host: String,
    /// Target port.
    pub port: u16,
    /// Number of concurrent workers.
    pub workers: usize,
    /// Round trips per worker.
    pub messages: usize,
    /// Deadline for each write and each read. `None` waits forever.
    pub io_timeout: Option<Duration>,
    /// Buffer of the shared results channel.
    pub results_buffer: usize,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            workers: DEFAULT_WORKERS,
            messages: DEFAULT_MESSAGES,
            io_timeout: Some(DEFAULT_IO_TIMEOUT),
            results_buffer: DEFAULT_RESULTS_BUFFER,
        }
    }
}

impl BenchConfig {
    /// Sets the target host.
    #[inline]
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the target port.
    #[inline]
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the number of workers.
    #[inline]
    #[must_use]
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Sets the round trips per worker.
    #[inline]
    #[must_use]
    pub fn messages(mut self, messages: usize) -> Self {
        self.messages = messages;
        self
    }

    /// Sets or clears the I/O deadline.
    #[inline]
    #[must_use]
    pub fn io_timeout(mut self, limit: Option<Duration>) -> Self {
        self.io_timeout = limit;
        self
    }

    /// Sets the results channel buffer.
    #[inline]
    #[must_use]
    pub fn results_buffer(mut self, size: usize) -> Self {
        self.results_buffer = size;
        self
    }

    /// Builds the `ws://host:port` target URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the host does not form a valid URL.
    pub fn url(&self) -> Result<Url> {
        let raw = format!("ws://{}:{}", self.host, self.port);
        Url::parse(&raw).map_err(|e| Error::config(format!("invalid target {raw}: {e}")))
    }

    /// Validates the settings.
    ///
    /// Zero workers or zero messages is a legal, empty run.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the URL is invalid or the results buffer is zero.
    pub fn validate(&self) -> Result<()> {
        self.url()?;
        if self.results_buffer == 0 {
            return Err(Error::config("results_buffer must be at least 1"));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_cli() {
        let config = BenchConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 2000);
        assert_eq!(config.workers, 10);
        assert_eq!(config.messages, 1);
        assert_eq!(config.io_timeout, Some(Duration::from_secs(30)));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_url() {
        let config = BenchConfig::default().host("localhost").port(7778);
        assert_eq!(config.url().unwrap().as_str(), "ws://localhost:7778/");
    }

    #[test]
    fn test_invalid_host_rejected() {
        let err = BenchConfig::default().host("bad host").validate().unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_zero_buffer_rejected() {
        assert!(BenchConfig::default().results_buffer(0).validate().is_err());
    }
}
