//! One-shot close signal.
//!
//! Fired at most once; every waiter, present or future, observes it
//! immediately after it fires. The `closed` flag is flipped under a mutex so
//! concurrent callers from both pump loops and the application never
//! double-fire.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;

// ============================================================================
// CloseSignal
// ============================================================================

/// Broadcast-once shutdown event shared by a pump and its loops.
#[derive(Debug)]
pub(crate) struct CloseSignal {
    closed: Mutex<bool>,
    tx: watch::Sender<bool>,
}

impl CloseSignal {
    /// Creates an unfired signal.
    pub(crate) fn new() -> Arc<Self> {
        let (tx, _) = watch::channel(false);
        Arc::new(Self {
            closed: Mutex::new(false),
            tx,
        })
    }

    /// Fires the signal.
    ///
    /// Returns `true` only for the call that actually fired it.
    pub(crate) fn fire(&self) -> bool {
        let mut closed = self.closed.lock();
        if *closed {
            return false;
        }
        *closed = true;
        self.tx.send_replace(true);
        true
    }

    /// Returns `true` once the signal has fired.
    #[inline]
    pub(crate) fn is_fired(&self) -> bool {
        *self.closed.lock()
    }

    /// Waits until the signal fires.
    pub(crate) async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so this only returns once fired
        let _ = rx.wait_for(|fired| *fired).await;
    }
}

// ============================================================================
// CloseHandle
// ============================================================================

/// Cloneable handle that can close a pump from any task.
#[derive(Debug, Clone)]
pub struct CloseHandle {
    signal: Arc<CloseSignal>,
}

impl CloseHandle {
    pub(crate) fn new(signal: Arc<CloseSignal>) -> Self {
        Self { signal }
    }

    /// Closes the pump. Idempotent.
    ///
    /// Returns `true` only for the call that performed the close.
    pub fn close(&self) -> bool {
        self.signal.fire()
    }

    /// Returns `true` once the pump is closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.signal.is_fired()
    }

    /// Waits until the pump is closed.
    pub async fn closed(&self) {
        self.signal.wait().await;
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use tokio::time::timeout;

    #[test]
    fn test_fire_once() {
        let signal = CloseSignal::new();
        assert!(!signal.is_fired());
        assert!(signal.fire());
        assert!(!signal.fire());
        assert!(signal.is_fired());
    }

    #[tokio::test]
    async fn test_wait_after_fire_returns_immediately() {
        let signal = CloseSignal::new();
        signal.fire();

        timeout(Duration::from_millis(100), signal.wait())
            .await
            .expect("wait should not block after fire");
    }

    #[tokio::test]
    async fn test_fire_wakes_all_waiters() {
        let signal = CloseSignal::new();

        let waiters: Vec<_> = (0..8)
            .map(|_| {
                let signal = Arc::clone(&signal);
                tokio::spawn(async move { signal.wait().await })
            })
            .collect();

        tokio::task::yield_now().await;
        signal.fire();

        for waiter in waiters {
            timeout(Duration::from_secs(1), waiter)
                .await
                .expect("waiter woken")
                .expect("waiter task");
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_fire_wins_exactly_once() {
        let signal = CloseSignal::new();

        let tasks: Vec<_> = (0..64)
            .map(|_| {
                let handle = CloseHandle::new(Arc::clone(&signal));
                tokio::spawn(async move { handle.close() })
            })
            .collect();

        let mut winners = 0;
        for task in tasks {
            if task.await.expect("close task") {
                winners += 1;
            }
        }

        assert_eq!(winners, 1);
        assert!(signal.is_fired());
    }
}
