//! Cancellation Signal
//!
//! One-shot stop request shared between the thread driving a task and
//! the sampler thread watching the database server.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct Shared {
    cancelled: Mutex<bool>,
    wakeup: Condvar,
}

/// A flag that moves from unset to set exactly once and never resets.
///
/// Clones share the same underlying state, so one clone can be handed to
/// the sampler thread while the controller keeps another to call
/// [`cancel`](Self::cancel).
///
/// # Example
///
/// ```rust
/// use sqlbench::monitoring::CancellationSignal;
///
/// let signal = CancellationSignal::new();
/// let observer = signal.clone();
///
/// assert!(!observer.is_cancelled());
/// signal.cancel();
/// assert!(observer.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancellationSignal {
    shared: Arc<Shared>,
}

impl CancellationSignal {
    /// Creates a new, unset signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the signal and wakes every waiter. Calling it again is a no-op.
    pub fn cancel(&self) {
        let mut cancelled = self.lock();
        *cancelled = true;
        self.shared.wakeup.notify_all();
    }

    /// Returns true once [`cancel`](Self::cancel) has been called on any clone.
    pub fn is_cancelled(&self) -> bool {
        *self.lock()
    }

    /// Blocks for up to `timeout`, returning early if the signal is set.
    ///
    /// Returns true if the signal is set when the wait ends.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut cancelled = self.lock();

        while !*cancelled {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            cancelled = self
                .shared
                .wakeup
                .wait_timeout(cancelled, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }

        *cancelled
    }

    fn lock(&self) -> MutexGuard<'_, bool> {
        // A bool cannot be left half-written, so a poisoned lock is still valid.
        self.shared
            .cancelled
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
