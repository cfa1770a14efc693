//! One-way stop signal.

use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// A flag that can be raised once and never lowered.
///
/// Observing it is a single atomic load. Raising it wakes every thread
/// blocked in [`StopSignal::wait_timeout`].
#[derive(Debug, Default)]
pub struct StopSignal {
    stopped: AtomicBool,
    lock: Mutex<()>,
    cond: Condvar,
}

impl StopSignal {
    /// Create a signal in the running state
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the signal.
    ///
    /// Returns true only for the call that actually raised it.
    pub fn trigger(&self) -> bool {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return false;
        }
        // Waiters check the flag with the lock held; taking it here means
        // none of them can miss the notification.
        let _guard = self.lock.lock();
        self.cond.notify_all();
        true
    }

    /// Whether the signal has been raised
    pub fn is_triggered(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Block for up to `timeout`, returning early once the signal is raised.
    ///
    /// Returns whether the signal is raised.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now().checked_add(timeout);
        let mut guard = self.lock.lock();
        while !self.is_triggered() {
            match deadline {
                Some(deadline) => {
                    if self.cond.wait_until(&mut guard, deadline).timed_out() {
                        break;
                    }
                }
                None => self.cond.wait(&mut guard),
            }
        }
        self.is_triggered()
    }
}
