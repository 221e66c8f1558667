//! Rate limiting for the two upstream providers.
//!
//! Two policies are needed, both built on [`tokio::sync::Semaphore`]:
//!
//! - [`IntervalLimiter`] — the search provider allows one request per
//!   second. A single slot is handed out at a time and, once the holder's
//!   work finishes, the slot stays blocked for a full interval before the
//!   next caller may proceed.
//! - [`TimedSemaphore`] — the reasoning provider allows a burst of K
//!   concurrent calls per second. Each acquisition schedules its own
//!   release a fixed hold after acquisition, independent of when the
//!   caller's work completes.
//!
//! Tokio's semaphore queues waiters in FIFO order, so concurrent callers
//! cannot starve while slots are available.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Serialises access to the search provider: one in-flight request, and a
/// mandatory quiet interval after each one.
#[derive(Debug)]
pub struct IntervalLimiter {
    semaphore: Arc<Semaphore>,
    interval: Duration,
}

impl IntervalLimiter {
    /// Create a limiter with the given post-request interval.
    pub fn new(interval: Duration) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(1)),
            interval,
        }
    }

    /// Wait for the slot.
    ///
    /// The returned permit covers the caller's request; dropping it starts
    /// the quiet interval, after which the next waiter is admitted. Holding
    /// the permit across a cancelled future is safe — the drop still
    /// schedules the delayed release, so no slot leaks.
    pub async fn acquire(&self) -> IntervalPermit {
        let permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .expect("limiter semaphore is never closed");
        IntervalPermit {
            permit: Some(permit),
            interval: self.interval,
        }
    }
}

/// Slot guard handed out by [`IntervalLimiter::acquire`].
#[must_use = "dropping the permit immediately starts the quiet interval"]
#[derive(Debug)]
pub struct IntervalPermit {
    permit: Option<OwnedSemaphorePermit>,
    interval: Duration,
}

impl Drop for IntervalPermit {
    fn drop(&mut self) {
        let Some(permit) = self.permit.take() else {
            return;
        };
        let interval = self.interval;
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    tokio::time::sleep(interval).await;
                    drop(permit);
                });
            }
            // No runtime left (process shutdown): release immediately.
            Err(_) => drop(permit),
        }
    }
}

/// Caps sustained throughput to the reasoning provider: up to `permits`
/// acquisitions per `hold` window.
///
/// Unlike a plain semaphore, the slot is returned `hold` after
/// *acquisition*, not when the caller finishes — fast calls cannot exceed
/// the provider's per-second budget.
#[derive(Debug)]
pub struct TimedSemaphore {
    semaphore: Arc<Semaphore>,
    hold: Duration,
}

impl TimedSemaphore {
    /// Create a timed-release semaphore with `permits` slots and the given
    /// hold duration.
    pub fn new(permits: usize, hold: Duration) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(permits)),
            hold,
        }
    }

    /// Wait for a slot, then schedule its release `hold` from now.
    pub async fn acquire(&self) {
        let permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .expect("limiter semaphore is never closed");
        let hold = self.hold;
        tokio::spawn(async move {
            tokio::time::sleep(hold).await;
            drop(permit);
        });
    }

    /// Slots currently free. Test hook.
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}
