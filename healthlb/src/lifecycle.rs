//! Resolver lifecycle latch.
//!
//! A resolver moves from running to stopped exactly once. The scheduler loop and
//! any pending `next()` call wait on the same latch, so a single `close()` wakes both.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tokio::sync::Notify;

/// Cooperative stop signal shared by the scheduler and the watcher handle.
#[derive(Clone, Debug, Default)]
pub struct Lifecycle {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    closed: AtomicBool,
    notify: Notify,
}

impl Lifecycle {
    /// Creates a latch in the running state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true once `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Transition to stopped and wake all waiters.
    ///
    /// Returns true only for the call that performed the transition.
    pub fn close(&self) -> bool {
        let first = !self.inner.closed.swap(true, Ordering::AcqRel);
        if first {
            self.inner.notify.notify_waiters();
        }
        first
    }

    /// Wait until the latch is closed.
    pub async fn closed(&self) {
        let notified = self.inner.notify.notified();
        tokio::pin!(notified);
        // register before checking the flag so a concurrent close is not missed
        notified.as_mut().enable();
        if self.is_closed() {
            return;
        }
        notified.await;
    }
}
