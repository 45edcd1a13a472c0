//! Cancellation for in-flight retrievals.
//!
//! A [`CancelSignal`] is cloned into every retrieval that should stop
//! together. The engine checks it between pages and races each page request
//! against it, so a cancelled retrieval returns promptly with whatever it had
//! accumulated.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Debug, Default)]
struct CancelState {
    cancelled: AtomicBool,
    notify: Notify,
}

/// Shareable, one-shot cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct CancelSignal {
    inner: Arc<CancelState>,
}

impl CancelSignal {
    /// Create an untriggered signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Wakes all waiters exactly once.
    pub fn cancel(&self) {
        if !self.inner.cancelled.swap(true, Ordering::SeqCst) {
            self.inner.notify.notify_waiters();
        }
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Resolve once cancellation is requested; immediately if it already was.
    pub async fn cancelled(&self) {
        let notified = self.inner.notify.notified();
        tokio::pin!(notified);
        // Register before checking the flag so a concurrent cancel() is not missed
        notified.as_mut().enable();
        if self.is_cancelled() {
            return;
        }
        notified.await;
    }
}
