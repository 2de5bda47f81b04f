//! Reference-counted in-flight request tracking.
//!
//! The busy flag mirrors the counter's zero/non-zero edge: it flips on the
//! 0→1 and 1→0 transitions only. Counter and flag change under one mutex so
//! interleaved completions on a multi-threaded runtime cannot leave the flag
//! out of step with the count.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;

use crate::gateway::pipeline::{Interceptor, Settlement};
use crate::gateway::request::OutgoingRequest;

#[derive(Clone)]
pub struct BusyTracker {
    inner: Arc<BusyInner>,
}

struct BusyInner {
    pending: Mutex<usize>,
    flag: watch::Sender<bool>,
    transitions: AtomicU64,
}

impl BusyTracker {
    pub fn new() -> Self {
        let (flag, _) = watch::channel(false);
        Self {
            inner: Arc::new(BusyInner {
                pending: Mutex::new(0),
                flag,
                transitions: AtomicU64::new(0),
            }),
        }
    }

    /// Count one request in. Returns the new pending count.
    pub fn begin(&self) -> usize {
        let mut pending = self.inner.pending.lock();
        *pending += 1;
        if *pending == 1 {
            self.flip(true);
        }
        *pending
    }

    /// Count one request out. Returns the new pending count.
    ///
    /// An unmatched call is logged and ignored; the counter never goes below zero.
    pub fn end(&self) -> usize {
        let mut pending = self.inner.pending.lock();
        if *pending == 0 {
            tracing::warn!("Busy counter decremented without a matching increment");
            return 0;
        }
        *pending -= 1;
        if *pending == 0 {
            self.flip(false);
        }
        *pending
    }

    fn flip(&self, busy: bool) {
        self.inner.flag.send_replace(busy);
        self.inner.transitions.fetch_add(1, Ordering::SeqCst);
        tracing::trace!(busy, "Busy flag changed");
    }

    pub fn pending(&self) -> usize {
        *self.inner.pending.lock()
    }

    pub fn is_busy(&self) -> bool {
        *self.inner.flag.borrow()
    }

    /// Number of times the flag has flipped since creation.
    pub fn transitions(&self) -> u64 {
        self.inner.transitions.load(Ordering::SeqCst)
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.inner.flag.subscribe()
    }
}

impl Default for BusyTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Counts every request through the busy tracker.
pub struct BusyInterceptor {
    tracker: BusyTracker,
}

impl BusyInterceptor {
    pub fn new(tracker: BusyTracker) -> Self {
        Self { tracker }
    }
}

impl Interceptor for BusyInterceptor {
    fn name(&self) -> &'static str {
        "busy"
    }

    fn before_send(&self, request: &mut OutgoingRequest) {
        let pending = self.tracker.begin();
        tracing::debug!(request_id = %request.request_id, pending, "Request started");
    }

    fn after_settle(&self, settlement: &Settlement) {
        let pending = self.tracker.end();
        tracing::debug!(
            request_id = %settlement.request_id,
            outcome = ?settlement.outcome,
            pending,
            "Request settled"
        );
    }
}
