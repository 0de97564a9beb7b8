//! Handler and dispatch metrics for observability

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Metrics for a single handler
#[derive(Debug, Default)]
pub struct HandlerMetrics {
    /// Current queue length
    queue_len: AtomicUsize,
    /// Records accepted into the queue
    queued_count: AtomicU64,
    /// Records passed to the next handler after being accepted
    forwarded_count: AtomicU64,
    /// Records passed on because the queue was full
    bypassed_count: AtomicU64,
    /// Records the predicate rejected
    rejected_count: AtomicU64,
    /// Total successful sink writes
    write_count: AtomicU64,
    /// Total sink write failures
    failure_count: AtomicU64,
}

impl HandlerMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Get current queue length
    pub fn queue_len(&self) -> usize {
        self.queue_len.load(Ordering::Relaxed)
    }

    /// Set current queue length
    pub fn set_queue_len(&self, len: usize) {
        self.queue_len.store(len, Ordering::Relaxed);
    }

    /// Get queued count
    pub fn queued_count(&self) -> u64 {
        self.queued_count.load(Ordering::Relaxed)
    }

    /// Increment queued count
    pub fn inc_queued_count(&self) {
        self.queued_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get forwarded count
    pub fn forwarded_count(&self) -> u64 {
        self.forwarded_count.load(Ordering::Relaxed)
    }

    /// Increment forwarded count
    pub fn inc_forwarded_count(&self) {
        self.forwarded_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get bypassed count
    pub fn bypassed_count(&self) -> u64 {
        self.bypassed_count.load(Ordering::Relaxed)
    }

    /// Increment bypassed count
    pub fn inc_bypassed_count(&self) {
        self.bypassed_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get rejected count
    pub fn rejected_count(&self) -> u64 {
        self.rejected_count.load(Ordering::Relaxed)
    }

    /// Increment rejected count
    pub fn inc_rejected_count(&self) {
        self.rejected_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get total write count
    pub fn write_count(&self) -> u64 {
        self.write_count.load(Ordering::Relaxed)
    }

    /// Increment write count
    pub fn inc_write_count(&self) {
        self.write_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get failure count
    pub fn failure_count(&self) -> u64 {
        self.failure_count.load(Ordering::Relaxed)
    }

    /// Increment failure count
    pub fn inc_failure_count(&self) {
        self.failure_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            queue_len: self.queue_len(),
            queued_count: self.queued_count(),
            forwarded_count: self.forwarded_count(),
            bypassed_count: self.bypassed_count(),
            rejected_count: self.rejected_count(),
            write_count: self.write_count(),
            failure_count: self.failure_count(),
        }
    }
}

/// Snapshot of handler metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub queue_len: usize,
    pub queued_count: u64,
    pub forwarded_count: u64,
    pub bypassed_count: u64,
    pub rejected_count: u64,
    pub write_count: u64,
    pub failure_count: u64,
}

/// Chain-level counters
#[derive(Debug, Default)]
pub struct DispatchMetrics {
    dispatched: AtomicU64,
    absorbed: AtomicU64,
    unhandled: AtomicU64,
    rejected_after_shutdown: AtomicU64,
}

impl DispatchMetrics {
    pub(crate) fn record_dispatched(&self) {
        self.dispatched.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_absorbed(&self) {
        self.absorbed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_unhandled(&self) {
        self.unhandled.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rejected_after_shutdown(&self) {
        self.rejected_after_shutdown.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot
    pub fn snapshot(&self) -> DispatchSnapshot {
        DispatchSnapshot {
            dispatched: self.dispatched.load(Ordering::Relaxed),
            absorbed: self.absorbed.load(Ordering::Relaxed),
            unhandled: self.unhandled.load(Ordering::Relaxed),
            rejected_after_shutdown: self.rejected_after_shutdown.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of chain-level counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSnapshot {
    /// Records offered to the chain
    pub dispatched: u64,
    /// Records some handler absorbed
    pub absorbed: u64,
    /// Records that made it past the last handler
    pub unhandled: u64,
    /// Records offered after end-of-stream
    pub rejected_after_shutdown: u64,
}
