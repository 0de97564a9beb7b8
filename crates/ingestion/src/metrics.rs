//! Listener metrics

use std::sync::atomic::{AtomicU64, Ordering};

/// Per-listener counters
#[derive(Debug, Default)]
pub struct ListenerMetrics {
    /// Datagrams read from the socket
    pub datagrams_received: AtomicU64,

    /// Bytes read from the socket
    pub bytes_received: AtomicU64,

    /// Datagrams dropped by the missing-priority policy
    pub datagrams_discarded: AtomicU64,

    /// Records parsed without a header
    pub headerless_records: AtomicU64,

    /// Records no handler absorbed
    pub unhandled_records: AtomicU64,

    /// Read errors (each one ends the listener)
    pub read_errors: AtomicU64,
}

impl ListenerMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a datagram of `bytes` length
    pub fn record_datagram(&self, bytes: usize) {
        self.datagrams_received.fetch_add(1, Ordering::Relaxed);
        self.bytes_received.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub fn record_discarded(&self) {
        self.datagrams_discarded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_headerless(&self) {
        self.headerless_records.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_unhandled(&self) {
        self.unhandled_records.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_read_error(&self) {
        self.read_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot
    pub fn snapshot(&self) -> ListenerSnapshot {
        ListenerSnapshot {
            datagrams_received: self.datagrams_received.load(Ordering::Relaxed),
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            datagrams_discarded: self.datagrams_discarded.load(Ordering::Relaxed),
            headerless_records: self.headerless_records.load(Ordering::Relaxed),
            unhandled_records: self.unhandled_records.load(Ordering::Relaxed),
            read_errors: self.read_errors.load(Ordering::Relaxed),
        }
    }
}

/// Metrics snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenerSnapshot {
    pub datagrams_received: u64,
    pub bytes_received: u64,
    pub datagrams_discarded: u64,
    pub headerless_records: u64,
    pub unhandled_records: u64,
    pub read_errors: u64,
}

impl std::ops::Add for ListenerSnapshot {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            datagrams_received: self.datagrams_received + other.datagrams_received,
            bytes_received: self.bytes_received + other.bytes_received,
            datagrams_discarded: self.datagrams_discarded + other.datagrams_discarded,
            headerless_records: self.headerless_records + other.headerless_records,
            unhandled_records: self.unhandled_records + other.unhandled_records,
            read_errors: self.read_errors + other.read_errors,
        }
    }
}
