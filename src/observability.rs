//! Storage operation counters

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters recorded by a data store over its lifetime
#[derive(Debug, Default)]
pub struct StoreMetrics {
    objects_written: AtomicU64,
    writes_skipped: AtomicU64,
    objects_read: AtomicU64,
    not_found: AtomicU64,
}

impl StoreMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn object_written(&self) {
        self.objects_written.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "objects_written", "Metric incremented");
    }

    /// `put_if_not_exists` found the object already present
    pub fn write_skipped(&self) {
        self.writes_skipped.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "writes_skipped", "Metric incremented");
    }

    pub fn object_read(&self) {
        self.objects_read.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "objects_read", "Metric incremented");
    }

    pub fn not_found(&self) {
        self.not_found.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "not_found", "Metric incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            objects_written: self.objects_written.load(Ordering::Relaxed),
            writes_skipped: self.writes_skipped.load(Ordering::Relaxed),
            objects_read: self.objects_read.load(Ordering::Relaxed),
            not_found: self.not_found.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub objects_written: u64,
    pub writes_skipped: u64,
    pub objects_read: u64,
    pub not_found: u64,
}
