//! Engine counters.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use tiket_model::AssignmentMetrics;

/// Lock-free counters, reset only when a new engine is started.
#[derive(Debug, Default)]
pub(crate) struct EngineMetrics {
    enqueued: AtomicU64,
    processed: AtomicU64,
    ml_failures: AtomicU64,
    fallback_decisions: AtomicU64,
    hard_stops: AtomicU64,
    last_batch_size: AtomicUsize,
}

impl EngineMetrics {
    pub(crate) fn record_enqueued(&self) {
        self.enqueued.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_processed(&self, count: usize) {
        self.processed.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_ml_failure(&self) {
        self.ml_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_fallback(&self) {
        self.fallback_decisions.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_hard_stop(&self) {
        self.hard_stops.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_batch_size(&self, size: usize) {
        self.last_batch_size.store(size, Ordering::Relaxed);
    }

    /// Counters together with the live queue depth.
    pub(crate) fn snapshot(&self, queue_depth: usize) -> AssignmentMetrics {
        AssignmentMetrics {
            enqueued: self.enqueued.load(Ordering::Relaxed),
            processed: self.processed.load(Ordering::Relaxed),
            ml_failures: self.ml_failures.load(Ordering::Relaxed),
            fallback_decisions: self.fallback_decisions.load(Ordering::Relaxed),
            hard_stops: self.hard_stops.load(Ordering::Relaxed),
            queue_depth,
            last_batch_size: self.last_batch_size.load(Ordering::Relaxed),
        }
    }
}
