//! Shared health state for the /health endpoint.
//! Updated by the prediction handlers and the journal writer.

use std::sync::atomic::{AtomicU64, Ordering};

/// Shared service counters. Updated by handlers and the journal, read by API.
#[derive(Default)]
pub struct HealthState {
    /// Successful predictions since startup.
    pub predictions_served: AtomicU64,
    /// Nanosecond timestamp of the last successful prediction (0 = none).
    pub last_prediction_at_ns: AtomicU64,
    /// Journal entries queued but not yet written.
    pub journal_queue_pending: AtomicU64,
}

impl HealthState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_prediction(&self, at_ns: u64) {
        self.predictions_served.fetch_add(1, Ordering::Relaxed);
        self.last_prediction_at_ns.store(at_ns, Ordering::Relaxed);
    }

    pub fn inc_journal_queue_pending(&self) {
        self.journal_queue_pending.fetch_add(1, Ordering::Relaxed);
    }

    pub fn dec_journal_queue_pending(&self) {
        self.journal_queue_pending.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn predictions_served(&self) -> u64 {
        self.predictions_served.load(Ordering::Relaxed)
    }

    pub fn last_prediction_at_ns(&self) -> u64 {
        self.last_prediction_at_ns.load(Ordering::Relaxed)
    }

    pub fn journal_queue_pending(&self) -> u64 {
        self.journal_queue_pending.load(Ordering::Relaxed)
    }
}
