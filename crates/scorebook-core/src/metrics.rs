//! Global atomic counters for Scorebook.
//!
//! Counters are incremented silently at the call site. Call
//! [`Metrics::flush`] to emit current values as a single
//! `tracing::info!` event (e.g. before the CLI exits).

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

pub struct Metrics {
    deliveries_applied: AtomicU64,
    matches_expired: AtomicU64,
    corrupt_discarded: AtomicU64,
    save_failures: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            deliveries_applied: AtomicU64::new(0),
            matches_expired: AtomicU64::new(0),
            corrupt_discarded: AtomicU64::new(0),
            save_failures: AtomicU64::new(0),
        }
    }

    pub fn inc_deliveries(&self) {
        self.deliveries_applied.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "deliveries_applied", "counter incremented");
    }

    pub fn inc_expired(&self) {
        self.matches_expired.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "matches_expired", "counter incremented");
    }

    pub fn inc_corrupt(&self) {
        self.corrupt_discarded.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "corrupt_discarded", "counter incremented");
    }

    pub fn inc_save_failures(&self) {
        self.save_failures.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "save_failures", "counter incremented");
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            deliveries_applied = self.deliveries_applied(),
            matches_expired = self.matches_expired(),
            corrupt_discarded = self.corrupt_discarded(),
            save_failures = self.save_failures(),
        );
    }

    pub fn deliveries_applied(&self) -> u64 {
        self.deliveries_applied.load(Ordering::Relaxed)
    }

    pub fn matches_expired(&self) -> u64 {
        self.matches_expired.load(Ordering::Relaxed)
    }

    pub fn corrupt_discarded(&self) -> u64 {
        self.corrupt_discarded.load(Ordering::Relaxed)
    }

    pub fn save_failures(&self) -> u64 {
        self.save_failures.load(Ordering::Relaxed)
    }

    /// Reset all counters to zero (useful in tests).
    pub fn reset(&self) {
        self.deliveries_applied.store(0, Ordering::Relaxed);
        self.matches_expired.store(0, Ordering::Relaxed);
        self.corrupt_discarded.store(0, Ordering::Relaxed);
        self.save_failures.store(0, Ordering::Relaxed);
    }
}
