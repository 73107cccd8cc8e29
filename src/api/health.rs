//! Shared health state for the /health endpoint.
//! Updated by DashboardService after every build attempt.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};

/// Build counters. Written by the service, read by the API.
#[derive(Default)]
pub struct HealthState {
    pub builds_ok: AtomicU64,
    pub builds_failed: AtomicU64,
    /// Millisecond UTC timestamp of the last successful build (0 = none).
    pub last_build_at_ms: AtomicU64,
    /// Draw count of the last successful build.
    pub last_draws: AtomicU64,
}

impl HealthState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&self, draws: usize, at: DateTime<Utc>) {
        self.builds_ok.fetch_add(1, Ordering::Relaxed);
        self.last_draws.store(draws as u64, Ordering::Relaxed);
        self.last_build_at_ms
            .store(at.timestamp_millis().max(0) as u64, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.builds_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn builds_ok(&self) -> u64 {
        self.builds_ok.load(Ordering::Relaxed)
    }

    pub fn builds_failed(&self) -> u64 {
        self.builds_failed.load(Ordering::Relaxed)
    }

    pub fn last_draws(&self) -> u64 {
        self.last_draws.load(Ordering::Relaxed)
    }

    pub fn last_build_at(&self) -> Option<DateTime<Utc>> {
        match self.last_build_at_ms.load(Ordering::Relaxed) {
            0 => None,
            ms => DateTime::from_timestamp_millis(ms as i64),
        }
    }
}
