//! Build-time histogram behind /stats/latency.
//! One sample per successful dashboard build, fetch through render.

use std::sync::Mutex;
use std::time::Duration;

use hdrhistogram::Histogram;
use serde::Serialize;

/// Longest build we track: 10 minutes, in microseconds.
const MAX_BUILD_US: u64 = 600_000_000;

/// Percentile view of recorded build times, in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatencySummary {
    pub samples: u64,
    pub p50_ms: Option<f64>,
    pub p95_ms: Option<f64>,
    pub p99_ms: Option<f64>,
    pub max_ms: Option<f64>,
}

pub struct LatencyStats {
    builds_us: Mutex<Histogram<u64>>,
}

impl LatencyStats {
    pub fn new() -> Self {
        let histogram =
            Histogram::new_with_bounds(1, MAX_BUILD_US, 3).expect("valid histogram bounds");
        Self {
            builds_us: Mutex::new(histogram),
        }
    }

    /// Out-of-range durations are clamped to the tracked bounds.
    pub fn record(&self, build: Duration) {
        let us = (build.as_micros().min(u128::from(MAX_BUILD_US)) as u64).max(1);
        if let Ok(mut h) = self.builds_us.lock() {
            let _ = h.record(us);
        }
    }

    pub fn summary(&self) -> LatencySummary {
        let empty = LatencySummary {
            samples: 0,
            p50_ms: None,
            p95_ms: None,
            p99_ms: None,
            max_ms: None,
        };
        let Ok(h) = self.builds_us.lock() else {
            return empty;
        };
        if h.len() == 0 {
            return empty;
        }
        let ms = |us: u64| Some(us as f64 / 1_000.0);
        LatencySummary {
            samples: h.len(),
            p50_ms: ms(h.value_at_quantile(0.50)),
            p95_ms: ms(h.value_at_quantile(0.95)),
            p99_ms: ms(h.value_at_quantile(0.99)),
            max_ms: ms(h.max()),
        }
    }

    pub fn len(&self) -> u64 {
        self.builds_us.lock().map(|h| h.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for LatencyStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_summary_has_no_percentiles() {
        let stats = LatencyStats::new();
        assert!(stats.is_empty());
        let summary = stats.summary();
        assert_eq!(summary.samples, 0);
        assert!(summary.p50_ms.is_none() && summary.max_ms.is_none());
    }

    #[test]
    fn summary_is_ordered_and_in_millis() {
        let stats = LatencyStats::new();
        for ms in 1..=100u64 {
            stats.record(Duration::from_millis(ms));
        }
        let s = stats.summary();
        assert_eq!(s.samples, 100);
        let (p50, p95, p99, max) = (s.p50_ms.unwrap(), s.p95_ms.unwrap(), s.p99_ms.unwrap(), s.max_ms.unwrap());
        assert!(p50 <= p95 && p95 <= p99 && p99 <= max);
        // 3 significant figures
        assert!((49.0..=51.0).contains(&p50), "p50={p50}");
        assert!((99.0..=101.0).contains(&max), "max={max}");
    }

    #[test]
    fn oversized_build_is_clamped() {
        let stats = LatencyStats::new();
        stats.record(Duration::from_secs(3_600));
        assert_eq!(stats.len(), 1);
    }
}
