//! Process-wide counters, each an independent atomic rather than fields
//! behind one shared lock.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

pub struct DispatcherMetrics {
    total_requests: AtomicU64,
    requests_handled: AtomicU64,
    requests_failed: AtomicU64,
    started_at: Instant,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub requests_handled: u64,
    pub requests_failed: u64,
    pub uptime_seconds: u64,
}

impl Default for DispatcherMetrics {
    fn default() -> Self {
        Self {
            total_requests: AtomicU64::new(0),
            requests_handled: AtomicU64::new(0),
            requests_failed: AtomicU64::new(0),
            started_at: Instant::now(),
        }
    }
}

impl DispatcherMetrics {
    pub fn record_request(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_handled(&self) {
        self.requests_handled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed(&self) {
        self.requests_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            requests_handled: self.requests_handled.load(Ordering::Relaxed),
            requests_failed: self.requests_failed.load(Ordering::Relaxed),
            uptime_seconds: self.started_at.elapsed().as_secs(),
        }
    }
}
