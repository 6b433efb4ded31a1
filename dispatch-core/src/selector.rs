//! Worker selection policies.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::descriptor::WorkerDescriptor;
use crate::registry::WorkerRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPolicy {
    RoundRobin,
    LeastLoaded,
}

impl SelectionPolicy {
    /// Select one healthy worker from the registry, or `None` if none are
    /// healthy, which callers translate into a 503. Never blocks.
    pub async fn select(&self, registry: &WorkerRegistry) -> Option<Arc<WorkerDescriptor>> {
        let snapshot = registry.snapshot().await;
        if snapshot.is_empty() {
            return None;
        }

        match self {
            SelectionPolicy::RoundRobin => Self::select_round_robin(registry, &snapshot),
            SelectionPolicy::LeastLoaded => Self::select_least_loaded(&snapshot),
        }
    }

    fn select_round_robin(
        registry: &WorkerRegistry,
        snapshot: &[Arc<WorkerDescriptor>],
    ) -> Option<Arc<WorkerDescriptor>> {
        let n = snapshot.len();
        let start = registry.cursor().fetch_add(1, Ordering::Relaxed);
        for i in 0..n {
            let idx = (start + 1 + i) % n;
            let candidate = &snapshot[idx];
            if candidate.is_healthy() {
                registry.cursor().store(idx, Ordering::Relaxed);
                return Some(candidate.clone());
            }
        }
        None
    }

    fn select_least_loaded(snapshot: &[Arc<WorkerDescriptor>]) -> Option<Arc<WorkerDescriptor>> {
        let winner = snapshot
            .iter()
            .filter(|d| d.is_healthy())
            .min_by_key(|d| (d.total_assigned(), d.id))?;
        winner.bump_total_assigned();
        Some(winner.clone())
    }
}
