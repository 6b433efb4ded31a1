//! Per-worker descriptor: health bit, load counters, bounded pending queue,
//! all owned by one mutex per worker.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Instant;

use crate::error::DispatchError;
use crate::types::{Task, WorkerId};

struct DescriptorState {
    healthy: bool,
    active_tasks: u64,
    total_assigned: u64,
    completed_tasks: u64,
    last_probed: Option<Instant>,
    pending: VecDeque<Task>,
}

/// One record per backend worker. `healthy`, `active_tasks`, `total_assigned`
/// and `pending` all live under a single mutex so a health-bit flip and a
/// queue drain are always observed together.
pub struct WorkerDescriptor {
    pub id: WorkerId,
    pub address: String,
    pub max_capacity: usize,
    state: Mutex<DescriptorState>,
}

impl WorkerDescriptor {
    pub fn new(id: WorkerId, address: String, max_capacity: usize) -> Self {
        Self {
            id,
            address,
            max_capacity,
            state: Mutex::new(DescriptorState {
                healthy: true,
                active_tasks: 0,
                total_assigned: 0,
                completed_tasks: 0,
                last_probed: None,
                pending: VecDeque::with_capacity(max_capacity.min(64)),
            }),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.state.lock().expect("descriptor lock poisoned").healthy
    }

    /// Flip the health bit. Recovery is immediate — no grace period.
    pub fn set_healthy(&self, healthy: bool) {
        let mut s = self.state.lock().expect("descriptor lock poisoned");
        s.healthy = healthy;
        s.last_probed = Some(Instant::now());
    }

    pub fn last_probed(&self) -> Option<Instant> {
        self.state.lock().expect("descriptor lock poisoned").last_probed
    }

    pub fn active_tasks(&self) -> u64 {
        self.state.lock().expect("descriptor lock poisoned").active_tasks
    }

    pub fn total_assigned(&self) -> u64 {
        self.state.lock().expect("descriptor lock poisoned").total_assigned
    }

    /// Selector-side signal of future load, used by the least-loaded policy.
    pub fn bump_total_assigned(&self) -> u64 {
        let mut s = self.state.lock().expect("descriptor lock poisoned");
        s.total_assigned += 1;
        s.total_assigned
    }

    pub fn increment_active(&self) {
        self.state.lock().expect("descriptor lock poisoned").active_tasks += 1;
    }

    pub fn decrement_active(&self) {
        let mut s = self.state.lock().expect("descriptor lock poisoned");
        s.active_tasks = s.active_tasks.saturating_sub(1);
    }

    pub fn completed_tasks(&self) -> u64 {
        self.state.lock().expect("descriptor lock poisoned").completed_tasks
    }

    /// Mark one more task Completed on this worker, feeding the `/status`
    /// response's `CompletedTasks` field.
    pub fn bump_completed(&self) {
        self.state.lock().expect("descriptor lock poisoned").completed_tasks += 1;
    }

    pub fn pending_len(&self) -> usize {
        self.state.lock().expect("descriptor lock poisoned").pending.len()
    }

    /// Non-blocking bounded enqueue: fails fast instead of waiting for room.
    pub fn try_enqueue(&self, task: Task) -> Result<(), DispatchError> {
        let mut s = self.state.lock().expect("descriptor lock poisoned");
        if s.pending.len() >= self.max_capacity {
            return Err(DispatchError::Overloaded);
        }
        s.pending.push_back(task);
        Ok(())
    }

    /// Drain the whole pending queue into a local buffer under the lock, then
    /// release — the redistributor forwards outside of this call.
    pub fn drain_pending(&self) -> Vec<Task> {
        let mut s = self.state.lock().expect("descriptor lock poisoned");
        s.pending.drain(..).collect()
    }

    /// Pop the task at the head of the queue, if any. Used by callers that
    /// enqueue a task purely to reserve a capacity slot and then forward it
    /// immediately rather than leaving it parked (e.g. redistribution).
    pub fn pop_front(&self) -> Option<Task> {
        self.state.lock().expect("descriptor lock poisoned").pending.pop_front()
    }
}

impl std::fmt::Debug for WorkerDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = self.state.lock().expect("descriptor lock poisoned");
        f.debug_struct("WorkerDescriptor")
            .field("id", &self.id.0)
            .field("address", &self.address)
            .field("healthy", &s.healthy)
            .field("active_tasks", &s.active_tasks)
            .field("total_assigned", &s.total_assigned)
            .field("pending_len", &s.pending.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WorkerRequest;

    fn req() -> WorkerRequest {
        WorkerRequest {
            method: "GET",
            path: "/ping".into(),
            query: vec![],
            body: None,
            content_type: None,
        }
    }

    #[test]
    fn queue_bound_is_enforced() {
        let d = WorkerDescriptor::new(WorkerId(1), "w1:8080".into(), 2);
        assert!(d.try_enqueue(Task::new(crate::types::TaskId(1), req())).is_ok());
        assert!(d.try_enqueue(Task::new(crate::types::TaskId(2), req())).is_ok());
        assert!(matches!(
            d.try_enqueue(Task::new(crate::types::TaskId(3), req())),
            Err(DispatchError::Overloaded)
        ));
        assert_eq!(d.pending_len(), 2);
    }

    #[test]
    fn drain_empties_the_queue_and_releases_capacity() {
        let d = WorkerDescriptor::new(WorkerId(1), "w1:8080".into(), 1);
        d.try_enqueue(Task::new(crate::types::TaskId(1), req())).unwrap();
        let drained = d.drain_pending();
        assert_eq!(drained.len(), 1);
        assert_eq!(d.pending_len(), 0);
        assert!(d.try_enqueue(Task::new(crate::types::TaskId(2), req())).is_ok());
    }

    #[test]
    fn health_recovery_is_immediate() {
        let d = WorkerDescriptor::new(WorkerId(1), "w1:8080".into(), 1);
        d.set_healthy(false);
        assert!(!d.is_healthy());
        d.set_healthy(true);
        assert!(d.is_healthy());
    }
}
