//! Core data model: `Task` and its lifecycle.

use std::time::Instant;

use bytes::Bytes;
use tokio::sync::oneshot;

/// Stable, unique-within-instance worker identifier (`WorkerDescriptor.id`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkerId(pub u64);

impl std::fmt::Display for WorkerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic task identifier, assigned from the dispatcher's total-request counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

/// A raw upstream request that the selected worker is expected to execute.
/// Method-neutral so it covers both the unary leaf commands and fan-out
/// shard requests.
#[derive(Debug, Clone)]
pub struct WorkerRequest {
    pub method: &'static str,
    /// Path on the worker, e.g. `/fibonacci` or `/countchunk`.
    pub path: String,
    /// Already-decoded query pairs; re-encoded by the outbound client.
    pub query: Vec<(String, String)>,
    pub body: Option<Bytes>,
    pub content_type: Option<&'static str>,
}

/// The worker's raw reply, relayed (unary path) or parsed (fan-out path).
#[derive(Debug, Clone)]
pub struct WorkerResponse {
    pub status: u16,
    pub content_type: String,
    pub body: Bytes,
}

/// One unit of work assigned to a worker's pending queue.
///
/// `reply` is only populated for the unary path, where the owning task carries
/// the channel back to the client; the fan-out coordinator keeps its own
/// result channel outside of `Task` and leaves this `None`.
pub struct Task {
    pub id: TaskId,
    pub request: WorkerRequest,
    pub status: TaskStatus,
    pub retry_count: u32,
    pub created_at: Instant,
    pub reply: Option<oneshot::Sender<Result<WorkerResponse, crate::error::DispatchError>>>,
}

impl Task {
    pub fn new(id: TaskId, request: WorkerRequest) -> Self {
        Self {
            id,
            request,
            status: TaskStatus::Pending,
            retry_count: 0,
            created_at: Instant::now(),
            reply: None,
        }
    }
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id.0)
            .field("path", &self.request.path)
            .field("status", &self.status)
            .field("retry_count", &self.retry_count)
            .finish()
    }
}
