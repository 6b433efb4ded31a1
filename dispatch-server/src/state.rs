//! Shared application state handed to every handler: registry, metrics, and
//! the active policy all live for the process.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{oneshot, Mutex as AsyncMutex};

use dispatch_core::{
    DispatchError, DispatcherMetrics, SelectionPolicy, TaskId, WorkerRegistry, WorkerResponse,
};

use crate::client::WorkerClient;
use crate::config::DispatchConfig;

/// Pending async-callback entries keyed by `request_id`.
pub type CallbackMap = AsyncMutex<HashMap<String, oneshot::Sender<Result<WorkerResponse, DispatchError>>>>;

pub struct AppState {
    pub registry: Arc<WorkerRegistry>,
    pub metrics: Arc<DispatcherMetrics>,
    pub client: WorkerClient,
    pub policy: SelectionPolicy,
    pub config: DispatchConfig,
    pub pending_callbacks: CallbackMap,
    next_task_id: AtomicU64,
}

impl AppState {
    pub fn new(config: DispatchConfig) -> Self {
        Self {
            registry: Arc::new(WorkerRegistry::new(config.worker_max_capacity)),
            metrics: Arc::new(DispatcherMetrics::default()),
            client: WorkerClient::new(),
            policy: config.selection_policy,
            pending_callbacks: AsyncMutex::new(HashMap::new()),
            next_task_id: AtomicU64::new(1),
            config,
        }
    }

    pub fn worker_read_timeout(&self) -> Duration {
        self.config.worker_read_timeout
    }

    /// Monotonic task id, assigned from the dispatcher's total-request
    /// counter.
    pub fn next_task_id(&self) -> TaskId {
        TaskId(self.next_task_id.fetch_add(1, Ordering::Relaxed))
    }
}
