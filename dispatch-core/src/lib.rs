//! dispatch-core — worker registry, selection policies, and task bookkeeping
//! for the dispatch fabric. No network I/O lives here; see `dispatch-server`
//! for the axum binary and the outbound worker client.

pub mod descriptor;
pub mod error;
pub mod metrics;
pub mod partition;
pub mod registry;
pub mod selector;
pub mod types;

pub use descriptor::WorkerDescriptor;
pub use error::DispatchError;
pub use metrics::DispatcherMetrics;
pub use registry::{RegisterOutcome, WorkerRegistry};
pub use selector::SelectionPolicy;
pub use types::{Task, TaskId, TaskStatus, WorkerId, WorkerRequest, WorkerResponse};
