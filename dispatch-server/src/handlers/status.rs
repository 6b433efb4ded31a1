//! `GET /status`, `GET /workers` — process and per-worker status snapshot.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct WorkerStatusEntry {
    pid: u64,
    url: String,
    status: &'static str,
    active_tasks: u64,
    #[serde(rename = "CompletedTasks")]
    completed_tasks: u64,
    last_checked: Option<u64>,
    max_capacity: usize,
}

#[derive(Serialize)]
pub struct StatusResponse {
    main_pid: u32,
    uptime: u64,
    total_requests: u64,
    total_workers: usize,
    workers_status: Vec<WorkerStatusEntry>,
}

pub async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let snapshot = state.registry.snapshot().await;
    let metrics = state.metrics.snapshot();

    let workers_status = snapshot
        .iter()
        .map(|d| WorkerStatusEntry {
            pid: d.id.0,
            url: d.address.clone(),
            status: if d.is_healthy() { "healthy" } else { "unhealthy" },
            active_tasks: d.active_tasks(),
            completed_tasks: d.completed_tasks(),
            last_checked: d.last_probed().map(|t| t.elapsed().as_secs()),
            max_capacity: d.max_capacity,
        })
        .collect();

    Json(StatusResponse {
        main_pid: std::process::id(),
        uptime: metrics.uptime_seconds,
        total_requests: metrics.total_requests,
        total_workers: snapshot.len(),
        workers_status,
    })
}
