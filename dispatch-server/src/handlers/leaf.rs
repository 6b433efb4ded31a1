//! Unary dispatch path: select → enqueue → forward → relay, used for the
//! leaf commands and any other GET route that isn't one of the fan-out
//! specializations.

use std::sync::Arc;

use axum::body::Bytes as AxumBytes;
use axum::extract::{OriginalUri, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use url::form_urlencoded;

use dispatch_core::{DispatchError, Task, WorkerDescriptor, WorkerRequest, WorkerResponse};

use crate::error::AppError;
use crate::state::AppState;

pub async fn dispatch_leaf(
    State(state): State<Arc<AppState>>,
    method: Method,
    OriginalUri(uri): OriginalUri,
) -> Result<Response, AppError> {
    if method != Method::GET {
        return Ok((StatusCode::METHOD_NOT_ALLOWED, "method not allowed").into_response());
    }

    state.metrics.record_request();

    let query: Vec<(String, String)> = uri
        .query()
        .map(|q| {
            form_urlencoded::parse(q.as_bytes())
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect()
        })
        .unwrap_or_default();

    let request = WorkerRequest {
        method: "GET",
        path: uri.path().to_string(),
        query,
        body: None,
        content_type: None,
    };

    let outcome = if state.config.async_callbacks_enabled {
        dispatch_with_callback(&state, request).await
    } else {
        run_unary(&state, request).await
    };

    match outcome {
        Ok(resp) => {
            state.metrics.record_handled();
            Ok((
                StatusCode::from_u16(resp.status).unwrap_or(StatusCode::OK),
                [("content-type", resp.content_type)],
                AxumBytes::from(resp.body),
            )
                .into_response())
        }
        Err(e) => {
            state.metrics.record_failed();
            Err(e.into())
        }
    }
}

/// Select a healthy worker and forward: used directly by the leaf fallback,
/// and by the fan-out coordinators once they've split their input into
/// shards.
pub async fn run_unary(
    state: &AppState,
    request: WorkerRequest,
) -> Result<WorkerResponse, DispatchError> {
    let peer = state
        .policy
        .select(&state.registry)
        .await
        .ok_or(DispatchError::NoWorker)?;
    forward_via(state, &peer, request).await
}

/// Unary dispatch under the optional async-callback capability: select a
/// worker, register a pending-response slot keyed by a fresh `request_id`,
/// forward with `callback_url`/`request_id` appended, then await either the
/// `/callback` post or a wall-clock timeout. Only the unary path uses this —
/// fan-out shards always await their reply synchronously so the combiner can
/// parse it immediately.
async fn dispatch_with_callback(
    state: &AppState,
    mut request: WorkerRequest,
) -> Result<WorkerResponse, DispatchError> {
    let peer = state
        .policy
        .select(&state.registry)
        .await
        .ok_or(DispatchError::NoWorker)?;

    let request_id = uuid::Uuid::new_v4().to_string();
    let callback_url = format!(
        "http://{}/callback",
        state.config.bind_addr.replace("0.0.0.0", "127.0.0.1")
    );
    request.query.push(("request_id".to_string(), request_id.clone()));
    request.query.push(("callback_url".to_string(), callback_url));

    let (tx, rx) = tokio::sync::oneshot::channel();
    state
        .pending_callbacks
        .lock()
        .await
        .insert(request_id.clone(), tx);

    let task_id = state.next_task_id();
    let task = Task::new(task_id, request);
    if let Err(e) = peer.try_enqueue(task) {
        state.pending_callbacks.lock().await.remove(&request_id);
        return Err(e);
    }
    peer.increment_active();
    let task = peer.pop_front().expect("just enqueued above");

    // The initiating forward is just a handshake ack; the real result
    // arrives later via `/callback`.
    if let Err(e) = state
        .client
        .forward(&peer.address, &task.request, state.worker_read_timeout())
        .await
    {
        peer.decrement_active();
        state.pending_callbacks.lock().await.remove(&request_id);
        return Err(e);
    }

    let outcome = tokio::time::timeout(state.config.callback_timeout, rx).await;
    peer.decrement_active();

    match outcome {
        Ok(Ok(Ok(resp))) => {
            peer.bump_completed();
            Ok(resp)
        }
        Ok(Ok(Err(e))) => Err(e),
        Ok(Err(_)) => Err(DispatchError::WorkerProtocolError(
            "callback channel dropped before a result arrived".into(),
        )),
        Err(_elapsed) => {
            state.pending_callbacks.lock().await.remove(&request_id);
            Err(DispatchError::WorkerTimeout)
        }
    }
}

/// Reserve a queue slot on an already-selected worker and forward
/// immediately. Shared with `/countchunk` and `/calculatepi` shard dispatch,
/// which pick their own peer per shard.
pub async fn forward_via(
    state: &AppState,
    peer: &Arc<WorkerDescriptor>,
    request: WorkerRequest,
) -> Result<WorkerResponse, DispatchError> {
    let task_id = state.next_task_id();
    let task = Task::new(task_id, request);
    peer.try_enqueue(task)?;
    peer.increment_active();

    // The queue is a staging/backpressure gate, not a backlog: pop the task
    // straight back off and forward it now.
    let task = peer.pop_front().expect("just enqueued above");

    let outcome = state
        .client
        .forward(&peer.address, &task.request, state.worker_read_timeout())
        .await;

    peer.decrement_active();
    if outcome.is_ok() {
        peer.bump_completed();
    }
    outcome
}
