//! `POST /callback` — async-mode completion endpoint. Only reachable when
//! `DISPATCH_ASYNC_CALLBACKS=true`; the router only mounts this route in
//! that case.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Form;
use bytes::Bytes;
use serde::Deserialize;

use dispatch_core::WorkerResponse;

use crate::state::AppState;

#[derive(Deserialize)]
pub struct CallbackForm {
    request_id: String,
    result: String,
}

pub async fn callback(
    State(state): State<Arc<AppState>>,
    Form(form): Form<CallbackForm>,
) -> StatusCode {
    let mut pending = state.pending_callbacks.lock().await;
    if let Some(sender) = pending.remove(&form.request_id) {
        let _ = sender.send(Ok(WorkerResponse {
            status: 200,
            content_type: "text/plain".to_string(),
            body: Bytes::from(form.result.into_bytes()),
        }));
    } else {
        tracing::warn!(request_id = %form.request_id, "callback for unknown or expired request_id");
    }
    StatusCode::OK
}
