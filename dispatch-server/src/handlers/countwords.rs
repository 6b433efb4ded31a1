//! `POST /countwords` fan-out coordinator: splits the body into per-worker
//! line shards and sums their word counts.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use dispatch_core::partition::even_shares;
use dispatch_core::WorkerRequest;

use crate::error::AppError;
use crate::handlers::leaf::run_unary;
use crate::state::AppState;

struct ShardOutcome {
    count: Option<u64>,
}

pub async fn countwords(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Response, AppError> {
    state.metrics.record_request();

    let text = String::from_utf8_lossy(&body);
    let mut lines: Vec<&str> = text.split('\n').collect();
    if lines.last().map(|l| l.is_empty()).unwrap_or(false) {
        lines.pop();
    }

    if lines.is_empty() {
        state.metrics.record_handled();
        return Ok(plain_ok("Conteo total de palabras: 0\n"));
    }

    let healthy = state
        .registry
        .snapshot()
        .await
        .iter()
        .filter(|d| d.is_healthy())
        .count();
    if healthy == 0 {
        state.metrics.record_failed();
        return Err(dispatch_core::DispatchError::NoWorker.into());
    }

    let shares = even_shares(lines.len() as u64, healthy);

    let mut handles = Vec::new();
    let mut offset = 0usize;
    for share in shares {
        let share = share as usize;
        if share == 0 {
            continue;
        }
        let shard: String = lines[offset..offset + share].join("\n");
        offset += share;

        let state = state.clone();
        handles.push(tokio::spawn(async move {
            let request = WorkerRequest {
                method: "POST",
                path: "/countchunk".to_string(),
                query: vec![],
                body: Some(bytes::Bytes::from(shard.into_bytes())),
                content_type: Some("text/plain"),
            };
            match run_unary(&state, request).await {
                Ok(resp) => {
                    let text = String::from_utf8_lossy(&resp.body);
                    match text.trim().parse::<u64>() {
                        Ok(n) => ShardOutcome { count: Some(n) },
                        Err(_) => ShardOutcome { count: None },
                    }
                }
                Err(_) => ShardOutcome { count: None },
            }
        }));
    }

    let mut total = 0u64;
    let mut errors = 0usize;
    for handle in handles {
        match handle.await {
            Ok(ShardOutcome { count: Some(n) }) => total += n,
            _ => errors += 1,
        }
    }

    if errors > 0 {
        state.metrics.record_failed();
        let body = format!(
            "Conteo total de palabras: {total}\nErrores de fragmento: {errors}\n"
        );
        return Ok((StatusCode::INTERNAL_SERVER_ERROR, body).into_response());
    }

    state.metrics.record_handled();
    Ok(plain_ok(&format!("Conteo total de palabras: {total}\n")))
}

fn plain_ok(body: &str) -> Response {
    (StatusCode::OK, body.to_string()).into_response()
}
