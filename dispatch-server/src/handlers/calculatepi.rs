//! `GET /calculatepi?iterations=N` fan-out coordinator: splits the
//! iteration count across workers and combines a Monte Carlo estimate.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};

use dispatch_core::partition::even_shares;
use dispatch_core::{DispatchError, WorkerRequest};

use crate::error::AppError;
use crate::handlers::leaf::run_unary;
use crate::state::AppState;

#[derive(serde::Deserialize)]
pub struct PiParams {
    iterations: Option<String>,
}

struct ShardOutcome {
    hits: Option<u64>,
}

pub async fn calculatepi(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PiParams>,
) -> Result<Response, AppError> {
    state.metrics.record_request();

    let n: u64 = params
        .iterations
        .as_deref()
        .and_then(|s| s.parse().ok())
        .filter(|n| *n > 0)
        .ok_or_else(|| {
            state.metrics.record_failed();
            DispatchError::BadParameter("iterations must be a positive integer".into())
        })?;

    let healthy = state
        .registry
        .snapshot()
        .await
        .iter()
        .filter(|d| d.is_healthy())
        .count();
    if healthy == 0 {
        state.metrics.record_failed();
        return Err(DispatchError::NoWorker.into());
    }

    let shares = even_shares(n, healthy);

    let mut handles = Vec::new();
    for share in shares {
        if share == 0 {
            continue;
        }
        let state = state.clone();
        handles.push(tokio::spawn(async move {
            let request = WorkerRequest {
                method: "GET",
                path: "/calculatepi".to_string(),
                query: vec![("iterations".to_string(), share.to_string())],
                body: None,
                content_type: None,
            };
            let hits = match run_unary(&state, request).await {
                Ok(resp) => String::from_utf8_lossy(&resp.body).trim().parse::<u64>().ok(),
                Err(_) => None,
            };
            (share, ShardOutcome { hits })
        }));
    }

    let mut total_hits = 0u64;
    let mut total_dispatched = 0u64;
    let mut errors = 0usize;
    for handle in handles {
        match handle.await {
            Ok((share, ShardOutcome { hits: Some(h) })) => {
                total_hits += h;
                total_dispatched += share;
            }
            Ok((_, ShardOutcome { hits: None })) => errors += 1,
            Err(_) => errors += 1,
        }
    }

    if errors > 0 {
        state.metrics.record_failed();
        let body = format!(
            "Estimación de Pi: parcial, aciertos={total_hits}, errores={errors}\n"
        );
        return Ok((axum::http::StatusCode::INTERNAL_SERVER_ERROR, body).into_response());
    }

    // Denominator is the sum of dispatched shares, never the nominal N —
    // zero-share workers were skipped entirely.
    let estimate = 4.0 * total_hits as f64 / total_dispatched as f64;
    state.metrics.record_handled();
    Ok((
        axum::http::StatusCode::OK,
        format!("Estimación de Pi: {estimate:.6}\n"),
    )
        .into_response())
}
