//! `GET /suscribir?url=<host:port>` — dynamic worker registration, idempotent
//! per address.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::state::AppState;
use dispatch_core::DispatchError;

#[derive(Deserialize)]
pub struct RegisterParams {
    url: Option<String>,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    // Stringified to match the wire format the worker side already parses.
    id: String,
    status: &'static str,
}

pub async fn suscribir(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RegisterParams>,
) -> Result<Json<RegisterResponse>, AppError> {
    let url = params
        .url
        .filter(|u| !u.is_empty())
        .ok_or_else(|| DispatchError::BadParameter("missing url".into()))?;

    let outcome = state.registry.register(&url).await;
    Ok(Json(RegisterResponse {
        id: outcome.id.0.to_string(),
        status: if outcome.already_registered {
            "already_registered"
        } else {
            "registered"
        },
    }))
}
