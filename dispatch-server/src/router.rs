//! Route table for the client-facing HTTP surface.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers::{calculatepi, callback, countwords, leaf, register, status};
use crate::state::AppState;

async fn ping() -> &'static str {
    "pong"
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        .route("/ping", get(ping))
        .route("/status", get(status::status))
        .route("/workers", get(status::status))
        .route("/suscribir", get(register::suscribir))
        .route("/countwords", post(countwords::countwords))
        .route("/calculatepi", get(calculatepi::calculatepi));

    if state.config.async_callbacks_enabled {
        router = router.route("/callback", post(callback::callback));
    }

    router
        // Every other route (/help, /fibonacci, /hash, /reverse,
        // /timestamp, /createfile, /deletefile, /sleep, /simulate,
        // /loadtest, /toupper, /random) rides the unary dispatch path; the
        // handler itself rejects non-GET with 405.
        .fallback(leaf::dispatch_leaf)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
