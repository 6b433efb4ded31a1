//! dispatch-server — the axum binary around `dispatch_core`: inbound HTTP
//! framing, the outbound worker client, the health prober, and route
//! handlers. Exposed as a library so integration tests can exercise
//! `build_router` directly with `tower::ServiceExt::oneshot`.

pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod health;
pub mod redistribute;
pub mod router;
pub mod state;

pub use config::DispatchConfig;
pub use health::HealthProber;
pub use router::build_router;
pub use state::AppState;
