//! Dispatcher process entry point.

use std::sync::Arc;

use dispatch_server::{build_router, AppState, DispatchConfig, HealthProber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = DispatchConfig::from_env();
    tracing::info!(?config, "starting dispatcher");

    let state = Arc::new(AppState::new(config.clone()));

    let prober = HealthProber::new(
        state.registry.clone(),
        state.client.clone(),
        state.policy,
        config.health_probe_interval,
        config.health_probe_timeout,
        config.worker_read_timeout,
        config.max_redistribution_retries,
    );
    tokio::spawn(async move { prober.run().await });

    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "dispatcher listening");
    axum::serve(listener, router).await?;

    Ok(())
}
