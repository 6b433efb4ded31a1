//! Process configuration, read once from the environment at startup.

use std::time::Duration;

use dispatch_core::SelectionPolicy;

#[derive(Debug, Clone)]
pub struct DispatchConfig {
    pub bind_addr: String,
    pub selection_policy: SelectionPolicy,
    pub worker_max_capacity: usize,
    pub health_probe_interval: Duration,
    pub health_probe_timeout: Duration,
    pub worker_read_timeout: Duration,
    pub async_callbacks_enabled: bool,
    pub callback_timeout: Duration,
    pub max_redistribution_retries: u32,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl DispatchConfig {
    pub fn from_env() -> Self {
        let policy = match std::env::var("DISPATCH_SELECTION_POLICY")
            .unwrap_or_else(|_| "round_robin".into())
            .to_lowercase()
            .as_str()
        {
            "least_loaded" => SelectionPolicy::LeastLoaded,
            _ => SelectionPolicy::RoundRobin,
        };

        Self {
            bind_addr: std::env::var("DISPATCH_BIND_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:8080".into()),
            selection_policy: policy,
            worker_max_capacity: env_or("DISPATCH_WORKER_MAX_CAPACITY", 100usize),
            health_probe_interval: Duration::from_millis(env_or(
                "DISPATCH_HEALTH_PROBE_INTERVAL_MS",
                10_000u64,
            )),
            health_probe_timeout: Duration::from_millis(env_or(
                "DISPATCH_HEALTH_PROBE_TIMEOUT_MS",
                5_000u64,
            )),
            worker_read_timeout: Duration::from_millis(env_or(
                "DISPATCH_WORKER_READ_TIMEOUT_MS",
                5_000u64,
            )),
            async_callbacks_enabled: env_or("DISPATCH_ASYNC_CALLBACKS", false),
            callback_timeout: Duration::from_millis(env_or(
                "DISPATCH_CALLBACK_TIMEOUT_MS",
                5_000u64,
            )),
            max_redistribution_retries: env_or("DISPATCH_MAX_REDISTRIBUTION_RETRIES", 1u32),
        }
    }
}
