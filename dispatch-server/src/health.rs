//! Periodic health probe: an `Arc`-held background task spawned once from
//! `main`, looping forever on a fixed interval, never holding a registry
//! lock while it does network I/O.

use std::sync::Arc;
use std::time::Duration;

use dispatch_core::{SelectionPolicy, WorkerRegistry};

use crate::client::WorkerClient;
use crate::redistribute::redistribute;

pub struct HealthProber {
    registry: Arc<WorkerRegistry>,
    client: WorkerClient,
    policy: SelectionPolicy,
    interval: Duration,
    dial_timeout: Duration,
    worker_read_timeout: Duration,
    max_redistribution_retries: u32,
}

impl HealthProber {
    pub fn new(
        registry: Arc<WorkerRegistry>,
        client: WorkerClient,
        policy: SelectionPolicy,
        interval: Duration,
        dial_timeout: Duration,
        worker_read_timeout: Duration,
        max_redistribution_retries: u32,
    ) -> Self {
        Self {
            registry,
            client,
            policy,
            interval,
            dial_timeout,
            worker_read_timeout,
            max_redistribution_retries,
        }
    }

    /// Run the probe loop. Never returns under normal operation — spawn via
    /// `tokio::spawn`.
    pub async fn run(&self) {
        tracing::info!(
            interval = ?self.interval,
            dial_timeout = ?self.dial_timeout,
            "health prober started"
        );
        loop {
            self.probe_all_once().await;
            tokio::time::sleep(self.interval).await;
        }
    }

    /// One round of probing every registered worker. Workers are probed
    /// concurrently so a single slow/dead worker never delays the others
    /// past `dial_timeout`.
    async fn probe_all_once(&self) {
        let snapshot = self.registry.snapshot().await;
        let mut handles = Vec::with_capacity(snapshot.len());
        for descriptor in snapshot {
            let client = self.client.clone();
            let dial_timeout = self.dial_timeout;
            handles.push(tokio::spawn(async move {
                let was_healthy = descriptor.is_healthy();
                let now_healthy = client.probe(&descriptor.address, dial_timeout).await;
                descriptor.set_healthy(now_healthy);
                if was_healthy != now_healthy {
                    tracing::info!(
                        worker = %descriptor.id,
                        address = %descriptor.address,
                        now_healthy,
                        "worker health transition"
                    );
                }
                (descriptor.id, was_healthy, now_healthy)
            }));
        }

        for handle in handles {
            let Ok((id, was_healthy, now_healthy)) = handle.await else {
                continue;
            };
            if was_healthy && !now_healthy {
                redistribute(
                    &self.registry,
                    self.policy,
                    &self.client,
                    self.worker_read_timeout,
                    id,
                    self.max_redistribution_retries,
                )
                .await;
            }
        }
    }
}
