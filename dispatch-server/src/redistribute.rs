//! Task redistributor: drains a failed worker's pending queue and
//! re-enqueues each task on a healthy peer.

use std::sync::Arc;
use std::time::Duration;

use dispatch_core::{DispatchError, SelectionPolicy, WorkerRegistry};

use crate::client::WorkerClient;

/// Drain `failed`'s pending queue and redistribute each task onto a healthy
/// peer, forwarding it immediately. Tasks for which no healthy peer exists
/// are logged as abandoned — the client has already been served a response
/// at the point of original failure.
pub async fn redistribute(
    registry: &WorkerRegistry,
    policy: SelectionPolicy,
    client: &WorkerClient,
    read_timeout: Duration,
    failed_worker_id: dispatch_core::WorkerId,
    max_retries: u32,
) {
    let failed = match registry.get(failed_worker_id).await {
        Some(d) => d,
        None => return,
    };

    // Drain under the descriptor's own lock into a local buffer, then
    // release before re-enqueuing, to avoid lock inversion.
    let drained = failed.drain_pending();
    if drained.is_empty() {
        return;
    }

    tracing::info!(
        worker = %failed_worker_id,
        count = drained.len(),
        "redistributing pending tasks off failed worker"
    );

    for mut task in drained {
        if task.retry_count >= max_retries {
            tracing::warn!(task_id = task.id.0, "task exceeded retry cap, abandoning");
            if let Some(reply) = task.reply.take() {
                let _ = reply.send(Err(DispatchError::NoWorker));
            }
            continue;
        }
        task.retry_count += 1;

        match policy.select(registry).await {
            Some(peer) => match peer.try_enqueue(task) {
                Ok(()) => {
                    peer.increment_active();
                    // pending is a staging area, not a persistent backlog —
                    // pop the head straight back off and forward it now,
                    // just like a freshly-arrived task would be.
                    if let Some(mut requeued) = peer.pop_front() {
                        let outcome = client
                            .forward(&peer.address, &requeued.request, read_timeout)
                            .await;
                        peer.decrement_active();
                        if outcome.is_ok() {
                            peer.bump_completed();
                        }
                        if let Some(reply) = requeued.reply.take() {
                            let _ = reply.send(outcome);
                        }
                    }
                }
                Err(DispatchError::Overloaded) => {
                    tracing::warn!(
                        worker = %peer.id,
                        "redistribution target overloaded, task abandoned"
                    );
                }
                Err(_) => {}
            },
            None => {
                tracing::warn!("no healthy peer available, task abandoned (NoWorker)");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dispatch_core::{Task, TaskId, WorkerRequest};

    fn req() -> WorkerRequest {
        WorkerRequest {
            method: "GET",
            path: "/ping".into(),
            query: vec![],
            body: None,
            content_type: None,
        }
    }

    #[tokio::test]
    async fn redistribution_is_a_no_op_on_empty_queue() {
        let registry = WorkerRegistry::new(10);
        let outcome = registry.register("w1").await;
        registry.register("w2").await;
        let client = WorkerClient::new();
        redistribute(
            &registry,
            SelectionPolicy::RoundRobin,
            &client,
            Duration::from_millis(50),
            outcome.id,
            1,
        )
        .await;
        // No panic, no peer touched.
    }

    #[tokio::test]
    async fn abandoned_task_reports_no_worker_when_no_peer_available() {
        let registry = WorkerRegistry::new(10);
        let outcome = registry.register("w1").await;
        let snap = registry.snapshot().await;
        let (tx, rx) = tokio::sync::oneshot::channel();
        let mut task = Task::new(TaskId(1), req());
        task.reply = Some(tx);
        snap[0].try_enqueue(task).unwrap();

        let client = WorkerClient::new();
        redistribute(
            &registry,
            SelectionPolicy::RoundRobin,
            &client,
            Duration::from_millis(50),
            outcome.id,
            1,
        )
        .await;

        let result = rx.await.unwrap();
        assert!(matches!(result, Err(DispatchError::NoWorker)));
    }

    #[tokio::test]
    async fn pending_task_is_requeued_and_forwarded_to_a_healthy_peer() {
        let worker = axum::Router::new().route("/ping", axum::routing::get(|| async { "pong" }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        tokio::spawn(async move {
            axum::serve(listener, worker).await.unwrap();
        });

        let registry = WorkerRegistry::new(10);
        let failed = registry.register("127.0.0.1:1").await;
        registry.register(&addr).await;

        let snap = registry.snapshot().await;
        let failed_descriptor = snap.iter().find(|d| d.id == failed.id).unwrap();
        failed_descriptor.set_healthy(false);

        let (tx, rx) = tokio::sync::oneshot::channel();
        let mut task = Task::new(TaskId(1), req());
        task.reply = Some(tx);
        failed_descriptor.try_enqueue(task).unwrap();

        let client = WorkerClient::new();
        redistribute(
            &registry,
            SelectionPolicy::RoundRobin,
            &client,
            Duration::from_millis(500),
            failed.id,
            1,
        )
        .await;

        let result = rx.await.unwrap();
        let response = result.expect("task should have been forwarded to the live peer");
        assert_eq!(response.body, bytes::Bytes::from_static(b"pong"));
        assert_eq!(failed_descriptor.pending_len(), 0);
    }
}
