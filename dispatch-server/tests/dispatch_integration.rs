//! End-to-end coverage against real in-process worker servers, driven
//! through the router with `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::{get, post};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use dispatch_server::{build_router, AppState, DispatchConfig};

async fn spawn_mock_worker(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr.to_string()
}

fn test_config() -> DispatchConfig {
    let mut config = DispatchConfig::from_env();
    config.worker_max_capacity = 100;
    config
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn word_count_happy_path() {
    let worker = Router::new().route(
        "/countchunk",
        post(|body: axum::body::Bytes| async move {
            let text = String::from_utf8_lossy(&body);
            text.split_whitespace().count().to_string()
        }),
    );
    let addr1 = spawn_mock_worker(worker.clone()).await;
    let addr2 = spawn_mock_worker(worker.clone()).await;
    let addr3 = spawn_mock_worker(worker).await;

    let state = Arc::new(AppState::new(test_config()));
    state.registry.register(&addr1).await;
    state.registry.register(&addr2).await;
    state.registry.register(&addr3).await;

    let router = build_router(state);
    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/countwords")
                .body(Body::from("a b c\nd e\nf\n"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "Conteo total de palabras: 6\n");
}

#[tokio::test]
async fn word_count_fewer_lines_than_workers() {
    let worker = Router::new().route(
        "/countchunk",
        post(|body: axum::body::Bytes| async move {
            let text = String::from_utf8_lossy(&body);
            text.split_whitespace().count().to_string()
        }),
    );
    let addr1 = spawn_mock_worker(worker.clone()).await;
    let addr2 = spawn_mock_worker(worker.clone()).await;
    let addr3 = spawn_mock_worker(worker).await;

    let state = Arc::new(AppState::new(test_config()));
    state.registry.register(&addr1).await;
    state.registry.register(&addr2).await;
    state.registry.register(&addr3).await;

    let router = build_router(state);
    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/countwords")
                .body(Body::from("hello world\n"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "Conteo total de palabras: 2\n");
}

#[tokio::test]
async fn pi_estimation_with_fixed_worker_replies() {
    let counter = Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let c1 = counter.clone();
    let worker = Router::new().route(
        "/calculatepi",
        get(move || {
            let c = c1.clone();
            async move {
                let n = c.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                if n == 0 { "393".to_string() } else { "392".to_string() }
            }
        }),
    );
    let addr1 = spawn_mock_worker(worker.clone()).await;
    let addr2 = spawn_mock_worker(worker).await;

    let state = Arc::new(AppState::new(test_config()));
    state.registry.register(&addr1).await;
    state.registry.register(&addr2).await;

    let router = build_router(state);
    let response = router
        .oneshot(
            Request::builder()
                .uri("/calculatepi?iterations=1000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "Estimación de Pi: 3.140000\n");
}

#[tokio::test]
async fn all_workers_unhealthy_returns_503() {
    let state = Arc::new(AppState::new(test_config()));
    let outcome = state.registry.register("127.0.0.1:1").await;
    let descriptor = state.registry.get(outcome.id).await.unwrap();
    descriptor.set_healthy(false);

    let router = build_router(state);
    let response = router
        .oneshot(
            Request::builder()
                .uri("/fibonacci?num=5")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn registration_is_idempotent_over_http() {
    let state = Arc::new(AppState::new(test_config()));
    let router = build_router(state);

    let r1 = router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/suscribir?url=127.0.0.1:9001")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(r1.status(), StatusCode::OK);
    let body1 = body_string(r1).await;

    let r2 = router
        .oneshot(
            Request::builder()
                .uri("/suscribir?url=127.0.0.1:9001")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(r2.status(), StatusCode::OK);
    let body2 = body_string(r2).await;

    assert!(body1.contains("\"status\":\"registered\""));
    assert!(body2.contains("\"status\":\"already_registered\""));
    assert!(body1.contains("\"id\":\"1\""));
    assert!(body2.contains("\"id\":\"1\""));
}

#[tokio::test]
async fn ping_replies_pong() {
    let state = Arc::new(AppState::new(test_config()));
    let router = build_router(state);
    let response = router
        .oneshot(Request::builder().uri("/ping").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "pong");
}
