//! Rate limiting over real connections.

use axum::{routing::get, Router};
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;

use gatekeeper::config::ServerConfig;
use gatekeeper::http::healthcheck;

mod common;

fn downstream() -> Router {
    Router::new().route("/", get(|| async { "hello" }))
}

#[tokio::test]
async fn test_burst_then_reject_then_refill() {
    let server = common::start_server(common::limited_config(2.0, 4), downstream()).await;
    let client = common::client();

    let mut statuses = Vec::new();
    let mut retry_after = None;
    for _ in 0..6 {
        let res = client.get(server.url("/")).send().await.expect("server unreachable");
        if res.status() == StatusCode::TOO_MANY_REQUESTS {
            retry_after = res.headers().get("retry-after").cloned();
        }
        statuses.push(res.status());
    }

    assert_eq!(
        statuses,
        [
            StatusCode::OK,
            StatusCode::OK,
            StatusCode::OK,
            StatusCode::OK,
            StatusCode::TOO_MANY_REQUESTS,
            StatusCode::TOO_MANY_REQUESTS,
        ]
    );
    assert_eq!(retry_after.as_ref().map(|v| v.to_str().unwrap()), Some("1"));
    assert_eq!(server.controller.registry().len(), 1);
    assert!(server.controller.registry().contains("127.0.0.1"));

    tokio::time::sleep(Duration::from_millis(600)).await;
    let res = client.get(server.url("/")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    server.shutdown.trigger();
    server.handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_rejection_body_is_json() {
    let server = common::start_server(common::limited_config(1.0, 1), downstream()).await;
    let client = common::client();

    assert_eq!(client.get(server.url("/")).send().await.unwrap().status(), StatusCode::OK);

    let res = client.get(server.url("/")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "rate limit exceeded");

    server.shutdown.trigger();
    server.handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_disabled_limiter_admits_everything() {
    let mut config = ServerConfig::default();
    config.limiter.enabled = false;
    config.limiter.burst = 1;
    let server = common::start_server(config, downstream()).await;
    let client = common::client();

    for _ in 0..25 {
        let res = client.get(server.url("/")).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }
    assert!(server.controller.registry().is_empty());

    server.shutdown.trigger();
    server.handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_healthcheck_behind_limiter() {
    let server = common::start_server(common::limited_config(2.0, 4), healthcheck::routes()).await;
    let client = common::client();

    let res = client.get(server.url("/v1/healthcheck")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("x-request-id"));

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "available");
    assert_eq!(body["system_info"]["version"], env!("CARGO_PKG_VERSION"));

    server.shutdown.trigger();
    server.handle.await.unwrap().unwrap();
}
