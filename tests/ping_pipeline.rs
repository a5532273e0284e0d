//! End-to-end behaviour of the `/ping` pipeline.

use std::time::{Duration, Instant};

use admission_harness::config::{DeadlineConfig, DelayConfig, RateLimitConfig, ServerConfig};
use serde_json::{json, Value};

mod common;

#[tokio::test]
async fn test_ping_answers_pong_with_request_id() {
    let server = common::start_server(ServerConfig::default()).await;
    let res = common::client().get(server.url("/ping")).send().await.unwrap();

    assert_eq!(res.status(), 200);
    assert!(res.headers().contains_key("x-request-id"));
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "message": "pong" }));
}

#[tokio::test]
async fn test_back_to_back_pings_with_single_token() {
    let server = common::start_server(ServerConfig::default()).await;
    let client = common::client();

    let res = client
        .put(server.url("/rate-limit"))
        .json(&json!({ "rate": 1.0, "burst": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    let first = client.get(server.url("/ping")).send().await.unwrap();
    let second = client.get(server.url("/ping")).send().await.unwrap();
    assert_eq!(first.status(), 200);
    assert_eq!(second.status(), 429);
    let body: Value = second.json().await.unwrap();
    assert_eq!(body, json!({ "error": "rate limit exceeded" }));
}

#[tokio::test]
async fn test_disabling_rate_limit_admits_everything() {
    let config = ServerConfig {
        rate_limit: RateLimitConfig { rate: 0.5, burst: 1 },
        ..ServerConfig::default()
    };
    let server = common::start_server(config).await;
    let client = common::client();

    assert_eq!(client.get(server.url("/ping")).send().await.unwrap().status(), 200);
    assert_eq!(client.get(server.url("/ping")).send().await.unwrap().status(), 429);

    client
        .put(server.url("/rate-limit"))
        .json(&json!({ "rate": 0.0, "burst": 1 }))
        .send()
        .await
        .unwrap();
    for _ in 0..10 {
        assert_eq!(client.get(server.url("/ping")).send().await.unwrap().status(), 200);
    }
}

#[tokio::test]
async fn test_delay_longer_than_deadline_times_out() {
    let config = ServerConfig {
        time_limit: DeadlineConfig::from_millis(50),
        delay: DelayConfig::fixed(2_000),
        ..ServerConfig::default()
    };
    let server = common::start_server(config).await;

    let started = Instant::now();
    let res = common::client().get(server.url("/ping")).send().await.unwrap();
    assert_eq!(res.status(), 504);
    assert!(started.elapsed() < Duration::from_millis(1_500));
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "error": "context deadline exceeded" }));
}

#[tokio::test]
async fn test_fixed_delay_within_deadline_completes() {
    let config = ServerConfig {
        time_limit: DeadlineConfig::from_millis(2_000),
        delay: DelayConfig::fixed(100),
        ..ServerConfig::default()
    };
    let server = common::start_server(config).await;

    let started = Instant::now();
    let res = common::client().get(server.url("/ping")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert!(started.elapsed() >= Duration::from_millis(100));
}

#[tokio::test]
async fn test_upstream_body_becomes_message() {
    let upstream = common::start_mock_upstream("pong from upstream").await;
    let mut config = ServerConfig::default();
    config.upstream.url = Some(format!("http://{upstream}/ping2"));
    let server = common::start_server(config).await;

    let res = common::client().get(server.url("/ping")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "message": "pong from upstream" }));
}

#[tokio::test]
async fn test_failing_upstream_is_bad_gateway() {
    let upstream =
        common::start_programmable_upstream(|| async { (500, "boom".to_string()) }).await;
    let mut config = ServerConfig::default();
    config.upstream.url = Some(format!("http://{upstream}/ping2"));
    let server = common::start_server(config).await;

    let res = common::client().get(server.url("/ping")).send().await.unwrap();
    assert_eq!(res.status(), 502);
    let body: Value = res.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_slow_upstream_hits_deadline() {
    let upstream = common::start_programmable_upstream(|| async {
        tokio::time::sleep(Duration::from_secs(2)).await;
        (200, "late".to_string())
    })
    .await;
    let mut config = ServerConfig::default();
    config.time_limit = DeadlineConfig::from_millis(100);
    config.upstream.url = Some(format!("http://{upstream}/ping2"));
    let server = common::start_server(config).await;

    let res = common::client().get(server.url("/ping")).send().await.unwrap();
    assert_eq!(res.status(), 504);
}
