//! Control endpoint behaviour over real HTTP.

use admission_harness::config::ServerConfig;
use serde_json::{json, Value};

mod common;

#[tokio::test]
async fn test_defaults_are_exposed() {
    let server = common::start_server(ServerConfig::default()).await;
    let client = common::client();

    let rate: Value = client.get(server.url("/rate-limit")).send().await.unwrap().json().await.unwrap();
    assert_eq!(rate, json!({ "rate": 0.0, "burst": 1 }));

    let time: Value = client.get(server.url("/time-limit")).send().await.unwrap().json().await.unwrap();
    assert_eq!(time, json!({ "timeLimit": 0 }));

    let delay: Value = client.get(server.url("/delay")).send().await.unwrap().json().await.unwrap();
    assert_eq!(delay, json!({ "minimumDelay": 0, "maximumDelay": 0 }));
}

#[tokio::test]
async fn test_put_then_get_round_trips_and_gets_are_idempotent() {
    let server = common::start_server(ServerConfig::default()).await;
    let client = common::client();

    let res = client
        .put(server.url("/delay"))
        .json(&json!({ "minimumDelay": 10, "maximumDelay": 50 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let echoed: Value = res.json().await.unwrap();
    assert_eq!(echoed, json!({ "minimumDelay": 10, "maximumDelay": 50 }));

    for _ in 0..3 {
        let current: Value = client.get(server.url("/delay")).send().await.unwrap().json().await.unwrap();
        assert_eq!(current, echoed);
    }

    let res = client
        .put(server.url("/delay"))
        .json(&json!({ "delay": 25 }))
        .send()
        .await
        .unwrap();
    let fixed: Value = res.json().await.unwrap();
    assert_eq!(fixed, json!({ "minimumDelay": 25, "maximumDelay": 25 }));

    let res = client
        .put(server.url("/time-limit"))
        .json(&json!({ "timeLimit": 250 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let time: Value = client.get(server.url("/time-limit")).send().await.unwrap().json().await.unwrap();
    assert_eq!(time, json!({ "timeLimit": 250 }));
}

#[tokio::test]
async fn test_invalid_updates_leave_config_unchanged() {
    let server = common::start_server(ServerConfig::default()).await;
    let client = common::client();

    client
        .put(server.url("/rate-limit"))
        .json(&json!({ "rate": 5.0, "burst": 2 }))
        .send()
        .await
        .unwrap();

    for body in [
        json!({ "rate": -1.0, "burst": 2 }),
        json!({ "rate": 5.0, "burst": 0 }),
    ] {
        let res = client.put(server.url("/rate-limit")).json(&body).send().await.unwrap();
        assert_eq!(res.status(), 400);
        let err: Value = res.json().await.unwrap();
        assert!(err["error"].is_string());
    }

    let res = client
        .put(server.url("/rate-limit"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);

    let res = client
        .put(server.url("/delay"))
        .json(&json!({ "minimumDelay": 50, "maximumDelay": 10 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);

    let res = client
        .put(server.url("/time-limit"))
        .json(&json!({ "timeLimit": -1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);

    let rate: Value = client.get(server.url("/rate-limit")).send().await.unwrap().json().await.unwrap();
    assert_eq!(rate, json!({ "rate": 5.0, "burst": 2 }));
    let delay: Value = client.get(server.url("/delay")).send().await.unwrap().json().await.unwrap();
    assert_eq!(delay, json!({ "minimumDelay": 0, "maximumDelay": 0 }));
}

#[tokio::test]
async fn test_control_endpoints_bypass_rate_gate() {
    let server = common::start_server(ServerConfig::default()).await;
    let client = common::client();

    client
        .put(server.url("/rate-limit"))
        .json(&json!({ "rate": 0.001, "burst": 1 }))
        .send()
        .await
        .unwrap();

    for _ in 0..5 {
        let res = client.get(server.url("/rate-limit")).send().await.unwrap();
        assert_eq!(res.status(), 200);
    }
}
