//! Integration tests for the live telemetry client with Wiremock
//!
//! Runs the client against a mock metrics endpoint.

use std::sync::Arc;
use std::time::Duration;
use udo_telemetry::application::CONNECTION_FAILED_MESSAGE;
use udo_telemetry::{ConnectionHealth, HttpMetricsSource, LiveTelemetryClient, PollConfig};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn engine_payload(total_rows: u64) -> serde_json::Value {
    serde_json::json!({
        "total_rows": total_rows,
        "avg_latency": 12.5,
        "total_tokens_saved": 9000,
        "recent_metrics": [{
            "id": 1,
            "timestamp": "2026-01-18T00:00:00Z",
            "processed_rows": 100,
            "latency_ms": 12.5,
            "tokens_saved": 50,
            "operation": "prune"
        }]
    })
}

fn client_for(mock_server: &MockServer, interval: Duration) -> LiveTelemetryClient {
    let source = HttpMetricsSource::new(format!("{}/metrics", mock_server.uri()), "viewer-secret")
        .unwrap();
    LiveTelemetryClient::new(
        Arc::new(source),
        PollConfig {
            interval,
            drain_timeout: Duration::from_millis(200),
        },
    )
}

/// Engine returns a full snapshot
#[tokio::test]
async fn test_successful_poll_stores_snapshot() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/metrics"))
        .and(header("authorization", "Bearer viewer-secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(engine_payload(1500)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, Duration::from_secs(2));
    client.poll_once().await;

    let view = client.view();
    let snapshot = view.snapshot.unwrap();
    assert_eq!(snapshot.total_rows, 1500);
    assert_eq!(snapshot.avg_latency_ms, 12.5);
    assert_eq!(snapshot.total_tokens_saved, 9000);
    assert_eq!(snapshot.recent_samples.len(), 1);
    assert!(view.error.is_none());
    assert_eq!(view.health, Some(ConnectionHealth::Online));
}

/// Engine answers 500
#[tokio::test]
async fn test_server_error_sets_offline() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/metrics"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, Duration::from_secs(2));
    client.poll_once().await;

    let view = client.view();
    assert!(view.snapshot.is_none());
    assert_eq!(view.error.as_deref(), Some(CONNECTION_FAILED_MESSAGE));
    assert_eq!(view.health, Some(ConnectionHealth::Offline));
}

/// First poll succeeds, second fails: the snapshot survives
#[tokio::test]
async fn test_failure_after_success_keeps_snapshot() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/metrics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(engine_payload(10)))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/metrics"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, Duration::from_secs(2));
    client.poll_once().await;
    client.poll_once().await;

    let view = client.view();
    assert_eq!(view.snapshot.unwrap().total_rows, 10);
    assert!(view.error.is_some());
    assert_eq!(view.health, Some(ConnectionHealth::Offline));
}

/// Malformed body counts as a failed fetch
#[tokio::test]
async fn test_malformed_payload_sets_offline() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/metrics"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "total_rows": "lots" })),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, Duration::from_secs(2));
    client.poll_once().await;

    assert_eq!(client.health(), Some(ConnectionHealth::Offline));
    assert!(client.view().error.is_some());
}

/// Identical responses leave the snapshot value-equal
#[tokio::test]
async fn test_identical_responses_do_not_accumulate() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/metrics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(engine_payload(1500)))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, Duration::from_secs(2));
    client.poll_once().await;
    let first = client.view().snapshot;

    client.poll_once().await;
    let second = client.view().snapshot;

    assert_eq!(first, second);
    assert_eq!(second.unwrap().recent_samples.len(), 1);
}

/// Engine down, then back up
#[tokio::test]
async fn test_recovers_when_engine_comes_back() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/metrics"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/metrics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(engine_payload(77)))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, Duration::from_secs(2));
    client.poll_once().await;
    client.poll_once().await;
    assert_eq!(client.health(), Some(ConnectionHealth::Offline));

    client.poll_once().await;
    let view = client.view();
    assert_eq!(view.health, Some(ConnectionHealth::Online));
    assert!(view.error.is_none());
    assert_eq!(view.snapshot.unwrap().total_rows, 77);
}

/// Scheduled polling hits the endpoint repeatedly and stops cleanly
#[tokio::test]
async fn test_scheduled_polling_against_mock_server() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/metrics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(engine_payload(1500)))
        .mount(&mock_server)
        .await;

    let handle = client_for(&mock_server, Duration::from_millis(50)).start();

    tokio::time::sleep(Duration::from_millis(300)).await;
    let view = handle.stop().await;
    // Let any request that was already on the wire land
    tokio::time::sleep(Duration::from_millis(100)).await;

    let received = mock_server.received_requests().await.unwrap().len();
    assert!(received >= 2, "expected repeated polls, got {}", received);
    assert_eq!(view.snapshot.unwrap().total_rows, 1500);

    tokio::time::sleep(Duration::from_millis(200)).await;
    let after_stop = mock_server.received_requests().await.unwrap().len();
    assert_eq!(after_stop, received);
}

/// Unreachable engine keeps the client polling and offline
#[tokio::test]
async fn test_unreachable_engine() {
    // Bind then release a port so nothing listens on it
    let port = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    };
    let source =
        HttpMetricsSource::new(format!("http://127.0.0.1:{}/metrics", port), "t").unwrap();
    let client = LiveTelemetryClient::new(
        Arc::new(source),
        PollConfig {
            interval: Duration::from_millis(50),
            drain_timeout: Duration::from_millis(200),
        },
    );

    let view = client
        .run_until(tokio::time::sleep(Duration::from_millis(300)))
        .await;

    assert!(view.snapshot.is_none());
    assert_eq!(view.health, Some(ConnectionHealth::Offline));
    assert!(view.polls_failed >= 2);
}
