//! Tests for the HTTP transport against a stub service.

use std::time::Duration;

use serde_json::json;
use taskflow_client::{
    ConnectivityMonitor, Error, HttpRemote, ModifiedStamp, Priority, Stage, SyncConfig,
    TaskRecord, TaskRemote,
};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn task_body(id: &str, stamp: u64) -> serde_json::Value {
    json!({
        "id": id,
        "projectId": "proj-1",
        "title": "Wire task",
        "stage": "in-progress",
        "priority": "high",
        "updatedAt": stamp,
    })
}

fn remote_for(server: &MockServer) -> HttpRemote {
    HttpRemote::new(&SyncConfig::new(server.uri())).unwrap()
}

#[tokio::test]
async fn fetch_parses_the_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tasks/task-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": true,
            "task": task_body("task-1", 5000),
        })))
        .mount(&server)
        .await;

    let remote = remote_for(&server);
    let task = remote.fetch("task-1").await.unwrap().unwrap();

    assert_eq!(task.id, "task-1");
    assert_eq!(task.stage, Stage::InProgress);
    assert_eq!(task.updated_at, ModifiedStamp::from_millis(5000));
}

#[tokio::test]
async fn fetch_missing_task_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tasks/ghost"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let remote = remote_for(&server);
    assert!(remote.fetch("ghost").await.unwrap().is_none());
}

#[tokio::test]
async fn create_posts_the_task_and_returns_the_stored_copy() {
    let task = TaskRecord::new(
        "task-1",
        "proj-1",
        "Wire task",
        Stage::Todo,
        Priority::Low,
        ModifiedStamp::ZERO,
    );

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tasks"))
        .and(body_json(task.to_payload()))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "status": true,
            "task": task_body("task-1", 9000),
        })))
        .mount(&server)
        .await;

    let remote = remote_for(&server);
    let saved = remote.create(&task).await.unwrap();
    assert_eq!(saved.updated_at, ModifiedStamp::from_millis(9000));
}

#[tokio::test]
async fn update_puts_the_partial_payload() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/tasks/task-1"))
        .and(body_json(json!({"stage": "completed"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": true,
            "task": task_body("task-1", 9500),
        })))
        .mount(&server)
        .await;

    let remote = remote_for(&server);
    let saved = remote
        .update("task-1", &json!({"stage": "completed"}))
        .await
        .unwrap();
    assert_eq!(saved.updated_at, ModifiedStamp::from_millis(9500));
}

#[tokio::test]
async fn delete_treats_missing_as_success() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/tasks/task-1"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let remote = remote_for(&server);
    remote.delete("task-1").await.unwrap();
}

#[tokio::test]
async fn client_errors_are_final_rejections() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/tasks/task-1"))
        .respond_with(ResponseTemplate::new(422).set_body_string("bad stage"))
        .mount(&server)
        .await;

    let remote = remote_for(&server);
    let err = remote
        .update("task-1", &json!({"stage": "nope"}))
        .await
        .unwrap_err();

    match &err {
        Error::Rejected { status, message } => {
            assert_eq!(*status, 422);
            assert_eq!(message, "bad stage");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!err.is_transient());
}

#[tokio::test]
async fn server_errors_are_transient() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tasks/task-1"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let remote = remote_for(&server);
    let err = remote.fetch("task-1").await.unwrap_err();
    assert!(err.is_transient());
}

#[tokio::test]
async fn failed_envelope_status_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tasks/task-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": false,
            "message": "index rebuilding",
        })))
        .mount(&server)
        .await;

    let remote = remote_for(&server);
    let err = remote.fetch("task-1").await.unwrap_err();
    assert!(matches!(err, Error::BadEnvelope(m) if m == "index rebuilding"));
}

#[tokio::test]
async fn bearer_token_is_sent_when_configured() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tasks/task-1"))
        .and(header("authorization", "Bearer secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": true,
            "task": task_body("task-1", 5000),
        })))
        .mount(&server)
        .await;

    let config = SyncConfig::new(server.uri()).with_auth_token("secret");
    let remote = HttpRemote::new(&config).unwrap();
    assert!(remote.fetch("task-1").await.unwrap().is_some());
}

#[tokio::test]
async fn fast_probe_leaves_the_connection_fast() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let monitor = ConnectivityMonitor::new();
    let http = reqwest::Client::new();
    monitor
        .probe_once(
            &http,
            &format!("{}/health", server.uri()),
            Duration::from_secs(2),
        )
        .await;

    assert!(!monitor.state().slow);
}

#[tokio::test]
async fn slow_probe_flags_the_connection() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(80)))
        .mount(&server)
        .await;

    let monitor = ConnectivityMonitor::new();
    let http = reqwest::Client::new();
    monitor
        .probe_once(
            &http,
            &format!("{}/health", server.uri()),
            Duration::from_millis(10),
        )
        .await;

    assert!(monitor.state().slow);
}

#[tokio::test]
async fn failed_probe_is_swallowed_and_degrades_state() {
    let monitor = ConnectivityMonitor::new();
    let http = reqwest::Client::builder()
        .timeout(Duration::from_millis(200))
        .build()
        .unwrap();

    // Nothing listens here; the probe must not panic or error out.
    monitor
        .probe_once(&http, "http://127.0.0.1:9", Duration::from_secs(2))
        .await;

    assert!(monitor.state().slow);
    assert!(monitor.state().online);
}
