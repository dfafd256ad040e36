use super::test_utils::TestApp;
use dtest_core::{DistributedConfig, WorkerStatus};
use serde_json::{json, Value};

#[tokio::test]
async fn test_register_worker() {
    let app = TestApp::spawn().await;

    let response = app
        .post(
            "/register",
            json!({ "id": "worker1", "address": "10.0.0.1:8081" }),
        )
        .await;
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    assert!(body["success"].as_bool().unwrap());

    let worker = app.coordinator.get_worker("worker1").await.unwrap();
    assert_eq!(worker.address, "10.0.0.1:8081");
    assert_eq!(worker.status, WorkerStatus::Idle);

    app.cleanup();
}

#[tokio::test]
async fn test_register_missing_field() {
    let app = TestApp::spawn().await;

    let response = app.post("/register", json!({ "id": "worker1" })).await;
    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], 400);
    assert!(app.coordinator.list_workers().await.is_empty());

    app.cleanup();
}

#[tokio::test]
async fn test_register_invalid_address() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/register", json!({ "id": "worker1", "address": "no-port" }))
        .await;
    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["type"], "VALIDATION_ERROR");

    app.cleanup();
}

#[tokio::test]
async fn test_register_over_capacity() {
    let app = TestApp::spawn_with(DistributedConfig {
        max_workers: 1,
        ..Default::default()
    })
    .await;

    app.register("worker1").await;
    let response = app
        .post("/register", json!({ "id": "worker2", "address": "w2:8081" }))
        .await;
    assert_eq!(response.status(), 503);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["type"], "CAPACITY_EXCEEDED");

    app.cleanup();
}

#[tokio::test]
async fn test_heartbeat() {
    let app = TestApp::spawn().await;
    app.register("worker1").await;

    let response = app
        .post(
            "/heartbeat",
            json!({ "worker_id": "worker1", "status": "busy", "load": 3 }),
        )
        .await;
    assert_eq!(response.status(), 200);

    let worker = app.coordinator.get_worker("worker1").await.unwrap();
    assert_eq!(worker.status, WorkerStatus::Busy);
    assert_eq!(worker.load, 3);

    app.cleanup();
}

#[tokio::test]
async fn test_heartbeat_unknown_worker() {
    let app = TestApp::spawn().await;

    let response = app
        .post(
            "/heartbeat",
            json!({ "worker_id": "ghost", "status": "idle", "load": 0 }),
        )
        .await;
    assert_eq!(response.status(), 404);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["type"], "WORKER_NOT_FOUND");

    app.cleanup();
}

#[tokio::test]
async fn test_heartbeat_invalid_status() {
    let app = TestApp::spawn().await;
    app.register("worker1").await;

    let response = app
        .post(
            "/heartbeat",
            json!({ "worker_id": "worker1", "status": "napping", "load": 0 }),
        )
        .await;
    assert_eq!(response.status(), 400);

    let worker = app.coordinator.get_worker("worker1").await.unwrap();
    assert_eq!(worker.status, WorkerStatus::Idle);

    app.cleanup();
}

#[tokio::test]
async fn test_list_workers_sorted() {
    let app = TestApp::spawn().await;
    app.register("worker-b").await;
    app.register("worker-a").await;

    let response = app.get("/workers").await;
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    let ids: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|w| w["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["worker-a", "worker-b"]);

    app.cleanup();
}

#[tokio::test]
async fn test_worker_tasks() {
    let app = TestApp::spawn().await;
    app.register("worker1").await;
    let task_id = app.submit("smoke").await;

    let response = app.get("/workers/worker1/tasks").await;
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    let tasks = body["data"].as_array().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["id"], task_id.as_str());
    assert_eq!(tasks[0]["status"], "running");

    let response = app.get("/workers/nobody/tasks").await;
    assert_eq!(response.status(), 404);

    app.cleanup();
}
