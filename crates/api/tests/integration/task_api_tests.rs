use super::test_utils::TestApp;
use serde_json::{json, Value};

#[tokio::test]
async fn test_submit_task_without_workers_stays_pending() {
    let app = TestApp::spawn().await;
    let task_id = app.submit("integration_suite").await;

    let response = app.get(&format!("/task/{}", task_id)).await;
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["status"], "pending");
    assert!(body["data"]["assigned_to"].is_null());

    app.cleanup();
}

#[tokio::test]
async fn test_submit_task_with_parameters() {
    let app = TestApp::spawn().await;
    app.register("worker1").await;

    let response = app
        .post(
            "/task",
            json!({
                "test_name": "checkout",
                "parameters": { "browser": "firefox", "retries": 2 },
                "priority": 5
            }),
        )
        .await;
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    let task_id = body["data"]["task_id"].as_str().unwrap();

    let task = app.coordinator.get_task(task_id).await.unwrap();
    assert_eq!(task.priority, 5);
    assert_eq!(task.parameters["browser"], "firefox");
    // 参数值可以是任意JSON，不限于字符串
    assert_eq!(task.parameters["retries"], 2);
    assert_eq!(task.assigned_to.as_deref(), Some("worker1"));

    app.cleanup();
}

#[tokio::test]
async fn test_submit_task_invalid_name() {
    let app = TestApp::spawn().await;

    let response = app.post("/task", json!({ "test_name": "" })).await;
    assert_eq!(response.status(), 400);
    assert!(app.coordinator.list_tasks().await.is_empty());

    app.cleanup();
}

#[tokio::test]
async fn test_complete_task_flow() {
    let app = TestApp::spawn().await;
    app.register("worker1").await;
    let task_id = app.submit("login").await;

    let response = app.get(&format!("/task/{}/result", task_id)).await;
    assert_eq!(response.status(), 404);

    let response = app
        .post(
            "/task/complete",
            json!({
                "task_id": task_id,
                "status": "pass",
                "duration_ms": 1200,
                "output": "3 passed"
            }),
        )
        .await;
    assert_eq!(response.status(), 200);

    let response = app.get(&format!("/task/{}/result", task_id)).await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["status"], "pass");
    assert_eq!(body["data"]["duration_ms"], 1200);
    assert_eq!(body["data"]["output"], "3 passed");

    let body: Value = app
        .get(&format!("/task/{}", task_id))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"]["status"], "completed");

    // 重复上报
    let response = app
        .post(
            "/task/complete",
            json!({ "task_id": task_id, "status": "fail", "duration_ms": 5, "output": "" }),
        )
        .await;
    assert_eq!(response.status(), 409);

    app.cleanup();
}

#[tokio::test]
async fn test_complete_unknown_task() {
    let app = TestApp::spawn().await;

    let response = app
        .post(
            "/task/complete",
            json!({ "task_id": "missing", "status": "pass", "duration_ms": 1, "output": "" }),
        )
        .await;
    assert_eq!(response.status(), 404);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["type"], "TASK_NOT_FOUND");

    app.cleanup();
}

#[tokio::test]
async fn test_complete_task_malformed_body() {
    let app = TestApp::spawn().await;
    app.register("worker1").await;
    let task_id = app.submit("login").await;

    let response = app
        .post("/task/complete", json!({ "task_id": task_id, "status": "maybe" }))
        .await;
    assert_eq!(response.status(), 400);
    assert!(app.coordinator.get_task_result(&task_id).await.is_none());

    app.cleanup();
}

#[tokio::test]
async fn test_get_unknown_task() {
    let app = TestApp::spawn().await;

    let response = app.get("/task/does-not-exist").await;
    assert_eq!(response.status(), 404);

    app.cleanup();
}
