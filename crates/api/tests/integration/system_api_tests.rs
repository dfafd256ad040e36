use super::test_utils::TestApp;
use serde_json::{json, Value};

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::spawn().await;

    let response = app.get("/health").await;
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");

    app.cleanup();
}

#[tokio::test]
async fn test_system_status() {
    let app = TestApp::spawn().await;
    app.register("worker1").await;
    app.register("worker2").await;

    let first = app.submit("a").await;
    app.submit("b").await;
    app.post(
        "/task/complete",
        json!({ "task_id": first, "status": "pass", "duration_ms": 10, "output": "" }),
    )
    .await;
    app.post(
        "/heartbeat",
        json!({ "worker_id": "worker2", "status": "offline", "load": 0 }),
    )
    .await;

    let response = app.get("/status").await;
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    let data = &body["data"];
    assert_eq!(data["workers"]["total"], 2);
    assert_eq!(data["workers"]["offline"], 1);
    assert_eq!(data["tasks"]["total"], 2);
    assert_eq!(data["tasks"]["completed"], 1);
    assert_eq!(data["load_balancing"], "round_robin");

    // worker2 下线释放的任务被重新分配给 worker1
    assert_eq!(data["tasks"]["running"], 1);
    assert_eq!(data["tasks"]["pending"], 0);

    app.cleanup();
}
