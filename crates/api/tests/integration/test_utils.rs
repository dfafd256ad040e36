use std::sync::Arc;

use dtest_api::create_app;
use dtest_core::DistributedConfig;
use dtest_dispatcher::Coordinator;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub struct TestApp {
    pub address: String,
    pub coordinator: Arc<Coordinator>,
    pub client: reqwest::Client,
    server: JoinHandle<()>,
}

impl TestApp {
    pub async fn spawn() -> TestApp {
        Self::spawn_with(DistributedConfig::default()).await
    }

    pub async fn spawn_with(config: DistributedConfig) -> TestApp {
        let coordinator = Arc::new(Coordinator::new(config).expect("Failed to create coordinator"));
        let app = create_app(Arc::clone(&coordinator));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();

        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Server failed");
        });

        TestApp {
            address: format!("http://127.0.0.1:{}", port),
            coordinator,
            client: reqwest::Client::new(),
            server,
        }
    }

    pub async fn post(&self, path: &str, body: Value) -> reqwest::Response {
        self.client
            .post(format!("{}{}", self.address, path))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.address, path))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn register(&self, id: &str) {
        let response = self
            .post(
                "/register",
                json!({ "id": id, "address": format!("{id}.local:8081") }),
            )
            .await;
        assert_eq!(response.status(), 200);
    }

    pub async fn submit(&self, test_name: &str) -> String {
        let response = self.post("/task", json!({ "test_name": test_name })).await;
        assert_eq!(response.status(), 201);
        let body: Value = response.json().await.unwrap();
        body["data"]["task_id"].as_str().unwrap().to_string()
    }

    pub fn cleanup(self) {
        self.server.abort();
    }
}
