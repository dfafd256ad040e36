use dtest_api::ApiResponse;
use dtest_core::{DistributedTestResult, SystemStatus, TestTask, WorkerStatus};
use dtest_errors::{CoordinatorError, CoordinatorResult};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};

/// Worker侧的协调器HTTP客户端
pub struct CoordinatorClient {
    coordinator_url: String,
    worker_id: String,
    address: String,
    http_client: reqwest::Client,
}

impl CoordinatorClient {
    pub fn new(
        coordinator_url: impl Into<String>,
        worker_id: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        let coordinator_url: String = coordinator_url.into();
        Self {
            coordinator_url: coordinator_url.trim_end_matches('/').to_string(),
            worker_id: worker_id.into(),
            address: address.into(),
            http_client: reqwest::Client::new(),
        }
    }

    pub fn worker_id(&self) -> &str {
        &self.worker_id
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn coordinator_url(&self) -> &str {
        &self.coordinator_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.coordinator_url, path)
    }

    /// 以空闲状态注册到协调器
    pub async fn register(&self) -> CoordinatorResult<()> {
        let body = json!({
            "id": self.worker_id,
            "address": self.address,
            "status": WorkerStatus::Idle,
            "load": 0,
        });

        let response = self.post("/register", &body).await.inspect_err(|e| {
            error!("Failed to connect to coordinator for registration: {}", e);
        })?;
        self.expect_empty(response, None).await.inspect_err(|e| {
            error!("Failed to register worker {}: {}", self.worker_id, e);
        })?;

        info!(
            "Successfully registered worker {} ({}) with coordinator {}",
            self.worker_id, self.address, self.coordinator_url
        );
        Ok(())
    }

    pub async fn send_heartbeat(&self, status: WorkerStatus, load: u32) -> CoordinatorResult<()> {
        let body = json!({
            "worker_id": self.worker_id,
            "status": status,
            "load": load,
        });

        let response = self.post("/heartbeat", &body).await?;
        self.expect_empty(response, None).await?;
        debug!(
            "Heartbeat sent successfully for worker {} (status={}, load={})",
            self.worker_id, status, load
        );
        Ok(())
    }

    /// 通知协调器本Worker下线，协调器会立即释放分配给它的任务
    pub async fn go_offline(&self) -> CoordinatorResult<()> {
        self.send_heartbeat(WorkerStatus::Offline, 0).await?;
        info!("Worker {} reported offline to coordinator", self.worker_id);
        Ok(())
    }

    /// 拉取当前分配给本Worker的运行中任务
    pub async fn fetch_assigned_tasks(&self) -> CoordinatorResult<Vec<TestTask>> {
        let path = format!("/workers/{}/tasks", self.worker_id);
        let response = self.get(&path).await?;
        let tasks: Option<Vec<TestTask>> = self.parse_data(response, None).await?;
        Ok(tasks.unwrap_or_default())
    }

    pub async fn complete_task(&self, result: &DistributedTestResult) -> CoordinatorResult<()> {
        let body = json!({
            "task_id": result.task_id,
            "status": result.status,
            "duration_ms": result.duration_ms,
            "output": result.output,
        });

        let response = self.post("/task/complete", &body).await?;
        self.expect_empty(response, Some(&result.task_id)).await?;
        info!(
            "Reported result for task {} ({}, {}ms)",
            result.task_id, result.status, result.duration_ms
        );
        Ok(())
    }

    pub async fn system_status(&self) -> CoordinatorResult<SystemStatus> {
        let response = self.get("/status").await?;
        self.parse_data(response, None)
            .await?
            .ok_or_else(|| CoordinatorError::Serialization("状态响应缺少data字段".to_string()))
    }

    async fn post(&self, path: &str, body: &Value) -> CoordinatorResult<Response> {
        self.http_client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| CoordinatorError::Network(format!("POST {path} 失败: {e}")))
    }

    async fn get(&self, path: &str) -> CoordinatorResult<Response> {
        self.http_client
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| CoordinatorError::Network(format!("GET {path} 失败: {e}")))
    }

    async fn expect_empty(&self, response: Response, task_id: Option<&str>) -> CoordinatorResult<()> {
        self.parse_data::<Value>(response, task_id).await.map(|_| ())
    }

    async fn parse_data<T: DeserializeOwned>(
        &self,
        response: Response,
        task_id: Option<&str>,
    ) -> CoordinatorResult<Option<T>> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CoordinatorError::Network(format!("读取响应失败: {e}")))?;

        if !status.is_success() {
            let error = self.error_from_response(status, &body, task_id);
            warn!("Coordinator request failed: HTTP {} - {}", status, error);
            return Err(error);
        }

        let envelope: ApiResponse<T> = serde_json::from_str(&body)?;
        Ok(envelope.data)
    }

    fn error_from_response(&self, status: StatusCode, body: &str, task_id: Option<&str>) -> CoordinatorError {
        let parsed: Value = serde_json::from_str(body).unwrap_or(Value::Null);
        let error_type = parsed["error"]["type"].as_str().unwrap_or_default();
        let message = parsed["error"]["message"]
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| body.to_string());
        let task_id = task_id.unwrap_or_default();

        match error_type {
            "WORKER_NOT_FOUND" => CoordinatorError::worker_not_found(&self.worker_id),
            "TASK_NOT_FOUND" => CoordinatorError::task_not_found(task_id),
            "RESULT_ALREADY_RECORDED" => CoordinatorError::result_already_recorded(task_id),
            "CAPACITY_EXCEEDED" => CoordinatorError::CapacityExceeded(message),
            _ if status == StatusCode::BAD_REQUEST => CoordinatorError::validation_error(message),
            _ => CoordinatorError::Network(format!("HTTP {status}: {message}")),
        }
    }
}
