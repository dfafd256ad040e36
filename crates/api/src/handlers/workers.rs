use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use validator::Validate;

use dtest_core::{WorkerInfo, WorkerStatus};

use crate::{
    error::ApiResult,
    response::{ok_with_message, success},
    routes::AppState,
    validation::{validate_worker_address, validate_worker_id},
};

/// Worker注册请求
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterWorkerRequest {
    #[validate(custom(function = "validate_worker_id"))]
    pub id: String,
    #[validate(custom(function = "validate_worker_address"))]
    pub address: String,
    #[serde(default)]
    pub status: Option<WorkerStatus>,
    #[serde(default)]
    pub load: Option<u32>,
}

impl RegisterWorkerRequest {
    pub fn into_worker_info(self) -> WorkerInfo {
        let mut worker = WorkerInfo::new(self.id, self.address);
        if let Some(status) = self.status {
            worker.status = status;
        }
        if let Some(load) = self.load {
            worker.load = load;
        }
        worker
    }
}

/// Worker心跳请求
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct HeartbeatRequest {
    #[validate(custom(function = "validate_worker_id"))]
    pub worker_id: String,
    pub status: WorkerStatus,
    pub load: u32,
}

/// 注册Worker
pub async fn register_worker(
    State(state): State<AppState>,
    payload: Result<Json<RegisterWorkerRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = payload?;
    request.validate()?;

    let worker = request.into_worker_info();
    let worker_id = worker.id.clone();
    info!("收到Worker注册请求: {} ({})", worker_id, worker.address);

    state.coordinator.register_worker(worker).await?;
    Ok(ok_with_message(format!("Worker {} 注册成功", worker_id)))
}

/// 处理Worker心跳
pub async fn heartbeat(
    State(state): State<AppState>,
    payload: Result<Json<HeartbeatRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = payload?;
    request.validate()?;

    debug!(
        "收到Worker心跳: {} 状态={} 负载={}",
        request.worker_id, request.status, request.load
    );
    state
        .coordinator
        .heartbeat(&request.worker_id, request.status, request.load)
        .await?;
    Ok(ok_with_message("心跳已接收"))
}

/// 获取Worker列表，按ID排序
pub async fn list_workers(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let workers = state.coordinator.list_workers().await;
    Ok(success(workers))
}

/// 获取分配给Worker的运行中任务
pub async fn get_worker_tasks(
    State(state): State<AppState>,
    Path(worker_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let tasks = state.coordinator.tasks_for_worker(&worker_id).await?;
    Ok(success(tasks))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_defaults_to_idle() {
        let request: RegisterWorkerRequest =
            serde_json::from_str(r#"{"id":"w1","address":"127.0.0.1:8081"}"#).unwrap();
        assert!(request.validate().is_ok());

        let worker = request.into_worker_info();
        assert_eq!(worker.status, WorkerStatus::Idle);
        assert_eq!(worker.load, 0);
    }

    #[test]
    fn test_register_request_validation() {
        let request = RegisterWorkerRequest {
            id: "bad id".to_string(),
            address: "nowhere".to_string(),
            status: None,
            load: None,
        };
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("id"));
        assert!(fields.contains_key("address"));
    }

    #[test]
    fn test_heartbeat_request_rejects_unknown_status() {
        let result = serde_json::from_str::<HeartbeatRequest>(
            r#"{"worker_id":"w1","status":"sleeping","load":0}"#,
        );
        assert!(result.is_err());
    }
}
