use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;
use validator::Validate;

use dtest_core::{DistributedTestResult, ResultStatus, TaskParameters};

use crate::{
    error::{ApiError, ApiResult},
    response::{created, ok_with_message, success},
    routes::AppState,
    validation::{validate_identifier, validate_test_name},
};

/// 任务提交请求
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitTaskRequest {
    #[validate(custom(function = "validate_test_name"))]
    pub test_name: String,
    #[serde(default)]
    pub parameters: TaskParameters,
    #[serde(default)]
    pub priority: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitTaskResponse {
    pub task_id: String,
}

/// 任务完成上报
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CompleteTaskRequest {
    #[validate(custom(function = "validate_identifier"))]
    pub task_id: String,
    pub status: ResultStatus,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub output: String,
}

impl CompleteTaskRequest {
    pub fn into_result(self) -> DistributedTestResult {
        DistributedTestResult::new(
            self.task_id,
            self.status,
            Duration::from_millis(self.duration_ms),
            self.output,
        )
    }
}

/// 提交测试任务
pub async fn submit_task(
    State(state): State<AppState>,
    payload: Result<Json<SubmitTaskRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = payload?;
    request.validate()?;

    let task_id = state
        .coordinator
        .submit_task(request.test_name, request.parameters, request.priority)
        .await;
    Ok(created(SubmitTaskResponse { task_id }))
}

/// 上报任务结果
pub async fn complete_task(
    State(state): State<AppState>,
    payload: Result<Json<CompleteTaskRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = payload?;
    request.validate()?;

    let result = request.into_result();
    let task_id = result.task_id.clone();
    info!("收到任务结果: {} 状态={}", task_id, result.status);

    state.coordinator.complete_task(result).await?;
    Ok(ok_with_message(format!("任务 {} 的结果已记录", task_id)))
}

/// 获取任务详情
pub async fn get_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let task = state
        .coordinator
        .get_task(&task_id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("任务 {task_id}")))?;
    Ok(success(task))
}

/// 获取任务结果，任务未完成时返回404
pub async fn get_task_result(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let result = state
        .coordinator
        .get_task_result(&task_id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("任务 {task_id} 的结果")))?;
    Ok(success(result))
}
