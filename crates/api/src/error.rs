use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use dtest_errors::CoordinatorError;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("协调器错误: {0}")]
    Coordinator(#[from] CoordinatorError),

    #[error("验证错误: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("未找到资源: {0}")]
    NotFound(String),

    #[error("请求参数错误: {0}")]
    BadRequest(String),

    #[error("内部服务器错误: {0}")]
    Internal(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message, error_type, suggestions) = match &self {
            ApiError::Coordinator(CoordinatorError::TaskNotFound { id }) => (
                StatusCode::NOT_FOUND,
                format!("任务 {} 不存在", id),
                "TASK_NOT_FOUND",
                vec![
                    "请检查任务ID是否正确".to_string(),
                    "任务ID由 POST /task 返回".to_string(),
                ],
            ),
            ApiError::Coordinator(CoordinatorError::WorkerNotFound { id }) => (
                StatusCode::NOT_FOUND,
                format!("Worker {} 不存在", id),
                "WORKER_NOT_FOUND",
                vec![
                    "请先通过 POST /register 注册Worker".to_string(),
                    "使用 GET /workers 查看已注册的Worker".to_string(),
                ],
            ),
            ApiError::Coordinator(CoordinatorError::ResultAlreadyRecorded { task_id }) => (
                StatusCode::CONFLICT,
                format!("任务 {} 的结果已经记录", task_id),
                "RESULT_ALREADY_RECORDED",
                vec!["每个任务只能上报一次结果".to_string()],
            ),
            ApiError::Coordinator(CoordinatorError::CapacityExceeded(msg)) => (
                StatusCode::SERVICE_UNAVAILABLE,
                format!("容量不足: {}", msg),
                "CAPACITY_EXCEEDED",
                vec![
                    "等待其他Worker下线后重试".to_string(),
                    "或调大 max_workers 配置".to_string(),
                ],
            ),
            ApiError::Coordinator(CoordinatorError::Validation(msg)) => (
                StatusCode::BAD_REQUEST,
                format!("数据验证失败: {}", msg),
                "VALIDATION_ERROR",
                vec!["请检查请求参数是否符合要求".to_string()],
            ),
            ApiError::Coordinator(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "系统内部错误".to_string(),
                "INTERNAL_ERROR",
                vec![
                    "系统遇到内部错误，请稍后重试".to_string(),
                    err.user_message().to_string(),
                ],
            ),
            ApiError::Validation(errors) => {
                let mut error_details: Vec<String> = errors
                    .field_errors()
                    .iter()
                    .map(|(field, errors)| {
                        let messages: Vec<String> = errors
                            .iter()
                            .map(|e| match &e.message {
                                Some(message) => message.to_string(),
                                None => e.code.to_string(),
                            })
                            .collect();
                        format!("{}: {}", field, messages.join(", "))
                    })
                    .collect();
                error_details.sort();

                (
                    StatusCode::BAD_REQUEST,
                    format!("请求参数验证失败: {}", error_details.join("; ")),
                    "VALIDATION_ERROR",
                    vec!["请检查请求参数是否符合要求".to_string()],
                )
            }
            ApiError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                format!("请求的资源不存在: {}", what),
                "NOT_FOUND",
                vec!["请检查请求URL是否正确".to_string()],
            ),
            ApiError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                format!("请求参数错误: {}", msg),
                "BAD_REQUEST",
                vec![
                    "请检查JSON格式是否正确".to_string(),
                    "确保所有必需字段都已提供".to_string(),
                    "确保Content-Type设置为application/json".to_string(),
                ],
            ),
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "系统内部错误".to_string(),
                "INTERNAL_ERROR",
                vec![format!("错误详情: {}", msg)],
            ),
        };

        let body = Json(json!({
            "error": {
                "message": error_message,
                "type": error_type,
                "code": status.as_u16(),
                "suggestions": suggestions,
                "timestamp": chrono::Utc::now().to_rfc3339(),
            }
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
