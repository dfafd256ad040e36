use axum::{extract::State, response::IntoResponse};

use crate::{error::ApiResult, response::success, routes::AppState};

/// 获取系统状态快照
pub async fn get_system_status(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let status = state.coordinator.get_system_status().await;
    Ok(success(status))
}
