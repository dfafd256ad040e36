use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use dtest_dispatcher::Coordinator;

use crate::handlers::{
    health::health_check,
    system::get_system_status,
    tasks::{complete_task, get_task, get_task_result, submit_task},
    workers::{get_worker_tasks, heartbeat, list_workers, register_worker},
};

/// API应用状态
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<Coordinator>,
}

/// 创建API路由
pub fn create_routes(state: AppState) -> Router {
    Router::new()
        // 健康检查
        .route("/health", get(health_check))
        // Worker协议
        .route("/register", post(register_worker))
        .route("/heartbeat", post(heartbeat))
        .route("/workers", get(list_workers))
        .route("/workers/{id}/tasks", get(get_worker_tasks))
        // 任务管理
        .route("/task", post(submit_task))
        .route("/task/complete", post(complete_task))
        .route("/task/{id}", get(get_task))
        .route("/task/{id}/result", get(get_task_result))
        // 系统状态
        .route("/status", get(get_system_status))
        .with_state(state)
}
