//! # dtest API
//!
//! 协调器的HTTP控制面，Worker通过它注册、发送心跳、拉取任务和上报结果。
//!
//! ## 架构设计
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                        dtest API                         │
//! ├──────────────────────────────────────────────────────────┤
//! │  Routes  │  Handlers  │ Validation │ Response │  Error   │
//! │ (路由定义) │  (处理器)   │  (参数校验)  │ (响应格式) │ (错误处理) │
//! └──────────────────────────────────────────────────────────┘
//!                            ↓
//!                  ┌───────────────────┐
//!                  │    Coordinator    │
//!                  │  (dtest-dispatcher)│
//!                  └───────────────────┘
//! ```
//!
//! ## API 端点
//!
//! ### Worker协议
//! - `POST /register` - 注册Worker，`{id, address, status?, load?}`
//! - `POST /heartbeat` - 心跳，`{worker_id, status, load}`
//! - `GET /workers` - Worker列表
//! - `GET /workers/{id}/tasks` - 分配给Worker的运行中任务
//!
//! ### 任务
//! - `POST /task` - 提交测试任务，返回 `{task_id}`
//! - `POST /task/complete` - 上报结果，`{task_id, status, duration_ms, output}`
//! - `GET /task/{id}` - 任务详情
//! - `GET /task/{id}/result` - 任务结果
//!
//! ### 系统
//! - `GET /status` - 系统状态快照
//! - `GET /health` - 健康检查
//!
//! ## 响应格式
//!
//! 成功响应：
//!
//! ```json
//! {
//!   "success": true,
//!   "data": { ... },
//!   "message": null,
//!   "timestamp": "2024-01-01T00:00:00Z"
//! }
//! ```
//!
//! 错误响应：
//!
//! ```json
//! {
//!   "error": {
//!     "message": "Worker w1 不存在",
//!     "type": "WORKER_NOT_FOUND",
//!     "code": 404,
//!     "suggestions": ["请先通过 POST /register 注册Worker"],
//!     "timestamp": "2024-01-01T00:00:00Z"
//!   }
//! }
//! ```
//!
//! 请求体先解析、校验，校验失败返回400，协调器状态不会被修改。

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod validation;

use axum::Router;
use std::sync::Arc;
use tower::ServiceBuilder;

use dtest_dispatcher::Coordinator;
use middleware::{cors_layer, request_logging, trace_layer};
use routes::{create_routes, AppState};

pub use error::{ApiError, ApiResult};
pub use response::ApiResponse;

/// 创建完整的API应用
pub fn create_app(coordinator: Arc<Coordinator>) -> Router {
    let state = AppState { coordinator };

    create_routes(state).layer(
        ServiceBuilder::new()
            .layer(trace_layer())
            .layer(cors_layer())
            .layer(axum::middleware::from_fn(request_logging)),
    )
}
