use std::time::Instant;

use axum::{extract::Request, http::Method, middleware::Next, response::Response};
use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{debug, info, warn};

/// 心跳和状态轮询频率很高，只在debug级别记录
fn is_polling_path(path: &str) -> bool {
    path == "/heartbeat" || path == "/health" || path.ends_with("/tasks")
}

pub async fn request_logging(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let quiet = is_polling_path(uri.path());
    let start = Instant::now();

    if !quiet {
        info!("开始处理请求: {} {}", method, uri);
    }

    let response = next.run(request).await;
    let status = response.status();
    let duration = start.elapsed();

    if status.is_client_error() || status.is_server_error() {
        warn!(
            "请求处理失败: {} {} - 状态: {} - 耗时: {:?}",
            method, uri, status, duration
        );
    } else if quiet {
        debug!("{} {} - 状态: {} - 耗时: {:?}", method, uri, status, duration);
    } else {
        info!(
            "完成请求处理: {} {} - 状态: {} - 耗时: {:?}",
            method, uri, status, duration
        );
    }

    response
}

pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
}

pub fn trace_layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polling_paths() {
        assert!(is_polling_path("/heartbeat"));
        assert!(is_polling_path("/health"));
        assert!(is_polling_path("/workers/w1/tasks"));
        assert!(!is_polling_path("/register"));
        assert!(!is_polling_path("/task/complete"));
    }
}
