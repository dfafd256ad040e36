use chrono::{Duration, Utc};
use dtest_core::{DistributedConfig, TaskParameters, TestTask, WorkerInfo, WorkerStatus};

pub fn create_test_task(id: &str) -> TestTask {
    TestTask::new(id, format!("test_{id}"), TaskParameters::new(), 0)
}

pub fn create_test_worker(id: &str, load: u32) -> WorkerInfo {
    let mut worker = WorkerInfo::new(id, format!("127.0.0.1:{}", 9000 + load));
    worker.load = load;
    if load > 0 {
        worker.status = WorkerStatus::Busy;
    }
    worker
}

/// 最后一次心跳在 `minutes_ago` 分钟之前的Worker
pub fn create_stale_worker(id: &str, minutes_ago: i64) -> WorkerInfo {
    let mut worker = WorkerInfo::new(id, "127.0.0.1:9100");
    worker.last_heartbeat = Utc::now() - Duration::minutes(minutes_ago);
    worker
}

pub fn test_config(load_balancing: &str) -> DistributedConfig {
    DistributedConfig {
        coordinator_port: 0,
        heartbeat_interval_seconds: 30,
        worker_timeout_seconds: 120,
        max_workers: 10,
        load_balancing: load_balancing.to_string(),
        ..Default::default()
    }
}
