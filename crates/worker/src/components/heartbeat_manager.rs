use std::sync::Arc;
use std::time::Duration;

use dtest_core::WorkerStatus;
use dtest_errors::CoordinatorError;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{error, info, warn};

use super::CoordinatorClient;

/// 返回Worker当前负载（正在执行的任务数）
pub type LoadProvider = Arc<dyn Fn() -> u32 + Send + Sync>;

pub struct HeartbeatManager {
    coordinator_client: Arc<CoordinatorClient>,
    heartbeat_interval: Duration,
}

impl HeartbeatManager {
    pub fn new(coordinator_client: Arc<CoordinatorClient>, heartbeat_interval: Duration) -> Self {
        Self {
            coordinator_client,
            heartbeat_interval,
        }
    }

    /// 负载为0时报告空闲，否则报告忙碌
    pub fn status_for_load(load: u32) -> WorkerStatus {
        if load == 0 {
            WorkerStatus::Idle
        } else {
            WorkerStatus::Busy
        }
    }

    /// 启动心跳任务，直到 `shutdown_rx` 收到信号
    pub fn start_heartbeat_task(
        &self,
        mut shutdown_rx: broadcast::Receiver<()>,
        get_load: LoadProvider,
    ) -> JoinHandle<()> {
        let mut heartbeat_interval = interval(self.heartbeat_interval);
        let coordinator_client = Arc::clone(&self.coordinator_client);

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = heartbeat_interval.tick() => {
                        let load = get_load();
                        Self::beat(&coordinator_client, load).await;
                    }
                    _ = shutdown_rx.recv() => {
                        info!("Heartbeat task shutting down");
                        break;
                    }
                }
            }
        })
    }

    async fn beat(client: &CoordinatorClient, load: u32) {
        let status = Self::status_for_load(load);
        match client.send_heartbeat(status, load).await {
            Ok(()) => {}
            Err(CoordinatorError::WorkerNotFound { .. }) => {
                // 协调器重启后注册信息丢失，重新注册
                warn!(
                    "Coordinator does not know worker {}, registering again",
                    client.worker_id()
                );
                if let Err(e) = client.register().await {
                    error!("Failed to re-register worker: {}", e);
                    return;
                }
                if let Err(e) = client.send_heartbeat(status, load).await {
                    error!("Failed to send heartbeat after re-registration: {}", e);
                }
            }
            Err(e) => {
                error!("Failed to send coordinator heartbeat: {}", e);
            }
        }
    }
}
