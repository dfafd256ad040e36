use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::coordinator::{Coordinator, SweepReport};

/// Worker存活检测
///
/// 按固定周期调用 [`Coordinator::sweep_expired_workers`]，把心跳超时的Worker标记为离线
/// 并回收其任务。周期通常取心跳间隔，检测延迟不超过一个周期。
pub struct LivenessMonitor {
    coordinator: Arc<Coordinator>,
    check_interval: Duration,
    shutdown_tx: broadcast::Sender<()>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl LivenessMonitor {
    pub fn new(coordinator: Arc<Coordinator>, check_interval: Duration) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            coordinator,
            check_interval,
            shutdown_tx,
            handle: Mutex::new(None),
        }
    }

    pub fn check_interval(&self) -> Duration {
        self.check_interval
    }

    /// 启动后台检测循环，重复调用不会启动第二个循环
    pub async fn start(&self) {
        let mut handle = self.handle.lock().await;
        if handle.as_ref().is_some_and(|h| !h.is_finished()) {
            warn!("存活检测已在运行");
            return;
        }

        let coordinator = Arc::clone(&self.coordinator);
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let mut ticker = interval(self.check_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // 第一次tick立即返回，跳过它，启动后一个周期再检测
        ticker.reset();

        info!("启动Worker存活检测，周期: {:?}", self.check_interval);

        *handle = Some(tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let report = coordinator.sweep_expired_workers(Utc::now()).await;
                        log_report(&report);
                    }
                    _ = shutdown_rx.recv() => {
                        info!("收到停止信号，退出Worker存活检测循环");
                        break;
                    }
                }
            }
        }));
    }

    /// 立即执行一次检测
    pub async fn sweep_now(&self) -> SweepReport {
        let report = self.coordinator.sweep_expired_workers(Utc::now()).await;
        log_report(&report);
        report
    }

    pub async fn is_running(&self) -> bool {
        self.handle
            .lock()
            .await
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    /// 停止检测循环并等待其退出
    pub async fn stop(&self) {
        let Some(handle) = self.handle.lock().await.take() else {
            return;
        };

        let _ = self.shutdown_tx.send(());
        if let Err(e) = handle.await {
            warn!("存活检测任务异常退出: {}", e);
        }
        info!("Worker存活检测已停止");
    }
}

impl Drop for LivenessMonitor {
    /// 未调用 `stop` 就被丢弃时终止检测循环，释放协调器引用
    fn drop(&mut self) {
        if let Some(handle) = self.handle.get_mut().take() {
            let _ = self.shutdown_tx.send(());
            handle.abort();
        }
    }
}

fn log_report(report: &SweepReport) {
    if report.is_empty() {
        debug!("存活检测完成，没有失效的Worker");
        return;
    }
    info!(
        "存活检测: {} 个Worker离线, 回收 {} 个任务",
        report.offline_workers.len(),
        report.reclaimed_tasks.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_config;

    fn monitor(period: Duration) -> LivenessMonitor {
        let coordinator = Arc::new(Coordinator::new(test_config("round_robin")).unwrap());
        LivenessMonitor::new(coordinator, period)
    }

    #[tokio::test]
    async fn test_start_and_stop() {
        let monitor = monitor(Duration::from_millis(20));
        assert!(!monitor.is_running().await);

        monitor.start().await;
        assert!(monitor.is_running().await);

        // 重复启动是无害的
        monitor.start().await;
        assert!(monitor.is_running().await);

        monitor.stop().await;
        assert!(!monitor.is_running().await);

        // 未运行时停止直接返回
        monitor.stop().await;
    }

    #[tokio::test]
    async fn test_drop_without_stop_ends_loop() {
        let coordinator = Arc::new(Coordinator::new(test_config("round_robin")).unwrap());
        let monitor = LivenessMonitor::new(Arc::clone(&coordinator), Duration::from_millis(20));
        monitor.start().await;
        assert_eq!(Arc::strong_count(&coordinator), 3);

        drop(monitor);

        tokio::time::timeout(Duration::from_secs(2), async {
            while Arc::strong_count(&coordinator) > 1 {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("detection loop should release the coordinator");
    }

    #[tokio::test]
    async fn test_sweep_now_without_workers() {
        let monitor = monitor(Duration::from_secs(30));
        assert!(monitor.sweep_now().await.is_empty());
    }
}
