//! 分布式测试系统门面
//!
//! 组合协调器、存活检测和HTTP控制面，供测试框架在进程内使用：
//!
//! ```no_run
//! use dtest::DistributedTestSystem;
//! use dtest_core::{DistributedConfig, TaskParameters};
//!
//! # async fn run() -> dtest_core::CoordinatorResult<()> {
//! let system = DistributedTestSystem::new(DistributedConfig::default()).await?;
//! let worker = system.create_worker("worker1", "127.0.0.1:8081").await?;
//! let task_id = system.submit_task("login_flow", TaskParameters::new(), 0).await;
//! let assigned = worker.assigned_tasks().await?;
//! system.close().await;
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use dtest_core::{
    DistributedConfig, DistributedTestResult, ResultStatus, SystemStatus, TaskParameters,
    TestTask, WorkerInfo, WorkerStatus,
};
use dtest_dispatcher::{Coordinator, LivenessMonitor, SweepReport};
use dtest_errors::{CoordinatorError, CoordinatorResult};

use crate::shutdown::ShutdownManager;

/// 进程内Worker句柄
#[derive(Clone)]
pub struct WorkerHandle {
    id: String,
    address: String,
    coordinator: Arc<Coordinator>,
}

impl WorkerHandle {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub async fn heartbeat(&self, status: WorkerStatus, load: u32) -> CoordinatorResult<()> {
        self.coordinator.heartbeat(&self.id, status, load).await
    }

    pub async fn assigned_tasks(&self) -> CoordinatorResult<Vec<TestTask>> {
        self.coordinator.tasks_for_worker(&self.id).await
    }

    /// 上报任务结果
    pub async fn complete(
        &self,
        task_id: &str,
        status: ResultStatus,
        duration: Duration,
        output: impl Into<String>,
    ) -> CoordinatorResult<()> {
        let result = DistributedTestResult::new(task_id, status, duration, output);
        self.coordinator.complete_task(result).await
    }

    pub async fn info(&self) -> Option<WorkerInfo> {
        self.coordinator.get_worker(&self.id).await
    }
}

pub struct DistributedTestSystem {
    coordinator: Arc<Coordinator>,
    monitor: LivenessMonitor,
    shutdown: ShutdownManager,
    local_addr: SocketAddr,
    server: Mutex<Option<JoinHandle<()>>>,
    /// 通过 `create_worker` 创建的句柄，与协调器的注册表分开保存
    workers: Mutex<HashMap<String, WorkerHandle>>,
}

impl DistributedTestSystem {
    /// 校验配置、创建协调器、启动存活检测并监听HTTP端口
    pub async fn new(config: DistributedConfig) -> CoordinatorResult<Self> {
        let bind_address = config.coordinator_bind_address();
        let check_interval = config.heartbeat_interval();

        let coordinator = Arc::new(Coordinator::new(config)?);

        let listener = TcpListener::bind(&bind_address)
            .await
            .map_err(|e| CoordinatorError::Network(format!("监听 {bind_address} 失败: {e}")))?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| CoordinatorError::Network(format!("获取监听地址失败: {e}")))?;

        let shutdown = ShutdownManager::new();
        let mut shutdown_rx = shutdown.subscribe().await;
        let app = dtest_api::create_app(Arc::clone(&coordinator));
        let server = tokio::spawn(async move {
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.recv().await;
                })
                .await;
            if let Err(e) = result {
                error!("HTTP服务异常退出: {}", e);
            }
        });
        info!("协调器HTTP服务已启动: http://{}", local_addr);

        let monitor = LivenessMonitor::new(Arc::clone(&coordinator), check_interval);
        monitor.start().await;

        Ok(Self {
            coordinator,
            monitor,
            shutdown,
            local_addr,
            server: Mutex::new(Some(server)),
            workers: Mutex::new(HashMap::new()),
        })
    }

    pub fn coordinator(&self) -> Arc<Coordinator> {
        Arc::clone(&self.coordinator)
    }

    /// HTTP服务实际监听的地址，端口配置为0时由系统分配
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// 在进程内注册一个空闲Worker
    pub async fn create_worker(
        &self,
        id: impl Into<String>,
        address: impl Into<String>,
    ) -> CoordinatorResult<WorkerHandle> {
        let worker = WorkerInfo::new(id, address);
        let handle = WorkerHandle {
            id: worker.id.clone(),
            address: worker.address.clone(),
            coordinator: Arc::clone(&self.coordinator),
        };

        self.coordinator.register_worker(worker).await?;
        self.workers
            .lock()
            .await
            .insert(handle.id.clone(), handle.clone());

        Ok(handle)
    }

    pub async fn worker(&self, id: &str) -> Option<WorkerHandle> {
        self.workers.lock().await.get(id).cloned()
    }

    pub async fn submit_task(
        &self,
        test_name: impl Into<String>,
        parameters: TaskParameters,
        priority: i32,
    ) -> String {
        self.coordinator
            .submit_task(test_name, parameters, priority)
            .await
    }

    pub async fn get_task_result(&self, task_id: &str) -> Option<DistributedTestResult> {
        self.coordinator.get_task_result(task_id).await
    }

    pub async fn get_system_status(&self) -> SystemStatus {
        self.coordinator.get_system_status().await
    }

    /// 立即执行一次存活检测
    pub async fn sweep(&self) -> SweepReport {
        self.monitor.sweep_now().await
    }

    /// 停止存活检测和HTTP服务，可以重复调用
    pub async fn close(&self) {
        let Some(server) = self.server.lock().await.take() else {
            return;
        };

        info!("关闭分布式测试系统");
        self.monitor.stop().await;
        self.shutdown.shutdown().await;

        if let Err(e) = server.await {
            warn!("等待HTTP服务退出失败: {}", e);
        }
        info!("分布式测试系统已关闭");
    }
}

impl Drop for DistributedTestSystem {
    /// 未调用 `close` 就被丢弃时终止HTTP服务，存活检测由 `LivenessMonitor` 自行终止
    fn drop(&mut self) {
        if let Some(server) = self.server.get_mut().take() {
            warn!("分布式测试系统未关闭即被丢弃，终止HTTP服务");
            server.abort();
        }
    }
}
