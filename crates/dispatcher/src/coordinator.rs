//! 协调器
//!
//! Worker注册表、任务列表和结果表由同一把互斥锁保护，作为一个一致性域整体变更。
//! 外部只能通过方法访问，查询接口返回克隆的快照。
//!
//! 任务分配（选择Worker、标记任务运行、增加负载）在提交任务、Worker注册和心跳时，
//! 于同一个临界区内完成，因此同一个任务不会被分配两次。

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use metrics::{counter, gauge};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use dtest_core::{
    DistributedConfig, DistributedTestResult, LoadBalancer, SystemStatus, TaskParameters,
    TaskStats, TaskStatus, TestTask, WorkerInfo, WorkerStats, WorkerStatus,
};
use dtest_errors::{CoordinatorError, CoordinatorResult};

use crate::strategies::create_load_balancer;

/// 一次存活检测的结果
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct SweepReport {
    pub offline_workers: Vec<String>,
    pub reclaimed_tasks: Vec<String>,
}

impl SweepReport {
    pub fn is_empty(&self) -> bool {
        self.offline_workers.is_empty()
    }
}

#[derive(Default)]
struct CoordinatorState {
    /// BTreeMap 保证按Worker ID稳定有序遍历
    workers: BTreeMap<String, WorkerInfo>,
    /// 按提交顺序保存，任务不会被删除
    tasks: Vec<TestTask>,
    task_index: HashMap<String, usize>,
    /// 等待分配的任务下标，按提交顺序出队
    pending: BTreeSet<usize>,
    results: HashMap<String, DistributedTestResult>,
}

impl CoordinatorState {
    fn active_worker_count(&self) -> usize {
        self.workers.values().filter(|w| w.is_available()).count()
    }

    /// 按提交顺序为等待中的任务分配Worker，没有可用Worker时停止
    fn assign_pending(&mut self, balancer: &dyn LoadBalancer) -> usize {
        let mut assigned = 0;

        while let Some(&index) = self.pending.first() {
            let selected = {
                let eligible: Vec<&WorkerInfo> =
                    self.workers.values().filter(|w| w.is_available()).collect();
                if eligible.is_empty() {
                    debug!("没有可用的Worker，{} 个任务保持等待", self.pending.len());
                    break;
                }
                balancer.select_worker(&self.tasks[index], &eligible)
            };

            let Some(worker_id) = selected else {
                break;
            };

            let Some(worker) = self.workers.get_mut(&worker_id) else {
                warn!("负载均衡策略返回了未注册的Worker: {}", worker_id);
                break;
            };

            worker.load += 1;
            worker.status = WorkerStatus::Busy;

            let task = &mut self.tasks[index];
            task.assign(&worker_id);
            self.pending.remove(&index);
            assigned += 1;

            info!(
                task_id = %task.id,
                test_name = %task.test_name,
                worker_id = %worker_id,
                "任务已分配"
            );
        }

        if assigned > 0 {
            counter!("dtest_tasks_assigned_total").increment(assigned as u64);
        }
        assigned
    }

    /// 将Worker标记为离线并释放其运行中的任务，返回被回收的任务ID
    fn mark_offline(&mut self, worker_id: &str) -> Vec<String> {
        if let Some(worker) = self.workers.get_mut(worker_id) {
            worker.status = WorkerStatus::Offline;
            worker.load = 0;
        }

        let mut reclaimed = Vec::new();
        for (index, task) in self.tasks.iter_mut().enumerate() {
            if task.is_assigned_to(worker_id) {
                task.release();
                self.pending.insert(index);
                reclaimed.push(task.id.clone());
            }
        }

        if !reclaimed.is_empty() {
            counter!("dtest_tasks_reclaimed_total").increment(reclaimed.len() as u64);
        }
        reclaimed
    }

    fn worker_stats(&self) -> WorkerStats {
        let mut stats = WorkerStats {
            total: self.workers.len(),
            ..Default::default()
        };
        for worker in self.workers.values() {
            match worker.status {
                WorkerStatus::Idle => stats.idle += 1,
                WorkerStatus::Busy => stats.busy += 1,
                WorkerStatus::Offline => stats.offline += 1,
            }
        }
        stats
    }

    fn task_stats(&self) -> TaskStats {
        let mut stats = TaskStats {
            total: self.tasks.len(),
            ..Default::default()
        };
        for task in &self.tasks {
            match task.status {
                TaskStatus::Pending => stats.pending += 1,
                TaskStatus::Running => stats.running += 1,
                TaskStatus::Completed => stats.completed += 1,
            }
        }
        stats
    }

    fn update_worker_gauges(&self) {
        gauge!("dtest_workers_registered").set(self.workers.len() as f64);
        gauge!("dtest_workers_active").set(self.active_worker_count() as f64);
    }
}

/// 测试任务协调器
pub struct Coordinator {
    config: DistributedConfig,
    balancer: Box<dyn LoadBalancer>,
    state: Mutex<CoordinatorState>,
}

impl Coordinator {
    /// 根据配置创建协调器，配置非法时立即返回错误
    pub fn new(config: DistributedConfig) -> CoordinatorResult<Self> {
        config.validate()?;
        let balancer = create_load_balancer(config.load_balancing_strategy()?);
        Ok(Self::with_load_balancer(config, balancer))
    }

    pub fn with_load_balancer(config: DistributedConfig, balancer: Box<dyn LoadBalancer>) -> Self {
        info!(
            "创建协调器: 负载均衡策略={}, Worker超时={}秒, 最大Worker数={}",
            balancer.name(),
            config.worker_timeout_seconds,
            config.max_workers
        );
        Self {
            config,
            balancer,
            state: Mutex::new(CoordinatorState::default()),
        }
    }

    pub fn config(&self) -> &DistributedConfig {
        &self.config
    }

    pub fn strategy_name(&self) -> &str {
        self.balancer.name()
    }

    fn ensure_capacity(&self, state: &CoordinatorState) -> CoordinatorResult<()> {
        if state.active_worker_count() >= self.config.max_workers {
            return Err(CoordinatorError::CapacityExceeded(format!(
                "已注册 {} 个在线Worker，达到上限",
                self.config.max_workers
            )));
        }
        Ok(())
    }

    /// 注册Worker，相同ID覆盖旧记录
    pub async fn register_worker(&self, info: WorkerInfo) -> CoordinatorResult<()> {
        let mut state = self.state.lock().await;

        let previous_status = state.workers.get(&info.id).map(|w| w.status);
        // 新Worker和离线后重新上线的Worker都会占用一个在线名额
        let takes_slot = matches!(previous_status, None | Some(WorkerStatus::Offline));
        if takes_slot && info.is_available() {
            self.ensure_capacity(&state)?;
        }

        let worker_id = info.id.clone();
        let available = info.is_available();

        // 以离线状态重新注册时，旧记录上的任务必须释放
        let reclaimed = if !available && previous_status.is_some() {
            state.mark_offline(&worker_id)
        } else {
            Vec::new()
        };

        let mut info = info;
        if !available {
            info.load = 0;
        }
        match previous_status {
            Some(status) => {
                info!(
                    "Worker重新注册: {} ({}), 原状态: {}, 新状态: {}",
                    worker_id, info.address, status, info.status
                );
                // 在线重新注册保留已分配的任务，负载不低于运行中的任务数
                if available {
                    let running = state
                        .tasks
                        .iter()
                        .filter(|task| task.is_assigned_to(&worker_id))
                        .count() as u32;
                    info.load = info.load.max(running);
                }
            }
            None => info!("Worker注册成功: {} ({})", worker_id, info.address),
        }
        state.workers.insert(worker_id, info);

        if available || !reclaimed.is_empty() {
            state.assign_pending(self.balancer.as_ref());
        }
        state.update_worker_gauges();

        Ok(())
    }

    /// 处理Worker心跳
    pub async fn heartbeat(
        &self,
        worker_id: &str,
        status: WorkerStatus,
        load: u32,
    ) -> CoordinatorResult<()> {
        let now = Utc::now();
        let mut state = self.state.lock().await;

        let was_offline = state
            .workers
            .get(worker_id)
            .ok_or_else(|| CoordinatorError::worker_not_found(worker_id))?
            .is_offline();

        if was_offline && status != WorkerStatus::Offline {
            self.ensure_capacity(&state)?;
        }

        // 离线Worker不持有任务，负载固定为0
        let load = if status == WorkerStatus::Offline { 0 } else { load };
        if let Some(worker) = state.workers.get_mut(worker_id) {
            worker.update_heartbeat(status, load, now);
        }
        debug!("收到Worker心跳: {} 状态={} 负载={}", worker_id, status, load);

        if status == WorkerStatus::Offline {
            if !was_offline {
                let reclaimed = state.mark_offline(worker_id);
                info!(
                    "Worker {} 主动下线，回收 {} 个任务",
                    worker_id,
                    reclaimed.len()
                );
                counter!("dtest_workers_offline_total").increment(1);
            }
        } else if was_offline {
            info!("Worker {} 恢复在线，状态: {}", worker_id, status);
        }

        state.assign_pending(self.balancer.as_ref());
        state.update_worker_gauges();

        Ok(())
    }

    /// 提交测试任务，立即返回任务ID，没有可用Worker时任务保持等待
    pub async fn submit_task(
        &self,
        test_name: impl Into<String>,
        parameters: TaskParameters,
        priority: i32,
    ) -> String {
        let task_id = Uuid::new_v4().to_string();
        let task = TestTask::new(task_id.clone(), test_name, parameters, priority);

        let mut state = self.state.lock().await;
        info!(task_id = %task_id, test_name = %task.test_name, priority, "提交测试任务");

        let index = state.tasks.len();
        state.tasks.push(task);
        state.task_index.insert(task_id.clone(), index);
        state.pending.insert(index);
        counter!("dtest_tasks_submitted_total").increment(1);

        state.assign_pending(self.balancer.as_ref());

        task_id
    }

    /// 记录任务结果，每个任务只能记录一次
    pub async fn complete_task(&self, result: DistributedTestResult) -> CoordinatorResult<()> {
        let mut state = self.state.lock().await;

        let index = *state
            .task_index
            .get(&result.task_id)
            .ok_or_else(|| CoordinatorError::task_not_found(&result.task_id))?;

        if state.results.contains_key(&result.task_id) {
            return Err(CoordinatorError::result_already_recorded(&result.task_id));
        }

        let previous_worker = state.tasks[index].complete();
        state.pending.remove(&index);

        if let Some(worker_id) = &previous_worker {
            if let Some(worker) = state.workers.get_mut(worker_id) {
                worker.load = worker.load.saturating_sub(1);
                if worker.load == 0 && worker.status == WorkerStatus::Busy {
                    worker.status = WorkerStatus::Idle;
                }
            }
        }

        info!(
            task_id = %result.task_id,
            status = %result.status,
            duration_ms = result.duration_ms,
            worker_id = previous_worker.as_deref().unwrap_or("-"),
            "任务完成"
        );
        counter!("dtest_tasks_completed_total", "status" => result.status.to_string())
            .increment(1);

        state.results.insert(result.task_id.clone(), result);
        Ok(())
    }

    pub async fn get_task_result(&self, task_id: &str) -> Option<DistributedTestResult> {
        let state = self.state.lock().await;
        state.results.get(task_id).cloned()
    }

    pub async fn get_task(&self, task_id: &str) -> Option<TestTask> {
        let state = self.state.lock().await;
        state
            .task_index
            .get(task_id)
            .map(|&index| state.tasks[index].clone())
    }

    /// 按提交顺序返回所有任务
    pub async fn list_tasks(&self) -> Vec<TestTask> {
        let state = self.state.lock().await;
        state.tasks.clone()
    }

    pub async fn get_worker(&self, worker_id: &str) -> Option<WorkerInfo> {
        let state = self.state.lock().await;
        state.workers.get(worker_id).cloned()
    }

    /// 按Worker ID升序返回所有Worker
    pub async fn list_workers(&self) -> Vec<WorkerInfo> {
        let state = self.state.lock().await;
        state.workers.values().cloned().collect()
    }

    /// 当前分配给Worker且仍在运行的任务，Worker通过它拉取工作
    pub async fn tasks_for_worker(&self, worker_id: &str) -> CoordinatorResult<Vec<TestTask>> {
        let state = self.state.lock().await;
        if !state.workers.contains_key(worker_id) {
            return Err(CoordinatorError::worker_not_found(worker_id));
        }
        Ok(state
            .tasks
            .iter()
            .filter(|task| task.is_assigned_to(worker_id))
            .cloned()
            .collect())
    }

    pub async fn get_system_status(&self) -> SystemStatus {
        let state = self.state.lock().await;
        SystemStatus {
            workers: state.worker_stats(),
            tasks: state.task_stats(),
            load_balancing: self.balancer.name().to_string(),
            timestamp: Utc::now(),
        }
    }

    /// 将心跳超时的Worker标记为离线并回收其任务
    ///
    /// 回收的任务保持等待，由下一次提交、注册或心跳重新分配。
    /// 幂等：已经离线的Worker不会被重复处理。
    pub async fn sweep_expired_workers(&self, now: DateTime<Utc>) -> SweepReport {
        let timeout = self.config.worker_timeout();
        let mut state = self.state.lock().await;

        let expired: Vec<String> = state
            .workers
            .values()
            .filter(|worker| worker.is_heartbeat_expired(now, timeout))
            .map(|worker| worker.id.clone())
            .collect();

        let mut report = SweepReport::default();
        if expired.is_empty() {
            return report;
        }

        for worker_id in expired {
            if let Some(worker) = state.workers.get(&worker_id) {
                warn!(
                    "检测到失效Worker: {} (上次心跳: {})",
                    worker_id,
                    worker.last_heartbeat.format("%Y-%m-%d %H:%M:%S UTC")
                );
            }
            let reclaimed = state.mark_offline(&worker_id);
            if !reclaimed.is_empty() {
                info!("回收失效Worker {} 上的 {} 个任务", worker_id, reclaimed.len());
            }
            counter!("dtest_workers_offline_total").increment(1);
            report.reclaimed_tasks.extend(reclaimed);
            report.offline_workers.push(worker_id);
        }

        state.update_worker_gauges();

        report
    }
}
