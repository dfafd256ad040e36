use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::debug;

use dtest_core::{LoadBalancer, LoadBalancingStrategy, TestTask, WorkerInfo};

/// 轮询策略：按Worker ID顺序循环，每次分配都推进游标
pub struct RoundRobinStrategy {
    counter: AtomicUsize,
}

/// 最小负载策略：选择负载最低的Worker，负载相同时取ID最小者
pub struct LeastLoadedStrategy;

/// 根据配置创建负载均衡策略，只在协调器构造时调用一次
pub fn create_load_balancer(strategy: LoadBalancingStrategy) -> Box<dyn LoadBalancer> {
    match strategy {
        LoadBalancingStrategy::RoundRobin => Box::new(RoundRobinStrategy::new()),
        LoadBalancingStrategy::LeastLoaded => Box::new(LeastLoadedStrategy::new()),
    }
}

fn suitable_workers<'a>(available_workers: &[&'a WorkerInfo]) -> Vec<&'a WorkerInfo> {
    let mut suitable: Vec<&WorkerInfo> = available_workers
        .iter()
        .copied()
        .filter(|worker| worker.is_available())
        .collect();
    suitable.sort_by(|a, b| a.id.cmp(&b.id));
    suitable
}

impl RoundRobinStrategy {
    pub fn new() -> Self {
        Self {
            counter: AtomicUsize::new(0),
        }
    }
}

impl Default for RoundRobinStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadBalancer for RoundRobinStrategy {
    fn select_worker(&self, task: &TestTask, available_workers: &[&WorkerInfo]) -> Option<String> {
        let suitable_workers = suitable_workers(available_workers);
        if suitable_workers.is_empty() {
            debug!("没有可用的Worker节点，任务 {} 保持等待", task.id);
            return None;
        }

        let index = self.counter.fetch_add(1, Ordering::Relaxed) % suitable_workers.len();
        let selected_worker = suitable_workers[index];

        debug!(
            "轮询策略选择Worker: {} (索引: {}/{})",
            selected_worker.id,
            index,
            suitable_workers.len()
        );

        Some(selected_worker.id.clone())
    }

    fn name(&self) -> &str {
        LoadBalancingStrategy::RoundRobin.as_str()
    }
}

impl LeastLoadedStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LeastLoadedStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadBalancer for LeastLoadedStrategy {
    fn select_worker(&self, task: &TestTask, available_workers: &[&WorkerInfo]) -> Option<String> {
        let suitable_workers = suitable_workers(available_workers);

        // 已按ID排序，min_by_key 在负载相同时保留第一个，即ID最小者
        let Some(selected_worker) = suitable_workers.iter().min_by_key(|worker| worker.load) else {
            debug!("没有可用的Worker节点，任务 {} 保持等待", task.id);
            return None;
        };

        debug!(
            "最小负载策略选择Worker: {} (负载: {})",
            selected_worker.id, selected_worker.load
        );

        Some(selected_worker.id.clone())
    }

    fn name(&self) -> &str {
        LoadBalancingStrategy::LeastLoaded.as_str()
    }
}
