use crate::models::{TestTask, WorkerInfo};

/// 负载均衡策略接口
///
/// 在协调器的临界区内被调用，实现必须是不阻塞的纯选择逻辑。
/// `eligible_workers` 已经排除了离线Worker，并按Worker ID升序排列。
pub trait LoadBalancer: Send + Sync {
    /// 选择Worker执行任务，没有可用Worker时返回 `None`
    fn select_worker(&self, task: &TestTask, eligible_workers: &[&WorkerInfo]) -> Option<String>;

    /// 获取策略名称
    fn name(&self) -> &str;
}
