//! 分布式测试任务调度核心
//!
//! - [`coordinator`]: Worker注册表、任务分配和结果记录
//! - [`strategies`]: 轮询和最小负载两种负载均衡策略
//! - [`liveness_monitor`]: 周期性检测心跳超时的Worker并回收任务

pub mod coordinator;
pub mod liveness_monitor;
pub mod strategies;


#[cfg(test)]
pub mod test_utils;

pub use coordinator::{Coordinator, SweepReport};
pub use liveness_monitor::LivenessMonitor;
pub use strategies::*;
