use std::fmt;
use std::str::FromStr;

use dtest_errors::{CoordinatorError, CoordinatorResult};
use serde::{Deserialize, Serialize};

/// 协调器配置，构造完成后不再修改
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DistributedConfig {
    pub bind_address: String,
    /// 0 表示由系统分配端口
    pub coordinator_port: u16,
    pub worker_port: u16,
    /// 心跳间隔，同时也是存活检测的扫描周期
    pub heartbeat_interval_seconds: u64,
    pub worker_timeout_seconds: u64,
    pub max_workers: usize,
    pub load_balancing: String, // "round_robin", "least_loaded"
}

impl Default for DistributedConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            coordinator_port: 8080,
            worker_port: 8081,
            heartbeat_interval_seconds: 30,
            worker_timeout_seconds: 120,
            max_workers: 100,
            load_balancing: LoadBalancingStrategy::RoundRobin.to_string(),
        }
    }
}

impl DistributedConfig {
    pub fn validate(&self) -> CoordinatorResult<()> {
        if self.bind_address.trim().is_empty() {
            return Err(CoordinatorError::config_error("监听地址不能为空"));
        }

        if self.heartbeat_interval_seconds == 0 {
            return Err(CoordinatorError::config_error("心跳间隔必须大于0"));
        }

        if self.worker_timeout_seconds == 0 {
            return Err(CoordinatorError::config_error("Worker超时时间必须大于0"));
        }

        if self.worker_timeout_seconds <= self.heartbeat_interval_seconds {
            return Err(CoordinatorError::config_error(format!(
                "Worker超时时间({}秒)必须大于心跳间隔({}秒)",
                self.worker_timeout_seconds, self.heartbeat_interval_seconds
            )));
        }

        if self.max_workers == 0 {
            return Err(CoordinatorError::config_error("最大Worker数必须大于0"));
        }

        self.load_balancing_strategy()?;

        Ok(())
    }

    pub fn load_balancing_strategy(&self) -> CoordinatorResult<LoadBalancingStrategy> {
        self.load_balancing.parse()
    }

    pub fn worker_timeout(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.worker_timeout_seconds as i64)
    }

    pub fn heartbeat_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.heartbeat_interval_seconds)
    }

    pub fn coordinator_bind_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.coordinator_port)
    }
}

/// 负载均衡策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadBalancingStrategy {
    RoundRobin,
    LeastLoaded,
}

impl LoadBalancingStrategy {
    pub const ALL: [&'static str; 2] = ["round_robin", "least_loaded"];

    pub fn as_str(&self) -> &'static str {
        match self {
            LoadBalancingStrategy::RoundRobin => "round_robin",
            LoadBalancingStrategy::LeastLoaded => "least_loaded",
        }
    }
}

impl fmt::Display for LoadBalancingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoadBalancingStrategy {
    type Err = CoordinatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "round_robin" => Ok(LoadBalancingStrategy::RoundRobin),
            "least_loaded" => Ok(LoadBalancingStrategy::LeastLoaded),
            other => Err(CoordinatorError::config_error(format!(
                "无效的负载均衡策略: {}，支持的策略: {:?}",
                other,
                LoadBalancingStrategy::ALL
            ))),
        }
    }
}
