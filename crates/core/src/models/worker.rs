use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Worker节点信息
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkerInfo {
    pub id: String,
    /// host:port
    pub address: String,
    pub status: WorkerStatus,
    pub last_heartbeat: DateTime<Utc>,
    /// 当前分配给该Worker的任务数
    pub load: u32,
    pub registered_at: DateTime<Utc>,
}

/// Worker状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum WorkerStatus {
    Idle,
    Busy,
    Offline,
}

impl WorkerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkerStatus::Idle => "idle",
            WorkerStatus::Busy => "busy",
            WorkerStatus::Offline => "offline",
        }
    }
}

impl fmt::Display for WorkerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkerStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "idle" => Ok(WorkerStatus::Idle),
            "busy" => Ok(WorkerStatus::Busy),
            "offline" => Ok(WorkerStatus::Offline),
            other => Err(format!("无效的Worker状态: {other}")),
        }
    }
}

impl WorkerInfo {
    /// 创建新的空闲Worker
    pub fn new(id: impl Into<String>, address: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            address: address.into(),
            status: WorkerStatus::Idle,
            last_heartbeat: now,
            load: 0,
            registered_at: now,
        }
    }

    pub fn is_offline(&self) -> bool {
        self.status == WorkerStatus::Offline
    }

    /// 检查Worker是否可以参与任务分配
    pub fn is_available(&self) -> bool {
        !self.is_offline()
    }

    /// 检查心跳是否超时，已离线的Worker不再视为超时
    pub fn is_heartbeat_expired(&self, now: DateTime<Utc>, timeout: Duration) -> bool {
        self.is_available() && now - self.last_heartbeat > timeout
    }

    /// 更新心跳信息
    pub fn update_heartbeat(&mut self, status: WorkerStatus, load: u32, now: DateTime<Utc>) {
        self.status = status;
        self.load = load;
        self.last_heartbeat = now;
    }
}
