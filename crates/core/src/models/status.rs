use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 系统状态快照
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SystemStatus {
    pub workers: WorkerStats,
    pub tasks: TaskStats,
    pub load_balancing: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkerStats {
    pub total: usize,
    pub idle: usize,
    pub busy: usize,
    pub offline: usize,
}

/// `total == pending + running + completed`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskStats {
    pub total: usize,
    pub pending: usize,
    pub running: usize,
    pub completed: usize,
}

impl TaskStats {
    pub fn is_consistent(&self) -> bool {
        self.total == self.pending + self.running + self.completed
    }
}
