use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 测试结果，每个任务最多一条，记录后不可修改
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DistributedTestResult {
    pub task_id: String,
    pub status: ResultStatus,
    pub duration_ms: u64,
    pub output: String,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    Pass,
    Fail,
}

impl fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultStatus::Pass => f.write_str("pass"),
            ResultStatus::Fail => f.write_str("fail"),
        }
    }
}

impl DistributedTestResult {
    pub fn new(
        task_id: impl Into<String>,
        status: ResultStatus,
        duration: Duration,
        output: impl Into<String>,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            status,
            duration_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
            output: output.into(),
            completed_at: Utc::now(),
        }
    }

    pub fn passed(&self) -> bool {
        self.status == ResultStatus::Pass
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}
