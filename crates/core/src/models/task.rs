use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 任务参数，协调器不解释其内容
pub type TaskParameters = HashMap<String, serde_json::Value>;

/// 测试任务
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestTask {
    pub id: String,
    pub test_name: String,
    #[serde(default)]
    pub parameters: TaskParameters,
    /// 仅作为调用方元数据，调度按提交顺序进行
    #[serde(default)]
    pub priority: i32,
    pub status: TaskStatus,
    pub assigned_to: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// 任务状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Running => "running",
            TaskStatus::Completed => "completed",
        };
        f.write_str(s)
    }
}

impl TestTask {
    pub fn new(
        id: impl Into<String>,
        test_name: impl Into<String>,
        parameters: TaskParameters,
        priority: i32,
    ) -> Self {
        Self {
            id: id.into(),
            test_name: test_name.into(),
            parameters,
            priority,
            status: TaskStatus::Pending,
            assigned_to: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == TaskStatus::Pending
    }

    pub fn is_running(&self) -> bool {
        self.status == TaskStatus::Running
    }

    pub fn is_assigned_to(&self, worker_id: &str) -> bool {
        self.is_running() && self.assigned_to.as_deref() == Some(worker_id)
    }

    /// 分配给Worker，状态变为Running
    pub fn assign(&mut self, worker_id: &str) {
        self.status = TaskStatus::Running;
        self.assigned_to = Some(worker_id.to_string());
    }

    /// 释放分配，回到Pending
    pub fn release(&mut self) {
        self.status = TaskStatus::Pending;
        self.assigned_to = None;
    }

    /// 标记完成，返回之前持有该任务的Worker
    pub fn complete(&mut self) -> Option<String> {
        self.status = TaskStatus::Completed;
        self.assigned_to.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_lifecycle_tracks_assignment() {
        let mut task = TestTask::new("t1", "login_test", TaskParameters::new(), 5);
        assert!(task.is_pending());
        assert!(task.assigned_to.is_none());

        task.assign("worker1");
        assert!(task.is_running());
        assert!(task.is_assigned_to("worker1"));
        assert!(!task.is_assigned_to("worker2"));

        task.release();
        assert!(task.is_pending());
        assert!(task.assigned_to.is_none());

        task.assign("worker2");
        let previous = task.complete();
        assert_eq!(previous.as_deref(), Some("worker2"));
        assert_eq!(task.status, TaskStatus::Completed);
        assert!(task.assigned_to.is_none());
    }

    #[test]
    fn test_task_deserialize_defaults() {
        let json = r#"{
            "id": "t1",
            "test_name": "smoke",
            "status": "pending",
            "assigned_to": null,
            "created_at": "2024-01-01T00:00:00Z"
        }"#;
        let task: TestTask = serde_json::from_str(json).unwrap();
        assert!(task.parameters.is_empty());
        assert_eq!(task.priority, 0);
        assert_eq!(task.status, TaskStatus::Pending);
    }
}
