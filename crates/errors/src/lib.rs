use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("Worker未找到: {id}")]
    WorkerNotFound { id: String },
    #[error("任务未找到: {id}")]
    TaskNotFound { id: String },
    #[error("任务 {task_id} 的结果已经记录")]
    ResultAlreadyRecorded { task_id: String },
    #[error("容量不足: {0}")]
    CapacityExceeded(String),
    #[error("配置错误: {0}")]
    Configuration(String),
    #[error("数据验证失败: {0}")]
    Validation(String),
    #[error("序列化错误: {0}")]
    Serialization(String),
    #[error("网络错误: {0}")]
    Network(String),
    #[error("内部错误: {0}")]
    Internal(String),
}

pub type CoordinatorResult<T> = Result<T, CoordinatorError>;

impl CoordinatorError {
    pub fn worker_not_found<S: Into<String>>(id: S) -> Self {
        Self::WorkerNotFound { id: id.into() }
    }
    pub fn task_not_found<S: Into<String>>(id: S) -> Self {
        Self::TaskNotFound { id: id.into() }
    }
    pub fn result_already_recorded<S: Into<String>>(task_id: S) -> Self {
        Self::ResultAlreadyRecorded {
            task_id: task_id.into(),
        }
    }
    pub fn config_error<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }
    pub fn validation_error<S: Into<String>>(msg: S) -> Self {
        Self::Validation(msg.into())
    }
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CoordinatorError::WorkerNotFound { .. } | CoordinatorError::TaskNotFound { .. }
        )
    }
    /// Worker侧可以通过重试（例如重新注册）恢复的错误
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CoordinatorError::WorkerNotFound { .. }
                | CoordinatorError::CapacityExceeded(_)
                | CoordinatorError::Network(_)
        )
    }
    pub fn user_message(&self) -> &str {
        match self {
            CoordinatorError::WorkerNotFound { .. } => "请求的Worker节点不存在，请先注册",
            CoordinatorError::TaskNotFound { .. } => "请求的测试任务不存在",
            CoordinatorError::ResultAlreadyRecorded { .. } => "该任务的结果已经提交过",
            CoordinatorError::CapacityExceeded(_) => "Worker数量已达上限，请稍后重试",
            CoordinatorError::Configuration(_) => "系统配置有误",
            CoordinatorError::Validation(_) => "输入数据验证失败",
            _ => "系统繁忙，请稍后重试",
        }
    }
}

impl From<serde_json::Error> for CoordinatorError {
    fn from(err: serde_json::Error) -> Self {
        CoordinatorError::Serialization(err.to_string())
    }
}

impl From<anyhow::Error> for CoordinatorError {
    fn from(err: anyhow::Error) -> Self {
        CoordinatorError::Internal(err.to_string())
    }
}
