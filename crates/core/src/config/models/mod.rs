pub mod app_config;
pub mod distributed;
pub mod observability;

pub use app_config::AppConfig;
pub use distributed::{DistributedConfig, LoadBalancingStrategy};
pub use observability::ObservabilityConfig;
