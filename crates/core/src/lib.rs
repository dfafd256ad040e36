pub mod config;
pub mod models;
pub mod traits;

pub use config::models::{AppConfig, DistributedConfig, LoadBalancingStrategy, ObservabilityConfig};
pub use dtest_errors::{CoordinatorError, CoordinatorResult};
pub use models::*;
pub use traits::LoadBalancer;
