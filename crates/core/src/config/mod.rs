//! 配置管理
//!
//! 配置按以下顺序叠加，后者覆盖前者：
//! 1. 内置默认值
//! 2. TOML配置文件
//! 3. 环境变量（前缀 `DTEST_`，层级分隔符 `__`，例如
//!    `DTEST_COORDINATOR__WORKER_TIMEOUT_SECONDS=60`）
//!
//! 加载完成后立即验证，非法配置（例如未知的负载均衡策略）在启动阶段直接报错，
//! 而不是等到任务分配时才暴露。

pub mod models;

pub use models::*;

#[cfg(test)]
mod tests;
