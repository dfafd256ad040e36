//! # dtest
//!
//! 分布式测试协调与负载均衡系统。协调器维护Worker注册表，按负载均衡策略把测试任务
//! 分配给Worker，通过心跳检测失效Worker并回收其任务。
//!
//! - [`dtest_core`]: 数据模型、配置和负载均衡接口
//! - [`dtest_dispatcher`]: 协调器、负载均衡策略和存活检测
//! - [`dtest_api`]: HTTP控制面
//! - [`dtest_worker`]: Worker侧客户端和心跳
//! - [`DistributedTestSystem`]: 进程内使用的门面

pub mod shutdown;
pub mod system;

pub use system::{DistributedTestSystem, WorkerHandle};
