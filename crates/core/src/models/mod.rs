//! # 数据模型
//!
//! 分布式测试协调系统的核心数据结构：Worker节点、测试任务、测试结果以及系统状态快照。
//!
//! ## 状态流转
//!
//! ### Worker状态
//! ```text
//! 注册 → Idle ⇄ Busy
//!          ↓      ↓
//!        Offline (心跳超时)
//! ```
//!
//! ### 任务状态
//! ```text
//! Pending → Running → Completed
//!    ↑         │
//!    └─────────┘ (Worker离线后回收)
//! ```
//!
//! 所有时间字段使用 `DateTime<Utc>`，所有模型都实现了序列化和反序列化，
//! 可直接作为HTTP控制面的请求和响应体。

pub mod status;
pub mod task;
pub mod test_result;
pub mod worker;

pub use status::*;
pub use task::*;
pub use test_result::*;
pub use worker::*;
