//! Worker侧组件：协调器客户端和心跳管理

pub mod components;

pub use components::{CoordinatorClient, HeartbeatManager, LoadProvider};
