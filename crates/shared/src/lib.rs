//! RuleGrid 共享基础设施
//!
//! 配置加载、PostgreSQL 连接池、基础设施错误与可观测性。

pub mod config;
pub mod database;
pub mod error;
pub mod observability;
