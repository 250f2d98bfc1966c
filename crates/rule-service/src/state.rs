//! 应用状态定义

use std::sync::Arc;

use crate::service::RuleEngineService;

/// Axum 路由共享状态
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<RuleEngineService>,
}

impl AppState {
    pub fn new(service: Arc<RuleEngineService>) -> Self {
        Self { service }
    }
}
