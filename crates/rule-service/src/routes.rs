//! 路由配置模块

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
};
use rulegrid_shared::observability::middleware as obs_middleware;

use crate::{handlers, state::AppState};

/// 规则引擎 API 前缀
pub const API_BASE_PATH: &str = "/api/v1/rule-engine";

/// 规则引擎路由
pub fn rule_engine_routes() -> Router<AppState> {
    Router::new()
        .route("/upload-ruleset", post(handlers::upload_rule_set))
        .route("/apply-rules", post(handlers::apply_rules))
        .route("/apply-rules-rete", post(handlers::apply_rules_with_rete))
        .route("/health", get(handlers::health_check))
}

/// 完整应用：业务路由、健康检查与可观测性中间件
pub fn app(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .nest(API_BASE_PATH, rule_engine_routes())
        .route("/health", get(handlers::health_check))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(middleware::from_fn(obs_middleware::http_tracing))
        .layer(middleware::from_fn(obs_middleware::request_id))
        .with_state(state)
}
