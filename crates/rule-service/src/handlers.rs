//! 规则引擎 API 处理器

use std::convert::Infallible;

use axum::{
    Json,
    extract::{FromRequestParts, Multipart, State, rejection::JsonRejection},
    http::request::Parts,
};
use rulegrid_shared::observability::middleware::RequestId;
use serde_json::Value;
use tracing::debug;

use crate::{
    dto::{ApiResponse, ApplyRulesRequest, UploadedRuleSet},
    error::{ApiError, ServiceError},
    service::UploadedFile,
    state::AppState,
};

/// 当前请求的追踪 ID，来自 request_id 中间件
#[derive(Debug, Clone, Default)]
pub struct TraceId(pub Option<String>);

impl<S: Send + Sync> FromRequestParts<S> for TraceId {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(
            parts
                .extensions
                .get::<RequestId>()
                .map(|id| id.as_str().to_string()),
        ))
    }
}

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// 上传一个或多个规则集文件
///
/// POST /api/v1/rule-engine/upload-ruleset
pub async fn upload_rule_set(
    State(state): State<AppState>,
    TraceId(trace_id): TraceId,
    mut multipart: Multipart,
) -> ApiResult<Vec<UploadedRuleSet>> {
    let mut files = Vec::new();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return Err(ServiceError::from(e).with_trace_id(trace_id));
            }
        };

        let Some(file_name) = field.file_name().map(str::to_string) else {
            debug!(field = ?field.name(), "忽略非文件字段");
            continue;
        };

        let bytes = match field.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                return Err(ServiceError::from(e).with_trace_id(trace_id));
            }
        };
        files.push(UploadedFile::new(file_name, bytes.to_vec()));
    }

    let uploaded = state
        .service
        .upload_rule_sets(files)
        .await
        .map_err(|e| e.with_trace_id(trace_id.clone()))?;

    Ok(Json(ApiResponse::success(uploaded).with_trace_id(trace_id)))
}

/// 逐条评估并应用规则
///
/// POST /api/v1/rule-engine/apply-rules
pub async fn apply_rules(
    State(state): State<AppState>,
    TraceId(trace_id): TraceId,
    payload: Result<Json<ApplyRulesRequest>, JsonRejection>,
) -> ApiResult<Vec<Value>> {
    let Json(request) = payload.map_err(|e| rejection(e).with_trace_id(trace_id.clone()))?;

    let records = state
        .service
        .apply_rules(request)
        .await
        .map_err(|e| e.with_trace_id(trace_id.clone()))?;

    Ok(Json(ApiResponse::success(records).with_trace_id(trace_id)))
}

/// 经事实索引匹配后应用规则
///
/// POST /api/v1/rule-engine/apply-rules-rete
pub async fn apply_rules_with_rete(
    State(state): State<AppState>,
    TraceId(trace_id): TraceId,
    payload: Result<Json<ApplyRulesRequest>, JsonRejection>,
) -> ApiResult<Vec<Value>> {
    let Json(request) = payload.map_err(|e| rejection(e).with_trace_id(trace_id.clone()))?;

    let records = state
        .service
        .apply_rules_with_rete(request)
        .await
        .map_err(|e| e.with_trace_id(trace_id.clone()))?;

    Ok(Json(ApiResponse::success(records).with_trace_id(trace_id)))
}

/// 存活探针
pub async fn health_check() -> Json<Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "rule-grid"
    }))
}

fn rejection(err: JsonRejection) -> ServiceError {
    ServiceError::Validation {
        field: None,
        message: err.body_text(),
    }
}
