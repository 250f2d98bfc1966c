//! 规则服务错误类型定义

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rule_engine::RuleError;

use crate::dto::{ApiResponse, FieldError};

/// 上传文件为空或无法识别时的提示
pub const INVALID_FILE_MESSAGE: &str = "Invalid file.";

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("参数验证失败: {message}")]
    Validation {
        field: Option<String>,
        message: String,
    },

    #[error("{0}")]
    Ingestion(String),

    /// multipart 请求体本身无法读取（超限、格式错误），保留其状态码
    #[error("上传请求读取失败: {message}")]
    Upload { status: StatusCode, message: String },

    #[error("规则执行失败: {0}")]
    Engine(RuleError),

    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("内部错误: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    pub fn invalid_file() -> Self {
        Self::Ingestion(INVALID_FILE_MESSAGE.to_string())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Ingestion(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Upload { status, .. } => *status,
            Self::Engine(e) if e.is_malformed_rule_data() => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Engine(_) | Self::Database(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::Ingestion(_) => "INVALID_FILE",
            Self::Upload { status, .. } if *status == StatusCode::PAYLOAD_TOO_LARGE => {
                "PAYLOAD_TOO_LARGE"
            }
            Self::Upload { .. } => "INVALID_UPLOAD",
            Self::Engine(e) => e.code(),
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// 附带请求 ID，出现在响应的 traceId 中
    pub fn with_trace_id(self, trace_id: Option<String>) -> ApiError {
        ApiError {
            error: self,
            trace_id,
        }
    }
}

/// 引擎校验错误转为带字段名的服务校验错误
impl From<RuleError> for ServiceError {
    fn from(err: RuleError) -> Self {
        match err {
            RuleError::Validation { field, message } => Self::Validation {
                field: Some(field),
                message,
            },
            other => Self::Engine(other),
        }
    }
}

impl From<MultipartError> for ServiceError {
    fn from(err: MultipartError) -> Self {
        Self::Upload {
            status: err.status(),
            message: err.body_text(),
        }
    }
}

/// HTTP 层错误：服务错误加请求 ID
#[derive(Debug)]
pub struct ApiError {
    pub error: ServiceError,
    pub trace_id: Option<String>,
}

impl From<ServiceError> for ApiError {
    fn from(error: ServiceError) -> Self {
        Self {
            error,
            trace_id: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error = self.error;
        let status = error.status_code();

        // 系统级错误只返回通用提示，详细信息仅记录日志
        let message = match &error {
            ServiceError::Database(e) => {
                tracing::error!(error = %e, trace_id = ?self.trace_id, "数据库操作失败");
                "服务内部错误，请稍后重试".to_string()
            }
            ServiceError::Internal(e) => {
                tracing::error!(error = %e, trace_id = ?self.trace_id, "内部错误");
                "服务内部错误，请稍后重试".to_string()
            }
            ServiceError::Upload { status, message } if status.is_server_error() => {
                tracing::error!(error = %message, trace_id = ?self.trace_id, "上传请求读取失败");
                "服务内部错误，请稍后重试".to_string()
            }
            ServiceError::Engine(e) if !e.is_malformed_rule_data() => {
                tracing::error!(error = %e, trace_id = ?self.trace_id, "规则执行内部错误");
                "服务内部错误，请稍后重试".to_string()
            }
            other => {
                tracing::warn!(error = %other, trace_id = ?self.trace_id, "请求处理失败");
                other.to_string()
            }
        };

        let mut body = ApiResponse::<()>::error(error.error_code(), message)
            .with_trace_id(self.trace_id);
        if let ServiceError::Validation {
            field: Some(field),
            message,
        } = &error
        {
            body = body.with_validation_error(FieldError {
                field: field.clone(),
                message: message.clone(),
            });
        }

        (status, axum::Json(body)).into_response()
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;
