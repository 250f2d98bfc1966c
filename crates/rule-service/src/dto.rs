//! 请求与响应 DTO

use rule_engine::RuleSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// API 统一响应
///
/// 成功与失败都使用同一结构，`data` 在失败时为 null。
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    pub code: String,
    pub message: String,
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validation_errors: Vec<FieldError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            code: "SUCCESS".to_string(),
            message: "操作成功".to_string(),
            data: Some(data),
            validation_errors: Vec::new(),
            trace_id: None,
        }
    }

    pub fn error(code: &str, message: impl Into<String>) -> Self {
        Self {
            success: false,
            code: code.to_string(),
            message: message.into(),
            data: None,
            validation_errors: Vec::new(),
            trace_id: None,
        }
    }

    pub fn with_trace_id(mut self, trace_id: Option<String>) -> Self {
        self.trace_id = trace_id;
        self
    }

    pub fn with_validation_error(mut self, error: FieldError) -> Self {
        self.validation_errors.push(error);
        self
    }
}

/// 字段级校验错误
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// 规则应用请求
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyRulesRequest {
    pub class_name: String,
    #[serde(default)]
    pub objects: Vec<Value>,
}

/// 上传成功的规则集摘要
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedRuleSet {
    pub id: String,
    pub class_name: String,
    pub rule_count: usize,
}

impl From<&RuleSet> for UploadedRuleSet {
    fn from(rule_set: &RuleSet) -> Self {
        Self {
            id: rule_set.id().to_string(),
            class_name: rule_set.class_name().to_string(),
            rule_count: rule_set.real_rule_count(),
        }
    }
}
