//! 规则引擎错误类型

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("字段 {field} 校验失败: {message}")]
    Validation { field: String, message: String },

    #[error("无法解析为整数: '{value}'")]
    NumericParse { value: String },

    #[error("无法解析为布尔值: '{value}'")]
    InvalidBoolean { value: String },

    #[error("整数运算溢出: 字段 {field}")]
    Overflow { field: String },
}

impl RuleError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// 必填字段为空
    pub fn required(field: impl Into<String>) -> Self {
        let field = field.into();
        let message = format!("{} 不能为空", field);
        Self::Validation { field, message }
    }

    /// 规则数据本身有问题（操作数无法按操作符解析）
    pub fn is_malformed_rule_data(&self) -> bool {
        matches!(
            self,
            Self::NumericParse { .. } | Self::InvalidBoolean { .. } | Self::Overflow { .. }
        )
    }

    /// 错误码
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::NumericParse { .. } | Self::InvalidBoolean { .. } | Self::Overflow { .. } => {
                "MALFORMED_RULE_DATA"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, RuleError>;
