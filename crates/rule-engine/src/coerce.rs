//! 记录值与规则文本之间的转换

use crate::error::{Result, RuleError};
use serde_json::Value;
use std::borrow::Cow;

/// 记录值的文本形式
///
/// 字符串取自身，数字取 JSON 文本，布尔为 `true` / `false`，null 为空串，
/// 数组和对象取 JSON 文本。
pub fn text_form(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s.as_str()),
        Value::Null => Cow::Borrowed(""),
        Value::Bool(true) => Cow::Borrowed("true"),
        Value::Bool(false) => Cow::Borrowed("false"),
        Value::Number(n) => Cow::Owned(n.to_string()),
        other => Cow::Owned(other.to_string()),
    }
}

pub fn parse_integer(text: &str) -> Result<i64> {
    text.trim()
        .parse::<i64>()
        .map_err(|_| RuleError::NumericParse {
            value: text.to_string(),
        })
}

pub fn parse_boolean(text: &str) -> Result<bool> {
    let trimmed = text.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if trimmed.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(RuleError::InvalidBoolean {
            value: text.to_string(),
        })
    }
}
