//! 间接解析
//!
//! 规则行只写比较值，字段名与操作符写在查找行里：
//! `Condition_3` 列在 `#FieldName` 行的值是字段名，在 `#Operator` 行的值是操作符。

use crate::models::Rule;

pub const FIELD_NAME_ROW: &str = "#FieldName";
pub const OPERATOR_ROW: &str = "#Operator";

const CONDITION_PREFIX: &str = "Condition_";
const ACTION_PREFIX: &str = "Action_";

/// 解析结果，借用规则集中的字符串
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedKey<'a> {
    pub field: &'a str,
    pub operator: &'a str,
}

impl<'a> ResolvedKey<'a> {
    pub fn of(rules: &'a [Rule], key: &str) -> Self {
        Self {
            field: resolve_field(rules, key),
            operator: resolve_operator(rules, key),
        }
    }
}

/// 在 `lookup_index` 行中查找 `key` 列的值，找不到时返回空串
pub fn resolve<'a>(rules: &'a [Rule], key: &str, lookup_index: &str) -> &'a str {
    let Some(row) = rules.iter().find(|r| r.index == lookup_index) else {
        return "";
    };

    let cells = if has_prefix(key, CONDITION_PREFIX) {
        &row.conditions
    } else if has_prefix(key, ACTION_PREFIX) {
        &row.actions
    } else {
        return "";
    };

    cells.get(key).unwrap_or("")
}

pub fn resolve_field<'a>(rules: &'a [Rule], key: &str) -> &'a str {
    resolve(rules, key, FIELD_NAME_ROW)
}

pub fn resolve_operator<'a>(rules: &'a [Rule], key: &str) -> &'a str {
    resolve(rules, key, OPERATOR_ROW)
}

fn has_prefix(key: &str, prefix: &str) -> bool {
    key.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}
