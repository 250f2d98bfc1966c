//! 条件评估器
//!
//! 按逻辑操作符组合一条规则的全部条件。组合是惰性的：AND 在结果为 false 后
//! 不再评估后续条件，OR 在结果为 true 后不再评估，因此解析错误只在条件
//! 真正被评估时才会出现。

use crate::coerce::{parse_integer, text_form};
use crate::error::Result;
use crate::models::{Record, Rule, RuleSet};
use crate::operators::{ConditionOperator, LogicalOperator};
use crate::resolver::ResolvedKey;
use serde_json::Value;

/// 条件评估器
pub struct ConditionEvaluator;

impl ConditionEvaluator {
    /// 规则的条件在记录上是否成立，使用规则集的条件组合方式
    pub fn conditions_satisfied(rule_set: &RuleSet, rule: &Rule, record: &Record) -> Result<bool> {
        Self::combine(
            &rule_set.rules,
            rule,
            record,
            rule_set.metadata.conditions_operator,
        )
    }

    /// 以指定逻辑操作符组合规则条件
    ///
    /// 字段名为空或记录中不存在该字段时，条件视为不满足。
    pub fn combine(
        rules: &[Rule],
        rule: &Rule,
        record: &Record,
        operator: LogicalOperator,
    ) -> Result<bool> {
        let mut met = operator.identity();

        for (key, expected) in rule.conditions.iter() {
            let resolved = ResolvedKey::of(rules, key);
            let Some(actual) = lookup(record, resolved.field) else {
                if operator == LogicalOperator::And {
                    met = false;
                }
                continue;
            };

            met = match operator {
                LogicalOperator::And => met && Self::evaluate(resolved.operator, actual, expected)?,
                LogicalOperator::Or => met || Self::evaluate(resolved.operator, actual, expected)?,
            };
        }

        Ok(met)
    }

    /// 评估单个条件
    ///
    /// # Arguments
    /// * `operator` - `#Operator` 行中的操作符文本
    /// * `actual` - 记录中的字段值
    /// * `expected` - 规则行中的比较值
    pub fn evaluate(operator: &str, actual: &Value, expected: &str) -> Result<bool> {
        match ConditionOperator::parse(operator) {
            Some(ConditionOperator::Equals) => Ok(Self::equals(actual, expected)),
            Some(ConditionOperator::GreaterThan) => {
                Ok(parse_integer(&text_form(actual))? > parse_integer(expected)?)
            }
            Some(ConditionOperator::LowerThan) => {
                Ok(parse_integer(&text_form(actual))? < parse_integer(expected)?)
            }
            None => Ok(false),
        }
    }

    fn equals(actual: &Value, expected: &str) -> bool {
        match actual {
            Value::Bool(_) => text_form(actual).eq_ignore_ascii_case(expected.trim()),
            _ => text_form(actual) == expected,
        }
    }
}

/// 按解析出的字段名取记录值，字段名为空时视为不存在
pub(crate) fn lookup<'r>(record: &'r Record, field: &str) -> Option<&'r Value> {
    if field.trim().is_empty() {
        return None;
    }
    record.get(field)
}
