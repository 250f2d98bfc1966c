//! 动作执行器

use crate::coerce::{parse_boolean, parse_integer, text_form};
use crate::error::{Result, RuleError};
use crate::evaluator::lookup;
use crate::models::{Record, Rule, RuleSet};
use crate::operators::ActionOperator;
use crate::resolver::ResolvedKey;
use serde_json::Value;
use tracing::trace;

/// 来源标记字段名
pub const APPLIED_RULES_FIELD: &str = "AppliedRules";

pub struct ActionApplicator;

impl ActionApplicator {
    /// 按存储顺序执行规则的全部动作，原地修改记录
    ///
    /// 字段名为空或记录中不存在该字段的动作被跳过；被跳过的动作不记录来源。
    pub fn apply_actions(rule_set: &RuleSet, rule: &Rule, record: &mut Record) -> Result<()> {
        let track = rule_set.metadata.records_applied_rules();

        for (key, value) in rule.actions.iter() {
            let resolved = ResolvedKey::of(&rule_set.rules, key);
            let Some(current) = lookup(record, resolved.field) else {
                trace!(key, field = resolved.field, "动作字段不存在，跳过");
                continue;
            };

            let updated = match ActionOperator::parse(resolved.operator) {
                Some(ActionOperator::Set) => Some(Self::set(current, value)?),
                Some(ActionOperator::Increase) => {
                    Some(Self::arithmetic(current, value, resolved.field, i64::checked_add)?)
                }
                Some(ActionOperator::Decrease) => {
                    Some(Self::arithmetic(current, value, resolved.field, i64::checked_sub)?)
                }
                None => None,
            };

            if let Some(updated) = updated {
                record.insert(resolved.field.to_string(), updated);
            }

            if track {
                Self::record_applied_rule(record, &rule_set.metadata.id, &rule.index);
            }
        }

        Ok(())
    }

    fn set(current: &Value, value: &str) -> Result<Value> {
        if current.is_boolean() {
            Ok(Value::Bool(parse_boolean(value)?))
        } else {
            Ok(Value::String(value.to_string()))
        }
    }

    fn arithmetic(
        current: &Value,
        value: &str,
        field: &str,
        op: fn(i64, i64) -> Option<i64>,
    ) -> Result<Value> {
        let lhs = parse_integer(&text_form(current))?;
        let rhs = parse_integer(value)?;
        op(lhs, rhs)
            .map(Value::from)
            .ok_or_else(|| RuleError::Overflow {
                field: field.to_string(),
            })
    }

    /// 追加 `RuleId:<id> RuleIndex:<index>`，已存在则不重复
    fn record_applied_rule(record: &mut Record, rule_set_id: &str, index: &str) {
        let entry = format!("RuleId:{} RuleIndex:{}", rule_set_id, index);

        match record.get_mut(APPLIED_RULES_FIELD) {
            Some(Value::Array(items)) => {
                if !items.iter().any(|v| v.as_str() == Some(entry.as_str())) {
                    items.push(Value::String(entry));
                }
            }
            _ => {
                record.insert(
                    APPLIED_RULES_FIELD.to_string(),
                    Value::Array(vec![Value::String(entry)]),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Metadata;
    use crate::resolver::{FIELD_NAME_ROW, OPERATOR_ROW};
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    fn rule_set(general_action: &str, operator: &str, field: &str, value: &str) -> RuleSet {
        RuleSet::new(
            Metadata {
                id: "RS-1".to_string(),
                general_action: general_action.to_string(),
                ..Default::default()
            },
            vec![
                Rule::new(FIELD_NAME_ROW).with_action("Action_1", field),
                Rule::new(OPERATOR_ROW).with_action("Action_1", operator),
                Rule::new("1").with_action("Action_1", value),
            ],
        )
    }

    fn apply(rs: &RuleSet, value: Value) -> Result<Record> {
        let mut rec = record(value);
        ActionApplicator::apply_actions(rs, &rs.rules[2], &mut rec)?;
        Ok(rec)
    }

    #[test]
    fn test_increase_and_decrease() {
        let rs = rule_set("", "Increase", "Count", "3");
        assert_eq!(apply(&rs, json!({"Count": 10})).unwrap()["Count"], json!(13));

        let rs = rule_set("", "Decrease", "Count", "3");
        assert_eq!(apply(&rs, json!({"Count": "10"})).unwrap()["Count"], json!(7));
    }

    #[test]
    fn test_overflow_is_error() {
        let rs = rule_set("", "Increase", "Count", "1");
        let err = apply(&rs, json!({"Count": i64::MAX})).unwrap_err();
        assert!(matches!(err, RuleError::Overflow { field } if field == "Count"));
    }

    #[test]
    fn test_set_boolean_and_string() {
        let rs = rule_set("", "Set", "Active", "TRUE");
        assert_eq!(apply(&rs, json!({"Active": false})).unwrap()["Active"], json!(true));
        assert_eq!(apply(&rs, json!({"Active": null})).unwrap()["Active"], json!("TRUE"));

        let rs = rule_set("", "Set", "Active", "maybe");
        assert!(matches!(
            apply(&rs, json!({"Active": false})),
            Err(RuleError::InvalidBoolean { .. })
        ));
    }

    #[test]
    fn test_missing_field_is_skipped_without_provenance() {
        let rs = rule_set("SetAppliedRules", "Set", "MaxPrice", "100");
        let rec = apply(&rs, json!({"Origin": "THR"})).unwrap();
        assert_eq!(rec, record(json!({"Origin": "THR"})));
    }

    #[test]
    fn test_unknown_operator_still_records_provenance() {
        let rs = rule_set("SetAppliedRules", "Multiply", "MaxPrice", "2");
        let rec = apply(&rs, json!({"MaxPrice": 5})).unwrap();
        assert_eq!(rec["MaxPrice"], json!(5));
        assert_eq!(rec[APPLIED_RULES_FIELD], json!(["RuleId:RS-1 RuleIndex:1"]));
    }

    #[test]
    fn test_applied_rules_is_deduplicated() {
        let rs = rule_set("SetAppliedRules", "Increase", "Count", "1");
        let mut rec = record(json!({"Count": 0, "AppliedRules": "legacy"}));
        ActionApplicator::apply_actions(&rs, &rs.rules[2], &mut rec).unwrap();
        ActionApplicator::apply_actions(&rs, &rs.rules[2], &mut rec).unwrap();
        assert_eq!(rec["Count"], json!(2));
        assert_eq!(rec[APPLIED_RULES_FIELD], json!(["RuleId:RS-1 RuleIndex:1"]));
    }

    #[test]
    fn test_without_general_action_no_provenance() {
        let rs = rule_set("", "Set", "MaxPrice", "100");
        let rec = apply(&rs, json!({"MaxPrice": null})).unwrap();
        assert!(!rec.contains_key(APPLIED_RULES_FIELD));
    }
}
