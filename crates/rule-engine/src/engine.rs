//! 单条记录的规则集执行

use crate::actions::ActionApplicator;
use crate::error::Result;
use crate::evaluator::ConditionEvaluator;
use crate::models::{Record, RuleSet};
use crate::rete::ReteNetwork;
use tracing::debug;

pub struct RuleEngine;

impl RuleEngine {
    /// 逐条评估真实规则并执行成立规则的动作，返回执行的规则数
    ///
    /// 条件针对进入时的记录快照评估，动作作用于实时记录，
    /// 前一条规则的修改不会影响后续规则的匹配。
    pub fn apply_rule_set(rule_set: &RuleSet, record: &mut Record) -> Result<usize> {
        let snapshot = record.clone();
        let mut applied = 0;

        for rule in rule_set.real_rules() {
            if ConditionEvaluator::conditions_satisfied(rule_set, rule, &snapshot)? {
                ActionApplicator::apply_actions(rule_set, rule, record)?;
                applied += 1;
                debug!(rule_set_id = %rule_set.id(), rule_index = %rule.index, "规则已执行");
            }
        }

        Ok(applied)
    }

    /// 通过事实索引匹配后执行，未加载规则集时不做任何修改
    pub fn apply_indexed(network: &ReteNetwork<'_>, record: &mut Record) -> Result<usize> {
        let Some(rule_set) = network.rule_set() else {
            return Ok(0);
        };

        let matched = network.match_rules(record, rule_set.metadata.conditions_operator)?;
        for rule in &matched {
            ActionApplicator::apply_actions(rule_set, rule, record)?;
            debug!(rule_set_id = %rule_set.id(), rule_index = %rule.index, "规则已执行");
        }

        Ok(matched.len())
    }
}
