//! 事实索引
//!
//! 为规则集的每个条件建立 `字段:操作符:值` 桶，桶内是产生该键的真实规则。
//! 桶是候选集提示，匹配时仍对全部真实规则做完整评估。
//!
//! 网络借用规则集，每次匹配会话创建一个实例，不在请求之间共享。

use crate::error::Result;
use crate::evaluator::ConditionEvaluator;
use crate::models::{Record, Rule, RuleSet};
use crate::operators::LogicalOperator;
use crate::resolver::ResolvedKey;
use std::collections::HashMap;
use tracing::{debug, instrument};

#[derive(Debug, Default)]
pub struct ReteNetwork<'a> {
    rule_set: Option<&'a RuleSet>,
    fact_cache: HashMap<String, Vec<&'a Rule>>,
}

impl<'a> ReteNetwork<'a> {
    /// 创建空网络
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建并加载规则集
    pub fn indexed(rule_set: &'a RuleSet) -> Self {
        let mut network = Self::new();
        network.load(rule_set);
        network
    }

    /// 清空后重新索引
    #[instrument(skip(self, rule_set), fields(rule_set_id = %rule_set.id()))]
    pub fn load(&mut self, rule_set: &'a RuleSet) {
        self.fact_cache.clear();
        self.rule_set = Some(rule_set);

        for rule in rule_set.real_rules() {
            for (key, value) in rule.conditions.iter() {
                let resolved = ResolvedKey::of(&rule_set.rules, key);
                let bucket = self
                    .fact_cache
                    .entry(Self::fact_key(resolved.field, resolved.operator, value))
                    .or_default();
                if !bucket.iter().any(|r| std::ptr::eq(*r, rule)) {
                    bucket.push(rule);
                }
            }
        }

        debug!(buckets = self.fact_cache.len(), "事实索引已建立");
    }

    pub fn fact_key(field: &str, operator: &str, value: &str) -> String {
        format!("{}:{}:{}", field, operator, value)
    }

    /// 按键取桶，不存在时为空
    pub fn bucket(&self, key: &str) -> &[&'a Rule] {
        self.fact_cache.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn bucket_count(&self) -> usize {
        self.fact_cache.len()
    }

    pub fn rule_set(&self) -> Option<&'a RuleSet> {
        self.rule_set
    }

    /// 返回在记录上成立的真实规则，每条至多一次，按定义顺序
    pub fn match_rules(&self, record: &Record, operator: LogicalOperator) -> Result<Vec<&'a Rule>> {
        let Some(rule_set) = self.rule_set else {
            return Ok(Vec::new());
        };

        let mut matched = Vec::new();
        for rule in rule_set.real_rules() {
            if ConditionEvaluator::combine(&rule_set.rules, rule, record, operator)? {
                matched.push(rule);
            }
        }
        Ok(matched)
    }
}
