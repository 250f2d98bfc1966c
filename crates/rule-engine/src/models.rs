//! 规则集领域模型

use crate::operators::{GeneralAction, LogicalOperator};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// 待变换的记录（事实）
pub type Record = serde_json::Map<String, serde_json::Value>;

/// 规则集元数据
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Metadata {
    pub id: String,
    pub name: String,
    /// 规则集适用的类名，查询时大小写不敏感
    pub class_name: String,
    pub general_action: String,
    pub conditions_operator: LogicalOperator,
    /// 排序提示，匹配过程不使用
    pub priority: i64,
}

impl Metadata {
    /// 是否需要在记录上追加 AppliedRules 来源标记
    pub fn records_applied_rules(&self) -> bool {
        GeneralAction::parse(&self.general_action) == Some(GeneralAction::SetAppliedRules)
    }
}

/// 一行规则
///
/// `index` 为正整数字符串时是真实规则；包含 `#` 时是查找行
/// （如 `#FieldName`、`#Operator`），只用于间接解析，从不参与匹配。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Rule {
    pub index: String,
    pub conditions: Cells,
    pub actions: Cells,
}

impl Rule {
    pub fn new(index: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            ..Default::default()
        }
    }

    pub fn with_condition(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.conditions.insert(key, value);
        self
    }

    pub fn with_action(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.actions.insert(key, value);
        self
    }

    pub fn is_lookup(&self) -> bool {
        self.index.contains('#')
    }

    /// 所有动作都为空白时，该行没有任何效果
    pub fn has_effect(&self) -> bool {
        self.actions.values().any(|v| !v.trim().is_empty())
    }
}

/// 规则集：一份元数据加有序规则列表
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct RuleSet {
    pub metadata: Metadata,
    pub rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(metadata: Metadata, rules: Vec<Rule>) -> Self {
        Self { metadata, rules }
    }

    pub fn id(&self) -> &str {
        &self.metadata.id
    }

    pub fn class_name(&self) -> &str {
        &self.metadata.class_name
    }

    /// 参与匹配的真实规则，按定义顺序
    pub fn real_rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(|r| !r.is_lookup())
    }

    pub fn real_rule_count(&self) -> usize {
        self.real_rules().count()
    }
}

/// 保持列顺序的字符串映射
///
/// 动作按存储顺序执行，因此不能使用无序映射。序列化为 JSON 对象。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cells(Vec<(String, String)>);

impl Cells {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入或覆盖；覆盖时保留原位置
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Cells {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut cells = Cells::new();
        for (k, v) in iter {
            cells.insert(k, v);
        }
        cells
    }
}

impl Serialize for Cells {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Cells {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CellsVisitor;

        impl<'de> Visitor<'de> for CellsVisitor {
            type Value = Cells;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of column name to string")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Cells, A::Error> {
                let mut cells = Cells(Vec::with_capacity(access.size_hint().unwrap_or(0)));
                while let Some((k, v)) = access.next_entry::<String, String>()? {
                    cells.insert(k, v);
                }
                Ok(cells)
            }
        }

        deserializer.deserialize_map(CellsVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cells_preserve_insertion_order() {
        let cells: Cells = [("Action_3", "c"), ("Action_1", "a"), ("Action_2", "b")]
            .into_iter()
            .collect();
        let keys: Vec<_> = cells.keys().collect();
        assert_eq!(keys, vec!["Action_3", "Action_1", "Action_2"]);

        let json = serde_json::to_string(&cells).unwrap();
        assert_eq!(json, r#"{"Action_3":"c","Action_1":"a","Action_2":"b"}"#);

        let back: Cells = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cells);
    }

    #[test]
    fn test_cells_insert_overwrites_in_place() {
        let mut cells = Cells::new();
        cells.insert("A", "1");
        cells.insert("B", "2");
        cells.insert("A", "3");
        assert_eq!(cells.len(), 2);
        assert_eq!(cells.get("A"), Some("3"));
        assert_eq!(cells.keys().next(), Some("A"));
    }

    #[test]
    fn test_rule_set_document_shape() {
        let rule_set = RuleSet::new(
            Metadata {
                id: "RS-1".to_string(),
                class_name: "AvailableFlight".to_string(),
                general_action: "SetAppliedRules".to_string(),
                conditions_operator: LogicalOperator::Or,
                ..Default::default()
            },
            vec![
                Rule::new("#FieldName").with_action("Action_1", "MaxPrice"),
                Rule::new("1").with_condition("Condition_1", "THR"),
            ],
        );

        let value = serde_json::to_value(&rule_set).unwrap();
        assert_eq!(value["Metadata"]["ClassName"], "AvailableFlight");
        assert_eq!(value["Metadata"]["ConditionsOperator"], "OR");
        assert_eq!(value["Rules"][1]["Conditions"]["Condition_1"], "THR");

        let back: RuleSet = serde_json::from_value(value).unwrap();
        assert_eq!(back, rule_set);
    }

    #[test]
    fn test_real_rules_skip_lookup_rows() {
        let rule_set = RuleSet::new(
            Metadata::default(),
            vec![Rule::new("#Operator"), Rule::new("1"), Rule::new("2")],
        );
        let indices: Vec<_> = rule_set.real_rules().map(|r| r.index.as_str()).collect();
        assert_eq!(indices, vec!["1", "2"]);
        assert_eq!(rule_set.real_rule_count(), 2);
    }

    #[test]
    fn test_has_effect() {
        assert!(!Rule::new("1").with_action("Action_1", "  ").has_effect());
        assert!(Rule::new("1").with_action("Action_1", "5").has_effect());
        assert!(!Rule::new("1").has_effect());
    }

    #[test]
    fn test_records_applied_rules() {
        let mut metadata = Metadata::default();
        assert!(!metadata.records_applied_rules());
        metadata.general_action = "SetAppliedRules".to_string();
        assert!(metadata.records_applied_rules());
    }
}
