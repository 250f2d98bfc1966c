//! 表格摄取
//!
//! 工作簿由若干命名表组成：`Metadata` 表取第一行作为规则集元数据，
//! 其余每张表的每一行是一条规则（或查找行）。

use crate::coerce::text_form;
use crate::error::{Result, RuleError};
use crate::models::{Cells, Metadata, Rule, RuleSet};
use crate::operators::LogicalOperator;
use tracing::{debug, info, instrument};

pub const METADATA_TABLE: &str = "Metadata";

const INDEX_COLUMN: &str = "Index";
const CONDITION_COLUMN_PREFIX: &str = "Condition_";
const ACTION_COLUMN_PREFIX: &str = "Action_";

/// 一行：列名到单元格值，保持列顺序
pub type Row = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub name: String,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(name: impl Into<String>, rows: Vec<Row>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    pub fn is_metadata(&self) -> bool {
        self.name == METADATA_TABLE
    }
}

/// 有序的命名表集合
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    pub tables: Vec<Table>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, name: impl Into<String>, rows: Vec<Row>) -> Self {
        self.tables.push(Table::new(name, rows));
        self
    }

    pub fn push_table(&mut self, table: Table) {
        self.tables.push(table);
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// 工作簿到规则集的转换器
pub struct RuleSetIngestor;

impl RuleSetIngestor {
    /// 转换并校验
    #[instrument(skip(workbook), fields(tables = workbook.tables.len()))]
    pub fn ingest(workbook: &Workbook) -> Result<RuleSet> {
        let metadata_row = workbook
            .table(METADATA_TABLE)
            .and_then(|t| t.rows.first())
            .ok_or_else(|| RuleError::validation(METADATA_TABLE, "缺少 Metadata 表"))?;
        let (metadata, operator_text) = Self::parse_metadata(metadata_row)?;

        let mut rules = Vec::new();
        for table in workbook.tables.iter().filter(|t| !t.is_metadata()) {
            for row in &table.rows {
                rules.push(Self::parse_rule(row)?);
            }
        }

        let parsed = rules.len();
        rules.retain(Rule::has_effect);
        debug!(parsed, kept = rules.len(), "已丢弃无动作的行");

        Self::renumber(&mut rules);

        let metadata = Self::validate(metadata, &operator_text)?;
        let rule_set = RuleSet::new(metadata, rules);

        info!(
            rule_set_id = %rule_set.id(),
            class_name = %rule_set.class_name(),
            rules = rule_set.real_rule_count(),
            "规则集摄取完成"
        );
        Ok(rule_set)
    }

    /// 解析元数据行；条件组合方式的原始文本留到校验阶段处理
    fn parse_metadata(row: &Row) -> Result<(Metadata, String)> {
        let priority_text = cell_text(row, "Priority");
        let priority = if priority_text.trim().is_empty() {
            0
        } else {
            priority_text.trim().parse::<i64>().map_err(|_| {
                RuleError::validation("Priority", format!("无法解析为整数: '{}'", priority_text))
            })?
        };

        let metadata = Metadata {
            id: cell_text(row, "Id"),
            name: cell_text(row, "Name"),
            class_name: cell_text(row, "ClassName"),
            general_action: cell_text(row, "GeneralAction"),
            conditions_operator: LogicalOperator::default(),
            priority,
        };

        Ok((metadata, cell_text(row, "ConditionsOperator")))
    }

    fn parse_rule(row: &Row) -> Result<Rule> {
        let index = row
            .get(INDEX_COLUMN)
            .map(|v| text_form(v).into_owned())
            .ok_or_else(|| RuleError::required(INDEX_COLUMN))?;

        let mut conditions = Cells::new();
        let mut actions = Cells::new();
        for (column, value) in row {
            if column.starts_with(CONDITION_COLUMN_PREFIX) {
                conditions.insert(column.as_str(), text_form(value));
            } else if column.starts_with(ACTION_COLUMN_PREFIX) {
                actions.insert(column.as_str(), text_form(value));
            }
        }

        Ok(Rule {
            index,
            conditions,
            actions,
        })
    }

    /// 跳过开头连续的查找行，其余行依次编号为 "1"、"2"……
    fn renumber(rules: &mut [Rule]) {
        let leading = rules.iter().take_while(|r| r.is_lookup()).count();
        for (n, rule) in rules[leading..].iter_mut().enumerate() {
            rule.index = (n + 1).to_string();
        }
    }

    fn validate(mut metadata: Metadata, operator_text: &str) -> Result<Metadata> {
        if metadata.id.trim().is_empty() {
            return Err(RuleError::required("Id"));
        }
        if metadata.class_name.trim().is_empty() {
            return Err(RuleError::required("ClassName"));
        }
        if operator_text.trim().is_empty() {
            return Err(RuleError::required("ConditionsOperator"));
        }

        metadata.conditions_operator = LogicalOperator::parse(operator_text).ok_or_else(|| {
            RuleError::validation(
                "ConditionsOperator",
                format!("必须为 AND 或 OR，实际为 '{}'", operator_text),
            )
        })?;

        Ok(metadata)
    }
}

/// 按列名取单元格文本，精确匹配优先，其次大小写不敏感
fn cell_text(row: &Row, column: &str) -> String {
    row.get(column)
        .or_else(|| {
            row.iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(column))
                .map(|(_, v)| v)
        })
        .map(|v| text_form(v).into_owned())
        .unwrap_or_default()
}
