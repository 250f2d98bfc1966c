//! RuleGrid 规则引擎
//!
//! 将表格形式的规则定义转换为规则集，并据此变换 JSON 记录：
//! - 表格摄取：Metadata 表 + 规则表，`#` 查找行间接定义字段与操作符
//! - 条件评估：AND / OR 组合，Equals / GreaterThan / LowerThan
//! - 动作执行：Set / Increase / Decrease，可选 AppliedRules 审计追踪
//! - 事实索引：RETE 风格的 `field:operator:value` 候选桶

pub mod actions;
pub mod coerce;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod ingest;
pub mod models;
pub mod operators;
pub mod rete;
pub mod resolver;

pub use actions::{APPLIED_RULES_FIELD, ActionApplicator};
pub use engine::RuleEngine;
pub use error::{Result, RuleError};
pub use evaluator::ConditionEvaluator;
pub use ingest::{METADATA_TABLE, Row, RuleSetIngestor, Table, Workbook};
pub use models::{Cells, Metadata, Record, Rule, RuleSet};
pub use operators::{ActionOperator, ConditionOperator, GeneralAction, LogicalOperator};
pub use rete::ReteNetwork;
pub use resolver::{FIELD_NAME_ROW, OPERATOR_ROW, ResolvedKey};
