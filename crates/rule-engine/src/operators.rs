//! 规则操作符定义
//!
//! 条件与动作的操作符以文本形式写在 `#Operator` 查找行中，
//! 无法识别的操作符不是错误：条件视为不满足，动作视为空操作。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 条件操作符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionOperator {
    Equals,
    GreaterThan,
    LowerThan,
}

impl ConditionOperator {
    /// 从查找行文本解析，大小写敏感
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "Equals" => Some(Self::Equals),
            "GreaterThan" => Some(Self::GreaterThan),
            "LowerThan" => Some(Self::LowerThan),
            _ => None,
        }
    }
}

impl fmt::Display for ConditionOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Equals => "Equals",
            Self::GreaterThan => "GreaterThan",
            Self::LowerThan => "LowerThan",
        };
        write!(f, "{}", s)
    }
}

/// 动作操作符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionOperator {
    Set,
    Increase,
    Decrease,
}

impl ActionOperator {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "Set" => Some(Self::Set),
            "Increase" => Some(Self::Increase),
            "Decrease" => Some(Self::Decrease),
            _ => None,
        }
    }
}

impl fmt::Display for ActionOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Set => "Set",
            Self::Increase => "Increase",
            Self::Decrease => "Decrease",
        };
        write!(f, "{}", s)
    }
}

/// 逻辑操作符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicalOperator {
    #[default]
    And,
    Or,
}

impl LogicalOperator {
    /// 大小写不敏感地解析 `AND` / `OR`
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("AND") {
            Some(Self::And)
        } else if s.eq_ignore_ascii_case("OR") {
            Some(Self::Or)
        } else {
            None
        }
    }

    /// 组合的初始值：AND 从 true 开始，OR 从 false 开始
    pub fn identity(self) -> bool {
        matches!(self, Self::And)
    }
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And => write!(f, "AND"),
            Self::Or => write!(f, "OR"),
        }
    }
}

/// 规则集级别的通用动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneralAction {
    /// 每执行一个动作，向记录的 AppliedRules 追加来源标记
    SetAppliedRules,
}

impl GeneralAction {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "SetAppliedRules" => Some(Self::SetAppliedRules),
            _ => None,
        }
    }
}

impl fmt::Display for GeneralAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SetAppliedRules => write!(f, "SetAppliedRules"),
        }
    }
}
