//! 规则集仓储
//!
//! 服务层依赖 `RuleSetRepository` 抽象，可选进程内或 PostgreSQL 实现。

mod memory;
mod postgres;

pub use memory::InMemoryRuleSetRepository;
pub use postgres::PgRuleSetRepository;

use async_trait::async_trait;
use rule_engine::RuleSet;

use crate::error::Result;

/// 规则集仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RuleSetRepository: Send + Sync {
    /// 按 Metadata.id 整体覆盖写入
    async fn save(&self, rule_set: &RuleSet) -> Result<()>;

    /// 类名大小写不敏感的子串匹配，按首次写入顺序返回
    async fn find_by_class_name(&self, class_name: &str) -> Result<Vec<RuleSet>>;
}

/// 类名匹配规则，两种实现共用
pub(crate) fn class_name_matches(stored: &str, query: &str) -> bool {
    stored.to_lowercase().contains(&query.to_lowercase())
}
