//! PostgreSQL 规则集仓储
//!
//! 整个规则集以 JSONB 文档保存，`class_name` 单独成列用于查询。

use async_trait::async_trait;
use rule_engine::RuleSet;
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::{info, instrument};

use super::RuleSetRepository;
use crate::error::Result;

#[derive(sqlx::FromRow)]
struct RuleSetRow {
    document: Json<RuleSet>,
}

#[derive(Clone)]
pub struct PgRuleSetRepository {
    pool: PgPool,
}

impl PgRuleSetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 创建表和索引（幂等）
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS rule_sets (
                id TEXT PRIMARY KEY,
                class_name TEXT NOT NULL,
                document JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_rule_sets_class_name
            ON rule_sets (LOWER(class_name))
            "#,
        )
        .execute(&self.pool)
        .await?;

        info!("rule_sets schema ready");
        Ok(())
    }
}

#[async_trait]
impl RuleSetRepository for PgRuleSetRepository {
    /// 冲突时整体替换文档，保留 created_at 以维持首次写入顺序
    #[instrument(skip(self, rule_set), fields(rule_set_id = %rule_set.id()))]
    async fn save(&self, rule_set: &RuleSet) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO rule_sets (id, class_name, document)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE SET
                class_name = EXCLUDED.class_name,
                document = EXCLUDED.document,
                updated_at = NOW()
            "#,
        )
        .bind(rule_set.id())
        .bind(rule_set.class_name())
        .bind(Json(rule_set))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_by_class_name(&self, class_name: &str) -> Result<Vec<RuleSet>> {
        let rows = sqlx::query_as::<_, RuleSetRow>(
            r#"
            SELECT document
            FROM rule_sets
            WHERE STRPOS(LOWER(class_name), LOWER($1)) > 0
            ORDER BY created_at, id
            "#,
        )
        .bind(class_name)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|row| row.document.0).collect())
    }
}
