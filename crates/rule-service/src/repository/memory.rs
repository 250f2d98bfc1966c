//! 进程内规则集仓储

use async_trait::async_trait;
use parking_lot::RwLock;
use rule_engine::RuleSet;
use tracing::debug;

use super::{RuleSetRepository, class_name_matches};
use crate::error::Result;

/// 进程内仓储，重启后数据丢失
#[derive(Debug, Default)]
pub struct InMemoryRuleSetRepository {
    rule_sets: RwLock<Vec<RuleSet>>,
}

impl InMemoryRuleSetRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rule_sets.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rule_sets.read().is_empty()
    }
}

#[async_trait]
impl RuleSetRepository for InMemoryRuleSetRepository {
    async fn save(&self, rule_set: &RuleSet) -> Result<()> {
        let mut rule_sets = self.rule_sets.write();
        match rule_sets.iter_mut().find(|rs| rs.id() == rule_set.id()) {
            Some(existing) => {
                *existing = rule_set.clone();
                debug!(rule_set_id = %rule_set.id(), "规则集已覆盖");
            }
            None => rule_sets.push(rule_set.clone()),
        }
        Ok(())
    }

    async fn find_by_class_name(&self, class_name: &str) -> Result<Vec<RuleSet>> {
        Ok(self
            .rule_sets
            .read()
            .iter()
            .filter(|rs| class_name_matches(rs.class_name(), class_name))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rule_engine::{Metadata, Rule};

    fn rule_set(id: &str, class_name: &str, rules: usize) -> RuleSet {
        RuleSet::new(
            Metadata {
                id: id.to_string(),
                class_name: class_name.to_string(),
                ..Default::default()
            },
            (1..=rules).map(|i| Rule::new(i.to_string())).collect(),
        )
    }

    #[tokio::test]
    async fn test_find_by_class_name_substring() {
        let repo = InMemoryRuleSetRepository::new();
        repo.save(&rule_set("A", "AvailableFlight", 1)).await.unwrap();
        repo.save(&rule_set("B", "Hotel", 1)).await.unwrap();
        repo.save(&rule_set("C", "FlightSegment", 1)).await.unwrap();

        let found = repo.find_by_class_name("flight").await.unwrap();
        let ids: Vec<_> = found.iter().map(|rs| rs.id()).collect();
        assert_eq!(ids, vec!["A", "C"]);
    }

    #[tokio::test]
    async fn test_save_upserts_in_place() {
        let repo = InMemoryRuleSetRepository::new();
        repo.save(&rule_set("A", "Flight", 1)).await.unwrap();
        repo.save(&rule_set("B", "Flight", 1)).await.unwrap();
        repo.save(&rule_set("A", "Flight", 3)).await.unwrap();

        assert_eq!(repo.len(), 2);
        let found = repo.find_by_class_name("Flight").await.unwrap();
        assert_eq!(found[0].id(), "A");
        assert_eq!(found[0].rules.len(), 3);
    }

    #[tokio::test]
    async fn test_empty_repository() {
        let repo = InMemoryRuleSetRepository::new();
        assert!(repo.is_empty());
        assert!(repo.find_by_class_name("Flight").await.unwrap().is_empty());
    }
}
