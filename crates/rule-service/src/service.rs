//! 规则引擎服务层
//!
//! 编排工作簿读取、规则集摄取、存储与记录变换。

use std::sync::Arc;
use std::time::Instant;

use rule_engine::{Record, ReteNetwork, RuleEngine, RuleSetIngestor};
use rulegrid_shared::observability::metrics;
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::dto::{ApplyRulesRequest, UploadedRuleSet};
use crate::error::{Result, ServiceError};
use crate::repository::RuleSetRepository;
use crate::workbook::WorkbookReader;

/// 上传的单个文件
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

/// 规则匹配路径
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPath {
    /// 逐条评估
    Plain,
    /// 经事实索引匹配
    Indexed,
}

impl MatchPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Indexed => "rete",
        }
    }
}

pub struct RuleEngineService {
    repository: Arc<dyn RuleSetRepository>,
    reader: Arc<dyn WorkbookReader>,
}

impl RuleEngineService {
    pub fn new(repository: Arc<dyn RuleSetRepository>, reader: Arc<dyn WorkbookReader>) -> Self {
        Self { repository, reader }
    }

    /// 按顺序处理上传文件，任一文件失败即终止
    ///
    /// 失败之前已处理的文件仍然保存。
    #[instrument(skip(self, files), fields(files = files.len()))]
    pub async fn upload_rule_sets(&self, files: Vec<UploadedFile>) -> Result<Vec<UploadedRuleSet>> {
        let mut uploaded = Vec::with_capacity(files.len());

        for file in files {
            let workbook = self.reader.read(&file.name, &file.bytes)?;
            let rule_set = RuleSetIngestor::ingest(&workbook)?;

            let network = ReteNetwork::indexed(&rule_set);
            debug!(
                file = %file.name,
                buckets = network.bucket_count(),
                "规则集索引检查通过"
            );

            self.repository.save(&rule_set).await?;
            metrics::record_rule_set_uploaded(
                rule_set.id(),
                rule_set.class_name(),
                rule_set.real_rule_count(),
            );

            info!(
                file = %file.name,
                rule_set_id = %rule_set.id(),
                class_name = %rule_set.class_name(),
                "规则集已保存"
            );
            uploaded.push(UploadedRuleSet::from(&rule_set));
        }

        Ok(uploaded)
    }

    pub async fn apply_rules(&self, request: ApplyRulesRequest) -> Result<Vec<Value>> {
        self.apply(request, MatchPath::Plain).await
    }

    pub async fn apply_rules_with_rete(&self, request: ApplyRulesRequest) -> Result<Vec<Value>> {
        self.apply(request, MatchPath::Indexed).await
    }

    /// 依次把每个规则集应用到全部记录，返回顺序与输入一致
    #[instrument(
        skip(self, request),
        fields(class_name = %request.class_name, objects = request.objects.len(), path = path.as_str())
    )]
    async fn apply(&self, request: ApplyRulesRequest, path: MatchPath) -> Result<Vec<Value>> {
        if request.class_name.trim().is_empty() {
            return Err(ServiceError::validation("className", "className 不能为空"));
        }

        let start = Instant::now();
        let mut records = Self::into_records(request.objects)?;
        let rule_sets = self.repository.find_by_class_name(&request.class_name).await?;

        let mut rules_applied = 0;
        match path {
            MatchPath::Plain => {
                for rule_set in &rule_sets {
                    for record in records.iter_mut() {
                        rules_applied += RuleEngine::apply_rule_set(rule_set, record)?;
                    }
                }
            }
            MatchPath::Indexed => {
                let mut network = ReteNetwork::new();
                for rule_set in &rule_sets {
                    network.load(rule_set);
                    for record in records.iter_mut() {
                        rules_applied += RuleEngine::apply_indexed(&network, record)?;
                    }
                }
            }
        }

        metrics::record_rule_application(
            path.as_str(),
            records.len(),
            rules_applied,
            start.elapsed().as_secs_f64(),
        );
        info!(
            rule_sets = rule_sets.len(),
            rules_applied,
            "规则应用完成"
        );

        Ok(records.into_iter().map(Value::Object).collect())
    }

    fn into_records(objects: Vec<Value>) -> Result<Vec<Record>> {
        objects
            .into_iter()
            .enumerate()
            .map(|(i, value)| match value {
                Value::Object(record) => Ok(record),
                _ => Err(ServiceError::validation(
                    format!("objects[{}]", i),
                    "必须是 JSON 对象",
                )),
            })
            .collect()
    }
}
