//! 上传文件到工作簿的读取
//!
//! JSON 形式：顶层对象的键是表名，值是单行对象或行对象数组。
//!
//! ```json
//! {
//!   "Metadata": {"Id": "RS-1", "ClassName": "AvailableFlight", "ConditionsOperator": "AND"},
//!   "Rules": [{"Index": "#FieldName", "Condition_1": "Origin"}, {"Index": 1, "Condition_1": "THR"}]
//! }
//! ```

use rule_engine::{Row, Table, Workbook};
use serde_json::Value;

use crate::error::{Result, ServiceError};

pub trait WorkbookReader: Send + Sync {
    fn read(&self, file_name: &str, bytes: &[u8]) -> Result<Workbook>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonWorkbookReader;

impl JsonWorkbookReader {
    pub fn new() -> Self {
        Self
    }

    fn rows(file_name: &str, sheet: &str, value: Value) -> Result<Vec<Row>> {
        match value {
            Value::Object(row) => Ok(vec![row]),
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::Object(row) => Ok(row),
                    _ => Err(ServiceError::Ingestion(format!(
                        "{}: 表 {} 的行必须是对象",
                        file_name, sheet
                    ))),
                })
                .collect(),
            _ => Err(ServiceError::Ingestion(format!(
                "{}: 表 {} 必须是对象或对象数组",
                file_name, sheet
            ))),
        }
    }
}

impl WorkbookReader for JsonWorkbookReader {
    fn read(&self, file_name: &str, bytes: &[u8]) -> Result<Workbook> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(ServiceError::invalid_file());
        }

        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| ServiceError::Ingestion(format!("{}: {}", file_name, e)))?;
        let Value::Object(sheets) = value else {
            return Err(ServiceError::invalid_file());
        };

        let mut workbook = Workbook::new();
        for (name, sheet) in sheets {
            let rows = Self::rows(file_name, &name, sheet)?;
            workbook.push_table(Table::new(name, rows));
        }
        Ok(workbook)
    }
}
