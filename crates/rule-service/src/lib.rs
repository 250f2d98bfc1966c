//! RuleGrid 规则服务
//!
//! 上传表格形式的规则集，并按类名把规则应用到 JSON 记录上。

pub mod dto;
pub mod error;
pub mod handlers;
pub mod repository;
pub mod routes;
pub mod service;
pub mod state;
pub mod workbook;

pub use error::{ApiError, Result, ServiceError};
pub use repository::{InMemoryRuleSetRepository, PgRuleSetRepository, RuleSetRepository};
pub use service::{MatchPath, RuleEngineService, UploadedFile};
pub use state::AppState;
pub use workbook::{JsonWorkbookReader, WorkbookReader};
