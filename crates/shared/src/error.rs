//! 基础设施错误

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SharedError {
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, SharedError>;

impl SharedError {
    /// 启动日志中使用的错误码
    pub fn code(&self) -> &'static str {
        match self {
            Self::Database(sqlx::Error::PoolTimedOut) => "DATABASE_TIMEOUT",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(SharedError::from(sqlx::Error::PoolTimedOut).code(), "DATABASE_TIMEOUT");
        let err = SharedError::from(sqlx::Error::RowNotFound);
        assert_eq!(err.code(), "DATABASE_ERROR");
        assert!(err.to_string().starts_with("数据库错误"));
    }
}
