// ==========================================
// EVE 工业规划系统 - 仓储层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 仓储层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== 数据库错误 =====
    #[error("记录未找到: {entity} with id={id}")]
    NotFound { entity: String, id: String },

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库锁获取失败: {0}")]
    LockError(String),

    #[error("数据库查询失败: {0}")]
    DatabaseQueryError(String),

    // ===== 外部数据错误 =====
    #[error("路线不可达: origin={origin}, destination={destination}")]
    RouteNotFound { origin: i64, destination: i64 },

    #[error("数据验证失败: {0}")]
    ValidationError(String),

    #[error("数据导入失败: {0}")]
    ImportError(String),
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(e: rusqlite::Error) -> Self {
        RepositoryError::DatabaseQueryError(e.to_string())
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;
