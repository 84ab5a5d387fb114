// ==========================================
// EVE 工业规划系统 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 红线: 步骤级缺数据不是错误 (输出跳过记录), 这里只收调用级失败
// ==========================================

use crate::domain::recipe::StepTreeError;
use crate::domain::types::TypeId;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 规划器调用级错误
///
/// 错误分级:
/// - 步骤级可恢复 (蓝图缺失) -> SkippedStep, 不经过这里
/// - 材料级可恢复 (价格/成本指数缺失) -> 按 0 代入, 不经过这里
/// - 调用级致命 -> PlannerError
#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("无效的目标数量: {0} (必须 > 0)")]
    InvalidQuantity(i64),

    #[error("根步骤蓝图数据不可解析: product_type_id={product_type_id}")]
    RootBlueprintNotFound { product_type_id: TypeId },

    #[error("步骤树结构非法: {0}")]
    Tree(#[from] StepTreeError),

    #[error("自运履约模式缺少可解析的运输配置: profile_id={profile_id:?}")]
    MissingTransportProfile { profile_id: Option<i64> },

    #[error("仓储访问失败: {0}")]
    Repository(#[from] RepositoryError),
}

pub type PlannerResult<T> = Result<T, PlannerError>;
