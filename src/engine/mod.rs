// ==========================================
// EVE 工业规划系统 - 引擎层
// ==========================================
// 职责: 实现规划业务规则, 不做 I/O (协作方数据经快照注入)
// 红线: 所有跳过/未指派必须输出 reason, 禁止静默丢弃
// ==========================================

pub mod assignment;
pub mod capacity;
pub mod error;
pub mod estimator;
pub mod orchestrator;
pub mod quantity;
pub mod snapshot;
pub mod transport;

// 重导出核心引擎
pub use assignment::{AssignmentSimulator, Fragment, StepAssignment, StepWorkload};
pub use capacity::{CapacityBuilder, CapacityPool};
pub use error::{PlannerError, PlannerResult};
pub use estimator::{CostDurationEstimator, EstimatorSkills, StepEstimate};
pub use orchestrator::{
    CharacterLoad, ParallelismOption, PlanExecutionResult, PlanOrchestrator, PlanPreview,
    PlannerRepositories,
};
pub use quantity::{PropagationResult, QuantityPropagator, ResolvedStep};
pub use snapshot::{MarketPrice, PlanningSnapshot};
pub use transport::TransportBatcher;
