// ==========================================
// EVE 工业规划系统 - 领域层
// ==========================================
// 职责: 实体与类型定义, 不含业务规则
// ==========================================

pub mod job;
pub mod plan;
pub mod recipe;
pub mod types;
pub mod worker;

pub use job::{JobRecord, SkippedStep, TransportItem, TransportJobRecord};
pub use plan::{Plan, PlanRun, PlanStep, TransportPolicy};
pub use recipe::{RecipeData, RecipeMaterial, StepTree, StepTreeError};
pub use types::{
    ActivityKind, CharacterId, FulfillmentMode, JobStatus, LocationId, RigLevel, RoutePreference,
    SecurityClass, SkillLevel, SkipReason, StructureType, SystemId, TypeId,
};
pub use worker::{CharacterSkills, TransportProfile};
