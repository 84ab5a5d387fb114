// ==========================================
// EVE 工业规划系统 - 核心库
// ==========================================
// 系统定位: 生产计划执行规划器 (一次性快照上的纯计算)
// 技术栈: Rust + SQLite (SDE 静态数据)
// 排除范围: HTTP 路由/鉴权、计划持久化、行情/技能拉取客户端
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 协作方接口与实现
pub mod repository;

// 引擎层 - 规划业务规则
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 规划器参数
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    ActivityKind, FulfillmentMode, JobStatus, RigLevel, RoutePreference, SecurityClass,
    SkipReason, StructureType,
};

// 领域实体
pub use domain::{
    CharacterSkills, JobRecord, Plan, PlanRun, PlanStep, RecipeData, SkippedStep, StepTree,
    TransportJobRecord, TransportPolicy, TransportProfile,
};

// 引擎
pub use engine::{
    AssignmentSimulator, CapacityBuilder, CapacityPool, CostDurationEstimator, PlanExecutionResult,
    PlanOrchestrator, PlanPreview, PlannerError, PlannerRepositories, PlanningSnapshot,
    QuantityPropagator, TransportBatcher,
};

// 配置
pub use config::PlannerConfig;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "EVE 工业规划系统";
