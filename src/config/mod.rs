// ==========================================
// EVE 工业规划系统 - 配置层
// ==========================================
// 职责: 规划器可调参数
// ==========================================

pub mod planner_config;

pub use planner_config::PlannerConfig;
