// ==========================================
// EVE 工业规划系统 - 规划器配置
// ==========================================
// 职责: 集中可调参数, 避免公式常量散落在引擎里
// 技能 ID 见 domain/types.rs::skill_ids
// ==========================================

use serde::{Deserialize, Serialize};

/// 规划器配置
///
/// Default 即游戏域的标准参数; 配置文件可覆写。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    // ===== 产能 =====
    /// 每活动基础槽位数 (未训练槽位技能的角色也有)
    pub base_slots_per_activity: i32,

    // ===== 时长公式系数 =====
    /// 工业技能每级时间缩减 (制造)
    pub industry_time_bonus_per_level: f64,
    /// 高级工业技能每级时间缩减 (制造)
    pub advanced_industry_time_bonus_per_level: f64,
    /// 反应技能每级时间缩减 (反应)
    pub reactions_time_bonus_per_level: f64,

    // ===== 角色质量评分权重 =====
    /// 活动主技能权重 (制造=工业, 反应=反应)
    pub quality_primary_skill_weight: i64,
    /// 高级工业权重 (仅制造)
    pub quality_advanced_industry_weight: i64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            base_slots_per_activity: 1,
            industry_time_bonus_per_level: 0.04,
            advanced_industry_time_bonus_per_level: 0.03,
            reactions_time_bonus_per_level: 0.04,
            quality_primary_skill_weight: 4,
            quality_advanced_industry_weight: 3,
        }
    }
}
