// ==========================================
// EVE 工业规划系统 - 领域类型定义
// ==========================================
// 红线: 制造与反应是两套公式族,禁止共用 TE 计算
// 序列化格式: SCREAMING_SNAKE_CASE (与存储层一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 基础 ID 别名
// ==========================================

/// 物品类型 ID (SDE type_id)
pub type TypeId = i64;
/// 位置 ID (空间站 / 建筑)
pub type LocationId = i64;
/// 星系 ID
pub type SystemId = i64;
/// 角色 ID
pub type CharacterId = i64;
/// 技能等级 (0-5)
pub type SkillLevel = u8;

// ==========================================
// 技能 ID 常量 (SDE)
// ==========================================
pub mod skill_ids {
    use super::TypeId;

    /// 工业 (Industry)
    pub const INDUSTRY: TypeId = 3380;
    /// 高级工业 (Advanced Industry)
    pub const ADVANCED_INDUSTRY: TypeId = 3388;
    /// 大规模生产 (Mass Production)
    pub const MASS_PRODUCTION: TypeId = 3387;
    /// 高级大规模生产 (Advanced Mass Production)
    pub const ADVANCED_MASS_PRODUCTION: TypeId = 24625;
    /// 反应 (Reactions)
    pub const REACTIONS: TypeId = 45746;
    /// 大规模反应 (Mass Reactions)
    pub const MASS_REACTIONS: TypeId = 45748;
    /// 高级大规模反应 (Advanced Mass Reactions)
    pub const ADVANCED_MASS_REACTIONS: TypeId = 45749;
}

// ==========================================
// 活动类型 (Activity Kind)
// ==========================================
// 红线: 估算公式按活动类型分派,见 engine/estimator.rs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityKind {
    Manufacturing, // 制造
    Reaction,      // 反应
    Transport,     // 运输 (仅队列条目使用)
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivityKind::Manufacturing => write!(f, "MANUFACTURING"),
            ActivityKind::Reaction => write!(f, "REACTION"),
            ActivityKind::Transport => write!(f, "TRANSPORT"),
        }
    }
}

// ==========================================
// 安全等级 (Security Class)
// ==========================================
// 用途: 改装件加成的安全等级系数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SecurityClass {
    HighSec, // 高安 (>= 0.5)
    LowSec,  // 低安
    NullSec, // 零安 / 虫洞
}

impl SecurityClass {
    /// 改装件加成系数 (零安改装件效果最强)
    pub fn rig_multiplier(&self) -> f64 {
        match self {
            SecurityClass::HighSec => 1.0,
            SecurityClass::LowSec => 1.9,
            SecurityClass::NullSec => 2.1,
        }
    }
}

impl fmt::Display for SecurityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecurityClass::HighSec => write!(f, "HIGH_SEC"),
            SecurityClass::LowSec => write!(f, "LOW_SEC"),
            SecurityClass::NullSec => write!(f, "NULL_SEC"),
        }
    }
}

// ==========================================
// 建筑类型 (Structure Type)
// ==========================================
// 时间加成乘数来自游戏内建筑属性
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StructureType {
    Station, // NPC 空间站, 无加成
    Raitaru, // 中型工程复合体
    Azbel,   // 大型工程复合体
    Sotiyo,  // 超大型工程复合体
    Athanor, // 中型精炼厂
    Tatara,  // 大型精炼厂
}

impl StructureType {
    /// 制造/反应时间乘数 (1.0 = 无加成)
    pub fn time_multiplier(&self) -> f64 {
        match self {
            StructureType::Station => 1.0,
            StructureType::Raitaru => 0.85,
            StructureType::Azbel => 0.80,
            StructureType::Sotiyo => 0.70,
            StructureType::Athanor => 1.0,
            StructureType::Tatara => 0.75,
        }
    }
}

impl fmt::Display for StructureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StructureType::Station => write!(f, "STATION"),
            StructureType::Raitaru => write!(f, "RAITARU"),
            StructureType::Azbel => write!(f, "AZBEL"),
            StructureType::Sotiyo => write!(f, "SOTIYO"),
            StructureType::Athanor => write!(f, "ATHANOR"),
            StructureType::Tatara => write!(f, "TATARA"),
        }
    }
}

// ==========================================
// 改装件等级 (Rig Level)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RigLevel {
    None,
    T1,
    T2,
}

impl RigLevel {
    /// 基础时间加成 (未乘安全等级系数)
    fn base_time_bonus(&self) -> f64 {
        match self {
            RigLevel::None => 0.0,
            RigLevel::T1 => 0.20,
            RigLevel::T2 => 0.24,
        }
    }

    /// 时间乘数 = 1 - 基础加成 × 安全等级系数
    pub fn time_multiplier(&self, security: SecurityClass) -> f64 {
        1.0 - self.base_time_bonus() * security.rig_multiplier()
    }
}

impl fmt::Display for RigLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RigLevel::None => write!(f, "NONE"),
            RigLevel::T1 => write!(f, "T1"),
            RigLevel::T2 => write!(f, "T2"),
        }
    }
}

// ==========================================
// 运输履约模式 (Fulfillment Mode)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FulfillmentMode {
    SelfHaul, // 自行运输 (角色驾驶)
    Courier,  // 快递合同 (第三方)
}

impl fmt::Display for FulfillmentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FulfillmentMode::SelfHaul => write!(f, "SELF_HAUL"),
            FulfillmentMode::Courier => write!(f, "COURIER"),
        }
    }
}

// ==========================================
// 路线偏好 (Route Preference)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoutePreference {
    Shortest, // 最短
    Secure,   // 最安全
}

// ==========================================
// 作业状态 (Job Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Planned, // 已规划 (本系统唯一产出状态)
    Active,  // 进行中 (队列协作方回写)
    Done,    // 已完成
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Planned => write!(f, "PLANNED"),
            JobStatus::Active => write!(f, "ACTIVE"),
            JobStatus::Done => write!(f, "DONE"),
        }
    }
}

// ==========================================
// 跳过原因 (Skip Reason)
// ==========================================
// 红线: 所有跳过必须输出 reason (可解释性)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SkipReason {
    /// 蓝图数据未找到
    BlueprintDataNotFound,
    /// 祖先步骤已跳过 (整棵子树连带跳过)
    AncestorSkipped,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::BlueprintDataNotFound => write!(f, "BLUEPRINT_DATA_NOT_FOUND"),
            SkipReason::AncestorSkipped => write!(f, "ANCESTOR_SKIPPED"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rig_time_multiplier_scales_with_security() {
        // 高安 T1: 1 - 0.20 × 1.0 = 0.80
        assert!((RigLevel::T1.time_multiplier(SecurityClass::HighSec) - 0.80).abs() < 1e-9);
        // 零安 T1: 1 - 0.20 × 2.1 = 0.58
        assert!((RigLevel::T1.time_multiplier(SecurityClass::NullSec) - 0.58).abs() < 1e-9);
        // 无改装件不受安全等级影响
        assert!((RigLevel::None.time_multiplier(SecurityClass::NullSec) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_activity_kind_serde_screaming_snake() {
        let json = serde_json::to_string(&ActivityKind::Manufacturing).unwrap();
        assert_eq!(json, "\"MANUFACTURING\"");
        let back: ActivityKind = serde_json::from_str("\"REACTION\"").unwrap();
        assert_eq!(back, ActivityKind::Reaction);
    }
}
