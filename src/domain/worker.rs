// ==========================================
// EVE 工业规划系统 - 角色与运输配置领域模型
// ==========================================
// 角色 = 并行执行作业的工人槽位载体
// 产能构建规则见 engine/capacity.rs
// ==========================================

use crate::domain::types::{CharacterId, SkillLevel, TypeId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ==========================================
// CharacterSkills - 角色技能快照
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterSkills {
    pub character_id: CharacterId,
    /// skill_id -> 等级 (0-5)
    pub levels: HashMap<TypeId, SkillLevel>,
}

impl CharacterSkills {
    pub fn new(character_id: CharacterId) -> Self {
        Self {
            character_id,
            levels: HashMap::new(),
        }
    }

    pub fn with_skill(mut self, skill_id: TypeId, level: SkillLevel) -> Self {
        self.levels.insert(skill_id, level);
        self
    }

    /// 技能等级, 未训练视为 0
    pub fn level(&self, skill_id: TypeId) -> SkillLevel {
        self.levels.get(&skill_id).copied().unwrap_or(0)
    }
}

// ==========================================
// TransportProfile - 自运运输配置
// ==========================================
// 自运履约模式的成本参数; 快递合同不使用
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportProfile {
    pub profile_id: i64,
    pub character_id: Option<CharacterId>, // 驾驶角色
    pub cargo_capacity_m3: f64,            // 货舱容量
    pub rate_per_m3_jump: f64,             // 每 m³ 每跳运费
    /// 跳货船燃料: (燃料类型, 每跳消耗量); 普通货船为 None
    pub fuel_per_jump: Option<(TypeId, i64)>,
}
