// ==========================================
// EVE 工业规划系统 - 角色产能构建引擎
// ==========================================
// 职责: 角色技能 -> 每活动整数槽位产能
//   制造槽位 = 基础 1 + 大规模生产 + 高级大规模生产
//   反应槽位 = 基础 1 + 大规模反应 + 高级大规模反应
// 技能数据集中不存在的角色不进入候选池
// 在途作业数在模拟开始前扣除
// 红线: 产能池是显式传递的值, 禁止全局可变状态
// ==========================================

use crate::config::PlannerConfig;
use crate::domain::types::{skill_ids, ActivityKind, CharacterId};
use crate::domain::worker::CharacterSkills;
use crate::engine::snapshot::PlanningSnapshot;
use std::collections::BTreeMap;

// ==========================================
// SlotUsage - 单角色单活动槽位账目
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
struct SlotUsage {
    total: i32,      // 技能决定的总槽位
    inflight: i32,   // 在途作业占用 (本次调用期间不变)
    level_used: i32, // 本深度层已消耗 (层间回收)
}

impl SlotUsage {
    fn remaining(&self) -> i32 {
        (self.total - self.inflight - self.level_used).max(0)
    }
}

// ==========================================
// CapacityPool - 产能池
// ==========================================

/// 产能池: 候选角色的每活动槽位账目
///
/// BTreeMap 保证遍历顺序确定 (同分排序的最终决胜键是角色 ID)。
#[derive(Debug, Clone, Default)]
pub struct CapacityPool {
    entries: BTreeMap<CharacterId, BTreeMap<ActivityKind, SlotUsage>>,
}

impl CapacityPool {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 某角色某活动的剩余槽位
    pub fn remaining(&self, character: CharacterId, activity: ActivityKind) -> i32 {
        self.entries
            .get(&character)
            .and_then(|m| m.get(&activity))
            .map(|u| u.remaining())
            .unwrap_or(0)
    }

    /// 消耗一个槽位 (一个碎片 ≡ 一个并发作业)
    pub fn consume_slot(&mut self, character: CharacterId, activity: ActivityKind) {
        if let Some(u) = self
            .entries
            .get_mut(&character)
            .and_then(|m| m.get_mut(&activity))
        {
            u.level_used += 1;
        }
    }

    /// 深度层切换时回收本层消耗 (在途占用不回收)
    pub fn recycle_level(&mut self) {
        for usage in self.entries.values_mut().flat_map(|m| m.values_mut()) {
            usage.level_used = 0;
        }
    }

    /// 某活动的候选角色 (剩余槽位 > 0), 按角色 ID 升序
    pub fn eligible(&self, activity: ActivityKind) -> Vec<CharacterId> {
        self.entries
            .iter()
            .filter(|(_, m)| m.get(&activity).map(|u| u.remaining() > 0).unwrap_or(false))
            .map(|(&id, _)| id)
            .collect()
    }
}

// ==========================================
// CapacityBuilder - 产能构建引擎
// ==========================================
pub struct CapacityBuilder {
    config: PlannerConfig,
}

impl CapacityBuilder {
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    /// 从技能快照构建产能池 (在途作业已扣除)
    ///
    /// 只有出现在技能数据集中的角色才进入池子;
    /// 有技能记录但槽位技能为 0 的角色仍有基础槽位。
    pub fn build(&self, snapshot: &PlanningSnapshot) -> CapacityPool {
        let mut pool = CapacityPool::default();
        for (&character_id, skills) in &snapshot.skills {
            let mut per_activity = BTreeMap::new();
            for activity in [ActivityKind::Manufacturing, ActivityKind::Reaction] {
                per_activity.insert(
                    activity,
                    SlotUsage {
                        total: self.slots_for(skills, activity),
                        inflight: snapshot.inflight(character_id, activity),
                        level_used: 0,
                    },
                );
            }
            pool.entries.insert(character_id, per_activity);
        }
        pool
    }

    /// 技能 -> 槽位数
    fn slots_for(&self, skills: &CharacterSkills, activity: ActivityKind) -> i32 {
        let base = self.config.base_slots_per_activity;
        match activity {
            ActivityKind::Manufacturing => {
                base + i32::from(skills.level(skill_ids::MASS_PRODUCTION))
                    + i32::from(skills.level(skill_ids::ADVANCED_MASS_PRODUCTION))
            }
            ActivityKind::Reaction => {
                base + i32::from(skills.level(skill_ids::MASS_REACTIONS))
                    + i32::from(skills.level(skill_ids::ADVANCED_MASS_REACTIONS))
            }
            ActivityKind::Transport => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot_with(
        skills: Vec<CharacterSkills>,
        inflight: Vec<((CharacterId, ActivityKind), i32)>,
    ) -> PlanningSnapshot {
        let mut snap = PlanningSnapshot::default();
        for s in skills {
            snap.skills.insert(s.character_id, s);
        }
        snap.inflight_jobs = inflight.into_iter().collect();
        snap
    }

    #[test]
    fn test_zero_slot_skills_still_base_capacity() {
        // 工业 5 级但无大规模生产 => 制造槽位 = 1
        let snap = snapshot_with(
            vec![CharacterSkills::new(1001).with_skill(skill_ids::INDUSTRY, 5)],
            vec![],
        );
        let pool = CapacityBuilder::new(PlannerConfig::default()).build(&snap);
        assert_eq!(pool.remaining(1001, ActivityKind::Manufacturing), 1);
        assert_eq!(pool.remaining(1001, ActivityKind::Reaction), 1);
    }

    #[test]
    fn test_slot_skills_add_capacity() {
        let snap = snapshot_with(
            vec![CharacterSkills::new(1001)
                .with_skill(skill_ids::MASS_PRODUCTION, 5)
                .with_skill(skill_ids::ADVANCED_MASS_PRODUCTION, 3)
                .with_skill(skill_ids::MASS_REACTIONS, 4)],
            vec![],
        );
        let pool = CapacityBuilder::new(PlannerConfig::default()).build(&snap);
        assert_eq!(pool.remaining(1001, ActivityKind::Manufacturing), 9);
        assert_eq!(pool.remaining(1001, ActivityKind::Reaction), 5);
    }

    #[test]
    fn test_inflight_jobs_subtracted() {
        let snap = snapshot_with(
            vec![CharacterSkills::new(1001).with_skill(skill_ids::MASS_PRODUCTION, 2)],
            vec![((1001, ActivityKind::Manufacturing), 3)],
        );
        let pool = CapacityBuilder::new(PlannerConfig::default()).build(&snap);
        // 1 + 2 - 3 = 0
        assert_eq!(pool.remaining(1001, ActivityKind::Manufacturing), 0);
        assert!(pool.eligible(ActivityKind::Manufacturing).is_empty());
    }

    #[test]
    fn test_absent_character_excluded() {
        let snap = snapshot_with(vec![], vec![]);
        let pool = CapacityBuilder::new(PlannerConfig::default()).build(&snap);
        assert_eq!(pool.remaining(9999, ActivityKind::Manufacturing), 0);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_recycle_level_restores_level_usage_only() {
        let snap = snapshot_with(
            vec![CharacterSkills::new(1001).with_skill(skill_ids::MASS_PRODUCTION, 1)],
            vec![((1001, ActivityKind::Manufacturing), 1)],
        );
        let mut pool = CapacityBuilder::new(PlannerConfig::default()).build(&snap);
        assert_eq!(pool.remaining(1001, ActivityKind::Manufacturing), 1);

        pool.consume_slot(1001, ActivityKind::Manufacturing);
        assert_eq!(pool.remaining(1001, ActivityKind::Manufacturing), 0);

        pool.recycle_level();
        // 层消耗回收, 在途占用保持扣除
        assert_eq!(pool.remaining(1001, ActivityKind::Manufacturing), 1);
    }
}
