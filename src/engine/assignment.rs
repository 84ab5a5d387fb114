// ==========================================
// EVE 工业规划系统 - 作业指派模拟引擎
// ==========================================
// 职责: 把 (步骤, 轮数) 按并行度拆分到角色槽位
// 红线: 每步骤碎片轮数之和 == 步骤总轮数, 无论指派是否成功
// 红线: 无候选角色 = 单个未指派碎片, 禁止静默丢弃
// 槽位消耗在深度层之间回收 (层内兄弟竞争同一池)
// 排序: 质量分降序 -> 剩余槽位降序 -> 角色 ID 升序 (确定性)
// ==========================================

use crate::config::PlannerConfig;
use crate::domain::types::{skill_ids, ActivityKind, CharacterId};
use crate::engine::capacity::CapacityPool;
use crate::engine::quantity::ceil_div;
use crate::engine::snapshot::PlanningSnapshot;
use tracing::debug;

// ==========================================
// StepWorkload / Fragment - 输入输出
// ==========================================

/// 指派输入: 一个已解析步骤的工作量
#[derive(Debug, Clone)]
pub struct StepWorkload {
    pub step_index: usize,
    pub step_id: String,
    pub activity: ActivityKind,
    pub runs: i64,
    pub depth: u32,
}

/// 一个碎片: 步骤轮数中指派给一个角色 (或未指派) 的部分
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fragment {
    pub character_id: Option<CharacterId>,
    pub runs: i64,
}

/// 单步骤指派结果
#[derive(Debug, Clone)]
pub struct StepAssignment {
    pub step_index: usize,
    pub fragments: Vec<Fragment>,
}

impl StepAssignment {
    pub fn total_runs(&self) -> i64 {
        self.fragments.iter().map(|f| f.runs).sum()
    }
}

// ==========================================
// AssignmentSimulator - 指派模拟引擎
// ==========================================
pub struct AssignmentSimulator {
    config: PlannerConfig,
}

impl AssignmentSimulator {
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    /// 模拟指派
    ///
    /// 并行度 0: 每步骤一个未指派碎片, 不触碰产能池与技能数据。
    /// 其余: 深度大的层先处理 (子先于父), 层切换时回收层内槽位消耗。
    pub fn simulate(
        &self,
        workloads: &[StepWorkload],
        pool: &mut CapacityPool,
        snapshot: &PlanningSnapshot,
        parallelism: u32,
    ) -> Vec<StepAssignment> {
        if parallelism == 0 {
            return workloads
                .iter()
                .map(|w| StepAssignment {
                    step_index: w.step_index,
                    fragments: vec![Fragment {
                        character_id: None,
                        runs: w.runs,
                    }],
                })
                .collect();
        }

        // 深度降序分组 (后序输入已经子先于父, 这里仍显式排序保证分层)
        let mut ordered: Vec<&StepWorkload> = workloads.iter().collect();
        ordered.sort_by(|a, b| b.depth.cmp(&a.depth));

        let mut assignments = Vec::with_capacity(workloads.len());
        let mut current_depth: Option<u32> = None;

        for workload in ordered {
            if current_depth != Some(workload.depth) {
                if current_depth.is_some() {
                    // 深度层切换: 子层消耗的槽位归还共享池
                    pool.recycle_level();
                }
                current_depth = Some(workload.depth);
            }
            assignments.push(self.assign_step(workload, pool, snapshot, parallelism));
        }

        // 输出顺序还原为输入顺序 (后序), 便于与作业物化对齐
        assignments.sort_by_key(|a| {
            workloads
                .iter()
                .position(|w| w.step_index == a.step_index)
                .unwrap_or(usize::MAX)
        });
        assignments
    }

    /// 单步骤指派: 选角色, 均衡拆分, 扣槽位
    fn assign_step(
        &self,
        workload: &StepWorkload,
        pool: &mut CapacityPool,
        snapshot: &PlanningSnapshot,
        parallelism: u32,
    ) -> StepAssignment {
        let mut candidates = pool.eligible(workload.activity);
        // 质量分降序 -> 剩余槽位降序 -> 角色 ID 升序
        candidates.sort_by(|&a, &b| {
            let score_a = self.quality_score(snapshot, a, workload.activity);
            let score_b = self.quality_score(snapshot, b, workload.activity);
            score_b
                .cmp(&score_a)
                .then_with(|| {
                    pool.remaining(b, workload.activity)
                        .cmp(&pool.remaining(a, workload.activity))
                })
                .then_with(|| a.cmp(&b))
        });

        // 碎片数不超过轮数: 1 轮不拆给 2 人, 零轮碎片白占槽位
        let chosen_count = candidates
            .len()
            .min(parallelism as usize)
            .min(workload.runs.max(0) as usize);
        if chosen_count == 0 {
            // 无候选 (或零轮数): 未指派碎片, 仍然产出作业记录
            debug!(step_id = %workload.step_id, runs = workload.runs, "无候选角色, 记未指派碎片");
            return StepAssignment {
                step_index: workload.step_index,
                fragments: vec![Fragment {
                    character_id: None,
                    runs: workload.runs,
                }],
            };
        }

        // 均衡 ceil 拆分: 排名靠前的角色拿到不小于后者的碎片
        let mut fragments = Vec::with_capacity(chosen_count);
        let mut remaining_runs = workload.runs;
        for (i, &character_id) in candidates.iter().take(chosen_count).enumerate() {
            let lanes_left = (chosen_count - i) as i64;
            let size = ceil_div(remaining_runs, lanes_left);
            remaining_runs -= size;
            pool.consume_slot(character_id, workload.activity);
            fragments.push(Fragment {
                character_id: Some(character_id),
                runs: size,
            });
        }
        debug_assert_eq!(remaining_runs, 0);

        StepAssignment {
            step_index: workload.step_index,
            fragments,
        }
    }

    /// 角色质量分: 活动主技能加权, 制造叠加高级工业
    fn quality_score(
        &self,
        snapshot: &PlanningSnapshot,
        character_id: CharacterId,
        activity: ActivityKind,
    ) -> i64 {
        let Some(skills) = snapshot.skills.get(&character_id) else {
            return 0;
        };
        match activity {
            ActivityKind::Manufacturing => {
                self.config.quality_primary_skill_weight
                    * i64::from(skills.level(skill_ids::INDUSTRY))
                    + self.config.quality_advanced_industry_weight
                        * i64::from(skills.level(skill_ids::ADVANCED_INDUSTRY))
            }
            ActivityKind::Reaction => {
                self.config.quality_primary_skill_weight
                    * i64::from(skills.level(skill_ids::REACTIONS))
            }
            ActivityKind::Transport => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::capacity::CapacityBuilder;
    use crate::domain::worker::CharacterSkills;

    fn workload(step_index: usize, runs: i64, depth: u32) -> StepWorkload {
        StepWorkload {
            step_index,
            step_id: format!("S{step_index}"),
            activity: ActivityKind::Manufacturing,
            runs,
            depth,
        }
    }

    fn snapshot_two_characters() -> PlanningSnapshot {
        let mut snap = PlanningSnapshot::default();
        // A (1001) 技能优于 B (1002)
        snap.skills.insert(
            1001,
            CharacterSkills::new(1001)
                .with_skill(skill_ids::INDUSTRY, 5)
                .with_skill(skill_ids::MASS_PRODUCTION, 5),
        );
        snap.skills.insert(
            1002,
            CharacterSkills::new(1002)
                .with_skill(skill_ids::INDUSTRY, 3)
                .with_skill(skill_ids::MASS_PRODUCTION, 5),
        );
        snap
    }

    #[test]
    fn test_parallelism_zero_single_unassigned_fragment() {
        let sim = AssignmentSimulator::new(PlannerConfig::default());
        let mut pool = CapacityPool::default();
        let snap = PlanningSnapshot::default();

        let out = sim.simulate(&[workload(0, 10, 0)], &mut pool, &snap, 0);
        assert_eq!(out.len(), 1);
        assert_eq!(
            out[0].fragments,
            vec![Fragment {
                character_id: None,
                runs: 10
            }]
        );
    }

    #[test]
    fn test_two_workers_split_ranked_first_gets_larger() {
        let snap = snapshot_two_characters();
        let sim = AssignmentSimulator::new(PlannerConfig::default());
        let mut pool = CapacityBuilder::new(PlannerConfig::default()).build(&snap);

        let out = sim.simulate(&[workload(0, 10, 0)], &mut pool, &snap, 2);
        assert_eq!(out[0].fragments.len(), 2);
        assert_eq!(out[0].total_runs(), 10);
        // A 排名在前, 碎片不小于 B
        assert_eq!(out[0].fragments[0].character_id, Some(1001));
        assert!(out[0].fragments[0].runs >= out[0].fragments[1].runs);
    }

    #[test]
    fn test_uneven_split_sums_exactly() {
        let snap = snapshot_two_characters();
        let sim = AssignmentSimulator::new(PlannerConfig::default());
        let mut pool = CapacityBuilder::new(PlannerConfig::default()).build(&snap);

        let out = sim.simulate(&[workload(0, 7, 0)], &mut pool, &snap, 2);
        let runs: Vec<i64> = out[0].fragments.iter().map(|f| f.runs).collect();
        assert_eq!(runs, vec![4, 3]);
    }

    #[test]
    fn test_no_eligible_worker_yields_unassigned() {
        let snap = snapshot_two_characters();
        let sim = AssignmentSimulator::new(PlannerConfig::default());
        // 空池: 没有任何角色产能
        let mut pool = CapacityPool::default();

        let out = sim.simulate(&[workload(0, 5, 0)], &mut pool, &snap, 3);
        assert_eq!(
            out[0].fragments,
            vec![Fragment {
                character_id: None,
                runs: 5
            }]
        );
    }

    #[test]
    fn test_siblings_compete_within_level_and_recycle_across_levels() {
        // A 制造槽位 = 1 + 5 = 6, B = 6; 但给两人都只留 1 槽以便观察竞争
        let mut snap = PlanningSnapshot::default();
        snap.skills
            .insert(1001, CharacterSkills::new(1001).with_skill(skill_ids::INDUSTRY, 5));
        snap.skills
            .insert(1002, CharacterSkills::new(1002).with_skill(skill_ids::INDUSTRY, 3));

        let sim = AssignmentSimulator::new(PlannerConfig::default());
        let mut pool = CapacityBuilder::new(PlannerConfig::default()).build(&snap);

        // 深度 1 的两个兄弟步骤 + 深度 0 的父步骤
        let loads = vec![workload(2, 4, 1), workload(1, 4, 1), workload(0, 4, 0)];
        let out = sim.simulate(&loads, &mut pool, &snap, 2);

        let by_index = |idx: usize| out.iter().find(|a| a.step_index == idx).unwrap();

        // 层内: 第一个兄弟拿走 A+B 各 1 槽, 第二个兄弟无候选 -> 未指派
        let first_sibling = by_index(2);
        assert_eq!(first_sibling.fragments.len(), 2);
        let second_sibling = by_index(1);
        assert_eq!(second_sibling.fragments[0].character_id, None);

        // 层间回收: 父步骤重新拿到两个角色
        let parent = by_index(0);
        assert_eq!(parent.fragments.len(), 2);
        assert_eq!(parent.total_runs(), 4);
    }

    #[test]
    fn test_fragment_sum_invariant_across_parallelism() {
        let snap = snapshot_two_characters();
        let sim = AssignmentSimulator::new(PlannerConfig::default());
        for p in 0..=4u32 {
            let mut pool = CapacityBuilder::new(PlannerConfig::default()).build(&snap);
            let out = sim.simulate(&[workload(0, 13, 0)], &mut pool, &snap, p);
            assert_eq!(out[0].total_runs(), 13, "并行度 {p} 下轮数不守恒");
        }
    }
}
