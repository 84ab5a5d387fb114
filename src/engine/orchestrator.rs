// ==========================================
// EVE 工业规划系统 - 规划编排器
// ==========================================
// 职责: 协调数量传播 / 成本估算 / 指派模拟 / 运输批处理的执行顺序
// 数据流: 批量预取快照 -> 纯计算 -> 后序落库 -> 运输落库
// 红线: 并行度 0 时不触碰技能与队列在途数据
// 红线: 子步骤作业先于父步骤提交 (下游需要子记录 ID)
// ==========================================

use crate::config::PlannerConfig;
use crate::domain::job::{JobRecord, SkippedStep, TransportJobRecord};
use crate::domain::plan::{Plan, PlanRun, PlanStep};
use crate::domain::recipe::StepTree;
use crate::domain::types::{
    skill_ids, ActivityKind, CharacterId, FulfillmentMode, LocationId, TypeId,
};
use crate::engine::assignment::{AssignmentSimulator, StepAssignment, StepWorkload};
use crate::engine::capacity::{CapacityBuilder, CapacityPool};
use crate::engine::error::{PlannerError, PlannerResult};
use crate::engine::estimator::{CostDurationEstimator, EstimatorSkills, StepEstimate};
use crate::engine::quantity::{PropagationResult, QuantityPropagator, ResolvedStep};
use crate::engine::snapshot::PlanningSnapshot;
use crate::engine::transport::TransportBatcher;
use crate::repository::traits::{
    BlueprintRepository, CostIndexRepository, JobQueueRepository, MarketPriceRepository,
    RouteRepository, SkillRepository, TransportProfileRepository,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, info};

// ==========================================
// PlannerRepositories - 协作方仓储集合
// ==========================================
// 把 7 个仓储参数合并为 1 个结构体参数, 简化依赖注入
#[derive(Clone)]
pub struct PlannerRepositories {
    pub blueprint_repo: Arc<dyn BlueprintRepository>,
    pub price_repo: Arc<dyn MarketPriceRepository>,
    pub cost_index_repo: Arc<dyn CostIndexRepository>,
    pub skill_repo: Arc<dyn SkillRepository>,
    pub queue_repo: Arc<dyn JobQueueRepository>,
    pub route_repo: Arc<dyn RouteRepository>,
    pub transport_profile_repo: Arc<dyn TransportProfileRepository>,
}

// ==========================================
// 结果结构
// ==========================================

/// 一次规划调用的结构化结果: 成功与跳过并存
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanExecutionResult {
    pub jobs: Vec<JobRecord>,
    pub skipped: Vec<SkippedStep>,
    pub transport_jobs: Vec<TransportJobRecord>,
}

/// 单角色负载 (预览)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterLoad {
    pub character_id: Option<CharacterId>, // None = 未指派泳道
    pub job_count: usize,
    pub total_runs: i64,
    pub busy_secs: i64,
}

/// 一档并行度的预览
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParallelismOption {
    pub parallelism: u32,
    pub estimated_wall_clock_secs: i64,
    pub assignments: Vec<CharacterLoad>,
}

/// 提交前预览: 候选角色数 + 各并行度档位的预计总时长与指派
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanPreview {
    pub eligible_characters: usize,
    pub options: Vec<ParallelismOption>,
}

// ==========================================
// PlanOrchestrator - 规划编排器
// ==========================================
pub struct PlanOrchestrator {
    repos: PlannerRepositories,
    propagator: QuantityPropagator,
    estimator: CostDurationEstimator,
    capacity_builder: CapacityBuilder,
    simulator: AssignmentSimulator,
    batcher: TransportBatcher,
}

impl PlanOrchestrator {
    pub fn new(config: PlannerConfig, repos: PlannerRepositories) -> Self {
        Self {
            propagator: QuantityPropagator::new(),
            estimator: CostDurationEstimator::new(config.clone()),
            capacity_builder: CapacityBuilder::new(config.clone()),
            simulator: AssignmentSimulator::new(config),
            batcher: TransportBatcher::new(),
            repos,
        }
    }

    /// 执行完整规划流程并落库
    ///
    /// # 参数
    /// - plan / steps: 目标计划及其步骤 (规划期间只读)
    /// - run: 执行请求 (目标数量 + 并行度)
    /// - characters: 并行模拟的候选角色集合
    pub async fn execute_plan_run(
        &self,
        plan: &Plan,
        steps: Vec<PlanStep>,
        run: &PlanRun,
        characters: &[CharacterId],
    ) -> PlannerResult<PlanExecutionResult> {
        if run.quantity <= 0 {
            return Err(PlannerError::InvalidQuantity(run.quantity));
        }
        let tree = StepTree::build(&plan.plan_id, steps)?;
        info!(
            plan_id = %plan.plan_id,
            quantity = run.quantity,
            parallelism = run.parallelism,
            step_count = tree.len(),
            "开始执行规划流程"
        );

        // ==========================================
        // 步骤1: 批量预取快照 (并行度 0 时不取技能/在途)
        // ==========================================
        let snapshot = self
            .build_snapshot(plan, &tree, characters, run.parallelism > 0)
            .await?;

        // ==========================================
        // 步骤2: 数量传播 (后序输出)
        // ==========================================
        let propagation = self.propagator.propagate(&tree, &snapshot, run.quantity)?;
        debug!(
            resolved = propagation.resolved.len(),
            skipped = propagation.skipped.len(),
            "数量传播完成"
        );

        // ==========================================
        // 步骤3: 指派模拟 (产能池显式传递)
        // ==========================================
        let mut pool = if run.parallelism > 0 {
            self.capacity_builder.build(&snapshot)
        } else {
            CapacityPool::default()
        };
        let workloads = Self::workloads(&tree, &propagation.resolved);
        let assignments =
            self.simulator
                .simulate(&workloads, &mut pool, &snapshot, run.parallelism);

        // ==========================================
        // 步骤4: 估算 + 作业物化 (后序落库, 子先于父)
        // ==========================================
        let mut jobs = Vec::new();
        for (resolved, assignment) in propagation.resolved.iter().zip(assignments.iter()) {
            debug_assert_eq!(resolved.step_index, assignment.step_index);
            let step = tree.step(resolved.step_index);
            for fragment in &assignment.fragments {
                let job = self.materialize_fragment(
                    plan,
                    step,
                    &snapshot,
                    fragment.character_id,
                    fragment.runs,
                );
                let persisted = self.repos.queue_repo.create_job(&job).await?;
                jobs.push(persisted);
            }
        }

        // ==========================================
        // 步骤5: 运输批处理 (策略未配置则关闭)
        // ==========================================
        let mut transport_jobs = Vec::new();
        if let Some(policy) = &plan.transport_policy {
            let batched = self
                .batcher
                .batch(
                    plan,
                    policy,
                    &tree,
                    &propagation.resolved,
                    &snapshot,
                    self.repos.route_repo.as_ref(),
                    Utc::now().naive_utc(),
                )
                .await?;
            for mut record in batched {
                // 对应的队列条目: activity = TRANSPORT, 以运输作业 ID 作为来源引用
                let mut queue_entry = JobRecord::new_planned(
                    &plan.plan_id,
                    &record.transport_job_id,
                    0,
                    ActivityKind::Transport,
                    1,
                    Utc::now().naive_utc(),
                );
                queue_entry.estimated_cost_isk = record.estimated_cost_isk;
                let persisted_entry = self.repos.queue_repo.create_job(&queue_entry).await?;
                record.linked_job_id = Some(persisted_entry.job_id.clone());
                let persisted = self.repos.queue_repo.create_transport_job(&record).await?;
                jobs.push(persisted_entry);
                transport_jobs.push(persisted);
            }
        }

        info!(
            plan_id = %plan.plan_id,
            job_count = jobs.len(),
            skipped_count = propagation.skipped.len(),
            transport_count = transport_jobs.len(),
            "规划流程完成"
        );
        Ok(PlanExecutionResult {
            jobs,
            skipped: propagation.skipped,
            transport_jobs,
        })
    }

    /// 提交前预览: 不落库, 给出各并行度档位的预计总时长与角色负载
    pub async fn preview(
        &self,
        plan: &Plan,
        steps: Vec<PlanStep>,
        quantity: i64,
        characters: &[CharacterId],
    ) -> PlannerResult<PlanPreview> {
        if quantity <= 0 {
            return Err(PlannerError::InvalidQuantity(quantity));
        }
        let tree = StepTree::build(&plan.plan_id, steps)?;
        let snapshot = self.build_snapshot(plan, &tree, characters, true).await?;
        let propagation = self.propagator.propagate(&tree, &snapshot, quantity)?;
        let workloads = Self::workloads(&tree, &propagation.resolved);

        let base_pool = self.capacity_builder.build(&snapshot);
        let activities: Vec<ActivityKind> = {
            let mut v: Vec<ActivityKind> = workloads.iter().map(|w| w.activity).collect();
            v.sort();
            v.dedup();
            v
        };
        let eligible_characters = characters
            .iter()
            .filter(|&&c| {
                activities
                    .iter()
                    .any(|&a| base_pool.remaining(c, a) > 0)
            })
            .count();

        let mut options = Vec::new();
        for parallelism in 1..=eligible_characters.max(1) as u32 {
            let mut pool = base_pool.clone();
            let assignments =
                self.simulator
                    .simulate(&workloads, &mut pool, &snapshot, parallelism);
            let (wall_clock, loads) =
                self.summarize(&tree, &propagation, &workloads, &assignments, &snapshot);
            options.push(ParallelismOption {
                parallelism,
                estimated_wall_clock_secs: wall_clock,
                assignments: loads,
            });
        }

        Ok(PlanPreview {
            eligible_characters,
            options,
        })
    }

    // ==========================================
    // 内部: 快照预取
    // ==========================================
    async fn build_snapshot(
        &self,
        plan: &Plan,
        tree: &StepTree,
        characters: &[CharacterId],
        with_workforce: bool,
    ) -> PlannerResult<PlanningSnapshot> {
        let mut snapshot = PlanningSnapshot::default();

        // 配方: 整棵树一次取齐
        let mut recipe_keys: Vec<(TypeId, ActivityKind)> = (0..tree.len())
            .map(|i| {
                let s = tree.step(i);
                (s.product_type_id, s.activity)
            })
            .collect();
        recipe_keys.sort();
        recipe_keys.dedup();
        snapshot.recipes = self.repos.blueprint_repo.find_recipes(&recipe_keys).await?;

        // 运输配置 (自运履约必须可解析, 燃料类型参与价格预取)
        let mut fuel_type: Option<TypeId> = None;
        if let Some(policy) = &plan.transport_policy {
            if policy.fulfillment == FulfillmentMode::SelfHaul {
                let profile_id =
                    policy
                        .transport_profile_id
                        .ok_or(PlannerError::MissingTransportProfile { profile_id: None })?;
                let profile = self
                    .repos
                    .transport_profile_repo
                    .find_profile(profile_id)
                    .await?
                    .ok_or(PlannerError::MissingTransportProfile {
                        profile_id: Some(profile_id),
                    })?;
                fuel_type = profile.fuel_per_jump.map(|(t, _)| t);
                snapshot.transport_profile = Some(profile);
            }
        }

        // 价格: 产物 + 全部材料 + 燃料
        let mut price_ids: Vec<TypeId> = snapshot
            .recipes
            .values()
            .flat_map(|r| {
                r.materials
                    .iter()
                    .map(|m| m.type_id)
                    .chain(std::iter::once(r.product_type_id))
            })
            .chain(fuel_type)
            .collect();
        price_ids.sort_unstable();
        price_ids.dedup();
        let (market, adjusted) = futures::try_join!(
            self.repos.price_repo.load_market_prices(&price_ids),
            self.repos.price_repo.load_adjusted_prices(&price_ids),
        )?;
        snapshot.market_prices = market;
        snapshot.adjusted_prices = adjusted;

        // 成本指数: 每步骤解析位置 × 活动
        let mut index_keys: Vec<(LocationId, ActivityKind)> = (0..tree.len())
            .filter_map(|i| {
                let s = tree.step(i);
                s.resolved_location(plan).map(|loc| (loc, s.activity))
            })
            .collect();
        index_keys.sort();
        index_keys.dedup();
        snapshot.cost_indices = self
            .repos
            .cost_index_repo
            .load_cost_indices(&index_keys)
            .await?;

        // 位置 -> 星系 (运输启用时)
        if plan.transport_enabled() {
            let mut locations: Vec<LocationId> = (0..tree.len())
                .filter_map(|i| tree.step(i).resolved_location(plan))
                .chain(plan.source_location_id)
                .collect();
            locations.sort_unstable();
            locations.dedup();
            snapshot.location_systems =
                self.repos.route_repo.resolve_systems(&locations).await?;
        }

        // 技能 + 在途: 仅并行模拟需要
        if with_workforce && !characters.is_empty() {
            let (skills, inflight) = futures::try_join!(
                self.repos.skill_repo.load_skills(characters),
                self.repos.queue_repo.load_inflight_counts(characters),
            )?;
            snapshot.skills = skills;
            snapshot.inflight_jobs = inflight;
        }

        Ok(snapshot)
    }

    // ==========================================
    // 内部: 工作量与物化
    // ==========================================

    fn workloads(tree: &StepTree, resolved: &[ResolvedStep]) -> Vec<StepWorkload> {
        resolved
            .iter()
            .map(|r| {
                let step = tree.step(r.step_index);
                StepWorkload {
                    step_index: r.step_index,
                    step_id: step.step_id.clone(),
                    activity: step.activity,
                    runs: r.runs,
                    depth: r.depth,
                }
            })
            .collect()
    }

    /// 碎片 -> 作业记录 (成本/时长随指派角色技能估算)
    fn materialize_fragment(
        &self,
        plan: &Plan,
        step: &PlanStep,
        snapshot: &PlanningSnapshot,
        character_id: Option<CharacterId>,
        runs: i64,
    ) -> JobRecord {
        let estimate = self.estimate_step(plan, step, snapshot, character_id);
        let mut job = JobRecord::new_planned(
            &plan.plan_id,
            &step.step_id,
            step.product_type_id,
            step.activity,
            runs,
            Utc::now().naive_utc(),
        );
        job.assigned_character_id = character_id;
        job.output_location_id = step.resolved_location(plan);
        job.estimated_cost_isk = estimate.cost_per_run_isk * runs as f64;
        job.estimated_duration_secs = estimate.duration_per_run_secs * runs;
        job
    }

    fn estimate_step(
        &self,
        plan: &Plan,
        step: &PlanStep,
        snapshot: &PlanningSnapshot,
        character_id: Option<CharacterId>,
    ) -> StepEstimate {
        let recipe = snapshot
            .recipe(step.product_type_id, step.activity)
            .expect("已解析步骤必有配方");
        let skills = Self::estimator_skills(snapshot, step.activity, character_id);
        let cost_index = snapshot.cost_index(step.resolved_location(plan), step.activity);
        self.estimator
            .estimate(step, recipe, skills, cost_index, snapshot)
    }

    /// 估算技能输入: 反应步骤把反应技能装进"工业等级"字段
    fn estimator_skills(
        snapshot: &PlanningSnapshot,
        activity: ActivityKind,
        character_id: Option<CharacterId>,
    ) -> EstimatorSkills {
        let Some(skills) = character_id.and_then(|id| snapshot.skills.get(&id)) else {
            return EstimatorSkills::default();
        };
        match activity {
            ActivityKind::Manufacturing => EstimatorSkills {
                industry_level: skills.level(skill_ids::INDUSTRY),
                advanced_industry_level: skills.level(skill_ids::ADVANCED_INDUSTRY),
            },
            ActivityKind::Reaction => EstimatorSkills {
                industry_level: skills.level(skill_ids::REACTIONS),
                advanced_industry_level: 0,
            },
            ActivityKind::Transport => EstimatorSkills::default(),
        }
    }

    // ==========================================
    // 内部: 预览汇总
    // ==========================================

    /// 总时长模型: 层内角色并行 (角色内碎片串行, 未指派合为一条泳道),
    /// 层间串行 (与槽位层间回收规则一致)
    fn summarize(
        &self,
        tree: &StepTree,
        propagation: &PropagationResult,
        workloads: &[StepWorkload],
        assignments: &[StepAssignment],
        snapshot: &PlanningSnapshot,
    ) -> (i64, Vec<CharacterLoad>) {
        // depth -> 泳道 -> 忙时
        let mut level_lanes: BTreeMap<u32, HashMap<Option<CharacterId>, i64>> = BTreeMap::new();
        let mut loads: BTreeMap<Option<CharacterId>, CharacterLoad> = BTreeMap::new();

        for (resolved, assignment) in propagation.resolved.iter().zip(assignments.iter()) {
            let step = tree.step(resolved.step_index);
            let workload = workloads
                .iter()
                .find(|w| w.step_index == resolved.step_index)
                .expect("工作量与解析步骤一一对应");
            for fragment in &assignment.fragments {
                let skills =
                    Self::estimator_skills(snapshot, step.activity, fragment.character_id);
                let recipe = snapshot
                    .recipe(step.product_type_id, step.activity)
                    .expect("已解析步骤必有配方");
                // 预览只关心时长, 成本指数取 0 即可
                let estimate = self.estimator.estimate(step, recipe, skills, 0.0, snapshot);
                let busy = estimate.duration_per_run_secs * fragment.runs;

                *level_lanes
                    .entry(workload.depth)
                    .or_default()
                    .entry(fragment.character_id)
                    .or_insert(0) += busy;

                let load = loads
                    .entry(fragment.character_id)
                    .or_insert_with(|| CharacterLoad {
                        character_id: fragment.character_id,
                        job_count: 0,
                        total_runs: 0,
                        busy_secs: 0,
                    });
                load.job_count += 1;
                load.total_runs += fragment.runs;
                load.busy_secs += busy;
            }
        }

        let wall_clock = level_lanes
            .values()
            .map(|lanes| lanes.values().copied().max().unwrap_or(0))
            .sum();
        (wall_clock, loads.into_values().collect())
    }
}
