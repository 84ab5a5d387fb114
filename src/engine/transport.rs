// ==========================================
// EVE 工业规划系统 - 运输批处理引擎
// ==========================================
// 职责: 作业指派完成后, 检出跨位置的材料流转并按路线合并为运输作业
// 红线: 按 (起点, 终点) 合并, 一条路线一条记录, 禁止按材料逐条开运输
// 起点 == 终点不开运输; 计划未配置运输策略则整体关闭
// 自运: 路线仓储查跳数 + 运输配置算费; 快递: 体积费 + 抵押费, 不查路线
// ==========================================

use crate::domain::job::{TransportItem, TransportJobRecord};
use crate::domain::plan::{Plan, TransportPolicy};
use crate::domain::recipe::StepTree;
use crate::domain::types::{FulfillmentMode, LocationId, TypeId};
use crate::engine::error::{PlannerError, PlannerResult};
use crate::engine::quantity::ResolvedStep;
use crate::engine::snapshot::PlanningSnapshot;
use crate::repository::error::RepositoryError;
use crate::repository::traits::RouteRepository;
use chrono::NaiveDateTime;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};
use uuid::Uuid;

// ==========================================
// TransportBatcher - 运输批处理引擎
// ==========================================
pub struct TransportBatcher;

impl TransportBatcher {
    pub fn new() -> Self {
        Self
    }

    /// 批处理跨位置材料流转
    ///
    /// 每个消费步骤的每条材料: 生产子步骤存在则起点为其产出位置,
    /// 否则为计划的外购采购位置 (未设置则不生成流转)。
    pub async fn batch(
        &self,
        plan: &Plan,
        policy: &TransportPolicy,
        tree: &StepTree,
        resolved: &[ResolvedStep],
        snapshot: &PlanningSnapshot,
        route_repo: &dyn RouteRepository,
        now: NaiveDateTime,
    ) -> PlannerResult<Vec<TransportJobRecord>> {
        let resolved_indices: HashSet<usize> =
            resolved.iter().map(|r| r.step_index).collect();

        // (起点, 终点) -> 材料类型 -> 货物条目; BTreeMap 保证输出顺序确定
        let mut routes: BTreeMap<(LocationId, LocationId), BTreeMap<TypeId, TransportItem>> =
            BTreeMap::new();

        for r in resolved {
            let step = tree.step(r.step_index);
            let Some(destination) = step.resolved_location(plan) else {
                continue;
            };
            let recipe = snapshot
                .recipe(step.product_type_id, step.activity)
                .expect("已解析步骤必有配方");

            for material in &recipe.materials {
                let origin = match tree.child_producing(r.step_index, material.type_id) {
                    Some(child_idx) if resolved_indices.contains(&child_idx) => {
                        tree.step(child_idx).resolved_location(plan)
                    }
                    // 外购叶子 (或生产子树被跳过): 从采购位置起运
                    _ => plan.source_location_id,
                };
                let Some(origin) = origin else {
                    continue;
                };
                if origin == destination {
                    continue;
                }

                let quantity = material.quantity * r.runs;
                if quantity <= 0 {
                    continue;
                }
                let entry = routes
                    .entry((origin, destination))
                    .or_default()
                    .entry(material.type_id)
                    .or_insert_with(|| TransportItem {
                        type_id: material.type_id,
                        quantity: 0,
                        volume_m3: 0.0,
                        value_isk: 0.0,
                    });
                entry.quantity += quantity;
                entry.volume_m3 += quantity as f64 * material.volume_m3;
                entry.value_isk += quantity as f64 * snapshot.unit_price(material.type_id);
            }
        }

        let mut jobs = Vec::with_capacity(routes.len());
        for ((origin, destination), items) in routes {
            let items: Vec<TransportItem> = items.into_values().collect();
            let total_volume: f64 = items.iter().map(|i| i.volume_m3).sum();
            let total_value: f64 = items.iter().map(|i| i.value_isk).sum();

            let (estimated_cost_isk, estimated_jumps) = match policy.fulfillment {
                FulfillmentMode::Courier => {
                    // 快递合同: 体积费 + 抵押费, 不查路线
                    (
                        total_volume * policy.rate_per_m3
                            + policy.collateral_rate * total_value,
                        0,
                    )
                }
                FulfillmentMode::SelfHaul => {
                    self.self_haul_cost(
                        plan, policy, snapshot, route_repo, origin, destination,
                        total_volume,
                    )
                    .await?
                }
            };

            debug!(
                origin,
                destination,
                item_kinds = items.len(),
                total_volume,
                "生成路线运输作业"
            );
            jobs.push(TransportJobRecord {
                transport_job_id: Uuid::new_v4().to_string(),
                plan_id: plan.plan_id.clone(),
                origin_location_id: origin,
                destination_location_id: destination,
                items,
                fulfillment: policy.fulfillment,
                estimated_cost_isk,
                estimated_jumps,
                linked_job_id: None,
                created_at: now,
            });
        }
        Ok(jobs)
    }

    /// 自运成本: 跳数 × 每 m³ 每跳费率, 跳货船叠加燃料
    async fn self_haul_cost(
        &self,
        _plan: &Plan,
        policy: &TransportPolicy,
        snapshot: &PlanningSnapshot,
        route_repo: &dyn RouteRepository,
        origin: LocationId,
        destination: LocationId,
        total_volume: f64,
    ) -> PlannerResult<(f64, i64)> {
        let profile =
            snapshot
                .transport_profile
                .as_ref()
                .ok_or(PlannerError::MissingTransportProfile {
                    profile_id: policy.transport_profile_id,
                })?;

        let origin_system = snapshot.location_systems.get(&origin).copied();
        let dest_system = snapshot.location_systems.get(&destination).copied();

        let jumps = match (origin_system, dest_system) {
            (Some(o), Some(d)) => {
                match route_repo.find_route(o, d, policy.route_preference).await {
                    Ok(waypoints) => waypoints.len().saturating_sub(1) as i64,
                    Err(RepositoryError::RouteNotFound { .. }) => {
                        // 路线不可达按 0 跳欠估, 不阻断规划
                        warn!(origin, destination, "路线不可达, 跳数按 0 欠估");
                        0
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            _ => {
                warn!(origin, destination, "位置所在星系未解析, 跳数按 0 欠估");
                0
            }
        };

        let mut cost = total_volume * profile.rate_per_m3_jump * jumps as f64;
        if let Some((fuel_type, fuel_per_jump)) = profile.fuel_per_jump {
            // 趟数在 f64 上取整, 货舱容量可以是小数
            let trips = (total_volume / profile.cargo_capacity_m3.max(1.0))
                .ceil()
                .max(1.0);
            cost += (jumps * fuel_per_jump) as f64 * trips * snapshot.unit_price(fuel_type);
        }
        Ok((cost, jumps))
    }
}

impl Default for TransportBatcher {
    fn default() -> Self {
        Self::new()
    }
}
