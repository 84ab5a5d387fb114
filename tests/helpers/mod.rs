// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的计划/步骤/配方构造器与内存仓储组装
// ==========================================

#![allow(dead_code)]

use chrono::Utc;
use eve_industry_planner::domain::plan::{Plan, PlanRun, PlanStep, TransportPolicy};
use eve_industry_planner::domain::recipe::{RecipeData, RecipeMaterial};
use eve_industry_planner::domain::types::{
    ActivityKind, LocationId, RigLevel, SecurityClass, StructureType, TypeId,
};
use eve_industry_planner::engine::PlanningSnapshot;
use std::collections::HashMap;

/// 创建测试用的计划 (制造默认位置 60003760)
pub fn test_plan(root_product: TypeId) -> Plan {
    let mut defaults = HashMap::new();
    defaults.insert(ActivityKind::Manufacturing, 60003760);
    defaults.insert(ActivityKind::Reaction, 60003760);
    Plan {
        plan_id: "P001".to_string(),
        plan_name: "测试计划".to_string(),
        owner_id: 1,
        root_product_id: root_product,
        default_output_locations: defaults,
        source_location_id: None,
        transport_policy: None,
        created_at: Utc::now().naive_utc(),
        updated_at: Utc::now().naive_utc(),
    }
}

/// 创建测试用的步骤 (无设施加成的空间站)
pub fn test_step(
    id: &str,
    parent: Option<&str>,
    product: TypeId,
    activity: ActivityKind,
) -> PlanStep {
    PlanStep {
        step_id: id.to_string(),
        plan_id: "P001".to_string(),
        product_type_id: product,
        blueprint_type_id: product + 1,
        activity,
        material_efficiency: 0,
        time_efficiency: 0,
        structure_type: StructureType::Station,
        rig_level: RigLevel::None,
        security: SecurityClass::HighSec,
        facility_tax_rate: 0.0,
        parent_step_id: parent.map(|s| s.to_string()),
        output_location_id: None,
    }
}

/// 创建测试用的配方
pub fn test_recipe(
    product: TypeId,
    output_quantity: i64,
    cycle_secs: i64,
    materials: &[(TypeId, i64)],
) -> RecipeData {
    RecipeData {
        blueprint_type_id: product + 1,
        product_type_id: product,
        base_cycle_time_secs: cycle_secs,
        output_quantity,
        materials: materials
            .iter()
            .map(|&(type_id, quantity)| RecipeMaterial {
                type_id,
                quantity,
                volume_m3: 0.01,
            })
            .collect(),
    }
}

/// 把配方装进快照
pub fn snapshot_with_recipes(
    recipes: Vec<(ActivityKind, RecipeData)>,
) -> PlanningSnapshot {
    let mut snap = PlanningSnapshot::default();
    for (activity, recipe) in recipes {
        snap.recipes.insert((recipe.product_type_id, activity), recipe);
    }
    snap
}

/// 创建测试用的执行请求
pub fn test_run(quantity: i64, parallelism: u32) -> PlanRun {
    PlanRun {
        run_id: "R001".to_string(),
        plan_id: "P001".to_string(),
        quantity,
        parallelism,
        requested_at: Utc::now().naive_utc(),
    }
}

/// 快递合同运输策略
pub fn courier_policy(rate_per_m3: f64, collateral_rate: f64) -> TransportPolicy {
    TransportPolicy {
        fulfillment: eve_industry_planner::domain::types::FulfillmentMode::Courier,
        route_preference: eve_industry_planner::domain::types::RoutePreference::Shortest,
        rate_per_m3,
        collateral_rate,
        transport_profile_id: None,
    }
}

/// 指定步骤的产出位置
pub fn at_location(mut step: PlanStep, location: LocationId) -> PlanStep {
    step.output_location_id = Some(location);
    step
}
