// ==========================================
// EVE 工业规划系统 - 演示入口
// ==========================================
// 用法: eve-industry-planner <scenario.json>
// 读取规划场景 (计划 + 步骤 + 协作方数据), 执行一次规划,
// 以 JSON 输出结构化结果 (作业/跳过/运输)
// ==========================================

use anyhow::Context;
use eve_industry_planner::config::PlannerConfig;
use eve_industry_planner::domain::plan::{Plan, PlanRun, PlanStep};
use eve_industry_planner::domain::recipe::RecipeData;
use eve_industry_planner::domain::types::{ActivityKind, CharacterId, LocationId, SystemId, TypeId};
use eve_industry_planner::domain::worker::{CharacterSkills, TransportProfile};
use eve_industry_planner::engine::{PlanOrchestrator, PlannerRepositories};
use eve_industry_planner::importer::PriceCsvImporter;
use eve_industry_planner::repository::{
    InMemoryBlueprintRepository, InMemoryCostIndexRepository, InMemoryJobQueueRepository,
    InMemoryMarketPriceRepository, InMemoryRouteRepository, InMemorySkillRepository,
    InMemoryTransportProfileRepository,
};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

// ==========================================
// Scenario - 演示场景文件格式
// ==========================================

#[derive(Debug, Deserialize)]
struct ScenarioRecipe {
    activity: ActivityKind,
    #[serde(flatten)]
    recipe: RecipeData,
}

#[derive(Debug, Deserialize)]
struct ScenarioPrice {
    type_id: TypeId,
    sell_price: f64,
    adjusted_price: f64,
}

#[derive(Debug, Deserialize, Default)]
struct ScenarioUniverse {
    /// 位置 -> 星系
    #[serde(default)]
    locations: Vec<(LocationId, SystemId)>,
    /// (起点星系, 终点星系) -> 航点表
    #[serde(default)]
    routes: Vec<(SystemId, SystemId, Vec<SystemId>)>,
    #[serde(default)]
    transport_profiles: Vec<TransportProfile>,
}

#[derive(Debug, Deserialize)]
struct Scenario {
    plan: Plan,
    steps: Vec<PlanStep>,
    run: PlanRun,
    #[serde(default)]
    characters: Vec<CharacterId>,
    recipes: Vec<ScenarioRecipe>,
    /// 内联价格; 与 price_csv 二选一或叠加
    #[serde(default)]
    prices: Vec<ScenarioPrice>,
    /// 市场价格快照 CSV 路径 (相对场景文件)
    #[serde(default)]
    price_csv: Option<String>,
    #[serde(default)]
    skills: Vec<CharacterSkills>,
    /// (位置, 活动, 成本指数)
    #[serde(default)]
    cost_indices: Vec<(LocationId, ActivityKind, f64)>,
    #[serde(default)]
    universe: ScenarioUniverse,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    eve_industry_planner::logging::init();

    tracing::info!("==================================================");
    tracing::info!("{} - 生产计划执行规划器", eve_industry_planner::APP_NAME);
    tracing::info!("系统版本: {}", eve_industry_planner::VERSION);
    tracing::info!("==================================================");

    let path = std::env::args()
        .nth(1)
        .context("用法: eve-industry-planner <scenario.json>")?;
    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("读取场景文件失败: {path}"))?;
    let scenario: Scenario =
        serde_json::from_str(&raw).with_context(|| format!("解析场景文件失败: {path}"))?;

    // ==========================================
    // 组装内存仓储
    // ==========================================
    let mut blueprint_repo = InMemoryBlueprintRepository::new();
    for r in scenario.recipes {
        blueprint_repo = blueprint_repo.with_recipe(r.activity, r.recipe);
    }

    let mut price_repo = InMemoryMarketPriceRepository::default();
    if let Some(csv_path) = &scenario.price_csv {
        let resolved = Path::new(&path)
            .parent()
            .map(|p| p.join(csv_path))
            .unwrap_or_else(|| csv_path.into());
        let snapshot = PriceCsvImporter::new().import_file(&resolved)?;
        price_repo = InMemoryMarketPriceRepository::new(
            snapshot.market_prices,
            snapshot.adjusted_prices,
        );
    }
    for p in scenario.prices {
        price_repo = price_repo.with_price(p.type_id, p.sell_price, p.adjusted_price);
    }

    let mut cost_index_repo = InMemoryCostIndexRepository::new();
    for (loc, activity, index) in scenario.cost_indices {
        cost_index_repo = cost_index_repo.with_index(loc, activity, index);
    }

    let mut skill_repo = InMemorySkillRepository::new();
    for s in scenario.skills {
        skill_repo = skill_repo.with_character(s);
    }

    let mut route_repo = InMemoryRouteRepository::new();
    for (loc, system) in scenario.universe.locations {
        route_repo = route_repo.with_location(loc, system);
    }
    for (origin, dest, waypoints) in scenario.universe.routes {
        route_repo = route_repo.with_route(origin, dest, waypoints);
    }

    let mut profile_repo = InMemoryTransportProfileRepository::new();
    for p in scenario.universe.transport_profiles {
        profile_repo = profile_repo.with_profile(p);
    }

    let queue_repo = Arc::new(InMemoryJobQueueRepository::new());
    let repos = PlannerRepositories {
        blueprint_repo: Arc::new(blueprint_repo),
        price_repo: Arc::new(price_repo),
        cost_index_repo: Arc::new(cost_index_repo),
        skill_repo: Arc::new(skill_repo),
        queue_repo: queue_repo.clone(),
        route_repo: Arc::new(route_repo),
        transport_profile_repo: Arc::new(profile_repo),
    };

    // ==========================================
    // 执行规划
    // ==========================================
    let orchestrator = PlanOrchestrator::new(PlannerConfig::default(), repos);
    let result = orchestrator
        .execute_plan_run(
            &scenario.plan,
            scenario.steps,
            &scenario.run,
            &scenario.characters,
        )
        .await?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
