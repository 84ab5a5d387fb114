// ==========================================
// SdeBlueprintRepository 集成测试
// ==========================================
// 测试目标: 验证 SDE 导出库的配方解析
// 覆盖范围: 制造/反应配方、材料体积、缺失产物、活动过滤
// ==========================================

use eve_industry_planner::db::open_sqlite_connection;
use eve_industry_planner::domain::types::ActivityKind;
use eve_industry_planner::repository::{BlueprintRepository, SdeBlueprintRepository};
use rusqlite::params;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

// ==========================================
// 测试辅助函数
// ==========================================

/// 建一个最小 SDE 库: 蓝图 788 制造 34 (产 1, 3600 秒),
/// 反应公式 46205 反应 16662 (产 200, 10800 秒)
fn seed_sde(dir: &TempDir) -> Arc<Mutex<rusqlite::Connection>> {
    let path = dir.path().join("sde.sqlite");
    let conn = open_sqlite_connection(path.to_str().unwrap()).unwrap();

    conn.execute_batch(
        r#"
        CREATE TABLE industryActivity (
            typeID INTEGER NOT NULL,
            activityID INTEGER NOT NULL,
            time INTEGER NOT NULL,
            PRIMARY KEY (typeID, activityID)
        );
        CREATE TABLE industryActivityProducts (
            typeID INTEGER NOT NULL,
            activityID INTEGER NOT NULL,
            productTypeID INTEGER NOT NULL,
            quantity INTEGER NOT NULL
        );
        CREATE TABLE industryActivityMaterials (
            typeID INTEGER NOT NULL,
            activityID INTEGER NOT NULL,
            materialTypeID INTEGER NOT NULL,
            quantity INTEGER NOT NULL
        );
        CREATE TABLE invTypes (
            typeID INTEGER PRIMARY KEY,
            volume REAL
        );
        "#,
    )
    .unwrap();

    // 制造: 蓝图 788, 活动 1
    conn.execute(
        "INSERT INTO industryActivity VALUES (?1, 1, ?2)",
        params![788, 3600],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO industryActivityProducts VALUES (788, 1, 34, 1)",
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO industryActivityMaterials VALUES (788, 1, 35, 100)",
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO industryActivityMaterials VALUES (788, 1, 36, 50)",
        [],
    )
    .unwrap();

    // 反应: 公式 46205, 活动 11
    conn.execute(
        "INSERT INTO industryActivity VALUES (?1, 11, ?2)",
        params![46205, 10800],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO industryActivityProducts VALUES (46205, 11, 16662, 200)",
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO industryActivityMaterials VALUES (46205, 11, 16646, 100)",
        [],
    )
    .unwrap();

    // 材料体积; 16646 缺 invTypes 行 => 体积按 0 兜底
    conn.execute("INSERT INTO invTypes VALUES (35, 0.01)", []).unwrap();
    conn.execute("INSERT INTO invTypes VALUES (36, 0.02)", []).unwrap();

    Arc::new(Mutex::new(conn))
}

// ==========================================
// 测试用例 1: 制造配方完整解析
// ==========================================

#[tokio::test]
async fn test_manufacturing_recipe_resolves_with_materials() {
    let dir = TempDir::new().unwrap();
    let repo = SdeBlueprintRepository::from_connection(seed_sde(&dir));

    let recipes = repo
        .find_recipes(&[(34, ActivityKind::Manufacturing)])
        .await
        .unwrap();
    let recipe = recipes.get(&(34, ActivityKind::Manufacturing)).unwrap();

    assert_eq!(recipe.blueprint_type_id, 788);
    assert_eq!(recipe.product_type_id, 34);
    assert_eq!(recipe.output_quantity, 1);
    assert_eq!(recipe.base_cycle_time_secs, 3600);

    // materialTypeID 升序
    assert_eq!(recipe.materials.len(), 2);
    assert_eq!(recipe.materials[0].type_id, 35);
    assert_eq!(recipe.materials[0].quantity, 100);
    assert!((recipe.materials[0].volume_m3 - 0.01).abs() < 1e-9);
    assert_eq!(recipe.materials[1].type_id, 36);
}

// ==========================================
// 测试用例 2: 反应配方走活动 11, 缺体积兜底为 0
// ==========================================

#[tokio::test]
async fn test_reaction_recipe_uses_reaction_activity() {
    let dir = TempDir::new().unwrap();
    let repo = SdeBlueprintRepository::from_connection(seed_sde(&dir));

    let recipes = repo
        .find_recipes(&[(16662, ActivityKind::Reaction)])
        .await
        .unwrap();
    let recipe = recipes.get(&(16662, ActivityKind::Reaction)).unwrap();

    assert_eq!(recipe.blueprint_type_id, 46205);
    assert_eq!(recipe.output_quantity, 200);
    assert_eq!(recipe.base_cycle_time_secs, 10800);
    assert_eq!(recipe.materials[0].type_id, 16646);
    assert_eq!(recipe.materials[0].volume_m3, 0.0);
}

// ==========================================
// 测试用例 3: 缺失产物与活动不匹配都不报错, 只是不在结果里
// ==========================================

#[tokio::test]
async fn test_missing_and_mismatched_keys_are_absent() {
    let dir = TempDir::new().unwrap();
    let repo = SdeBlueprintRepository::from_connection(seed_sde(&dir));

    let recipes = repo
        .find_recipes(&[
            (34, ActivityKind::Manufacturing),
            (34, ActivityKind::Reaction),      // 活动不匹配
            (99999, ActivityKind::Manufacturing), // 产物不存在
            (16662, ActivityKind::Transport),  // 运输无 SDE 活动
        ])
        .await
        .unwrap();

    assert_eq!(recipes.len(), 1);
    assert!(recipes.contains_key(&(34, ActivityKind::Manufacturing)));
}
