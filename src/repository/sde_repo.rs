// ==========================================
// EVE 工业规划系统 - SDE 蓝图仓储 (SQLite)
// ==========================================
// 数据源: SDE 导出库的 industryActivity / industryActivityProducts /
//         industryActivityMaterials / invTypes 表
// 红线: Repository 不含业务逻辑, 所有查询参数化
// ==========================================

use crate::domain::recipe::{RecipeData, RecipeMaterial};
use crate::domain::types::{ActivityKind, TypeId};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::traits::BlueprintRepository;
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// SDE 活动 ID
fn sde_activity_id(activity: ActivityKind) -> Option<i64> {
    match activity {
        ActivityKind::Manufacturing => Some(1),
        ActivityKind::Reaction => Some(11),
        ActivityKind::Transport => None,
    }
}

// ==========================================
// SdeBlueprintRepository - SDE 蓝图仓储
// ==========================================
pub struct SdeBlueprintRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SdeBlueprintRepository {
    /// 打开 SDE 导出库
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 按 (产物, 活动) 查单条配方
    fn find_one(
        &self,
        conn: &Connection,
        product_type_id: TypeId,
        activity: ActivityKind,
    ) -> RepositoryResult<Option<RecipeData>> {
        let Some(activity_id) = sde_activity_id(activity) else {
            return Ok(None);
        };

        // 产物 -> 蓝图 + 每轮产出
        let header = conn
            .query_row(
                r#"
                SELECT p.typeID, p.quantity, a.time
                FROM industryActivityProducts p
                JOIN industryActivity a
                  ON a.typeID = p.typeID AND a.activityID = p.activityID
                WHERE p.productTypeID = ?1 AND p.activityID = ?2
                "#,
                params![product_type_id, activity_id],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?, // blueprint typeID
                        row.get::<_, i64>(1)?, // output quantity
                        row.get::<_, i64>(2)?, // base cycle time
                    ))
                },
            )
            .optional()?;

        let Some((blueprint_type_id, output_quantity, base_cycle_time_secs)) = header else {
            return Ok(None);
        };

        // 蓝图 -> 每轮材料 (invTypes.volume 供运输批处理使用)
        let mut stmt = conn.prepare(
            r#"
            SELECT m.materialTypeID, m.quantity, COALESCE(t.volume, 0.0)
            FROM industryActivityMaterials m
            LEFT JOIN invTypes t ON t.typeID = m.materialTypeID
            WHERE m.typeID = ?1 AND m.activityID = ?2
            ORDER BY m.materialTypeID
            "#,
        )?;
        let materials = stmt
            .query_map(params![blueprint_type_id, activity_id], |row| {
                Ok(RecipeMaterial {
                    type_id: row.get(0)?,
                    quantity: row.get(1)?,
                    volume_m3: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(RecipeData {
            blueprint_type_id,
            product_type_id,
            base_cycle_time_secs,
            output_quantity,
            materials,
        }))
    }
}

#[async_trait]
impl BlueprintRepository for SdeBlueprintRepository {
    async fn find_recipes(
        &self,
        keys: &[(TypeId, ActivityKind)],
    ) -> RepositoryResult<HashMap<(TypeId, ActivityKind), RecipeData>> {
        let conn = self.get_conn()?;
        let mut out = HashMap::with_capacity(keys.len());
        for &(product, activity) in keys {
            if let Some(recipe) = self.find_one(&conn, product, activity)? {
                out.insert((product, activity), recipe);
            }
        }
        Ok(out)
    }
}
