// ==========================================
// EVE 工业规划系统 - 规划数据快照
// ==========================================
// 依据: 协作方数据一次性批量预取, 禁止逐步骤往返
// 树遍历期间快照只读
// ==========================================

use crate::domain::recipe::RecipeData;
use crate::domain::types::{ActivityKind, CharacterId, LocationId, SystemId, TypeId};
use crate::domain::worker::{CharacterSkills, TransportProfile};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ==========================================
// MarketPrice - 市场价格
// ==========================================
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MarketPrice {
    pub buy_isk: f64,  // 收购价
    pub sell_isk: f64, // 出售价 (吉他卖单)
}

// ==========================================
// PlanningSnapshot - 规划数据快照
// ==========================================
// 一次规划调用的全部外部数据; 引擎不做任何 I/O
#[derive(Debug, Clone, Default)]
pub struct PlanningSnapshot {
    /// (产物类型, 活动) -> 配方
    pub recipes: HashMap<(TypeId, ActivityKind), RecipeData>,
    /// 市场价格 (吉他)
    pub market_prices: HashMap<TypeId, MarketPrice>,
    /// 调整价格 (作业费基数)
    pub adjusted_prices: HashMap<TypeId, f64>,
    /// (位置, 活动) -> 成本指数
    pub cost_indices: HashMap<(LocationId, ActivityKind), f64>,
    /// 角色技能 (并行度 > 0 时才预取)
    pub skills: HashMap<CharacterId, CharacterSkills>,
    /// (角色, 活动) -> 在途作业占用槽位数
    pub inflight_jobs: HashMap<(CharacterId, ActivityKind), i32>,
    /// 位置 -> 星系 (运输路线查询用)
    pub location_systems: HashMap<LocationId, SystemId>,
    /// 自运运输配置 (策略要求时预取)
    pub transport_profile: Option<TransportProfile>,
}

impl PlanningSnapshot {
    /// 配方查找
    pub fn recipe(&self, product: TypeId, activity: ActivityKind) -> Option<&RecipeData> {
        self.recipes.get(&(product, activity))
    }

    /// 材料单价: 吉他卖价优先, 其次调整价格, 缺失按 0 (欠估不阻断)
    pub fn unit_price(&self, type_id: TypeId) -> f64 {
        if let Some(p) = self.market_prices.get(&type_id) {
            if p.sell_isk > 0.0 {
                return p.sell_isk;
            }
        }
        self.adjusted_prices.get(&type_id).copied().unwrap_or(0.0)
    }

    /// 调整价格, 缺失按 0
    pub fn adjusted_price(&self, type_id: TypeId) -> f64 {
        self.adjusted_prices.get(&type_id).copied().unwrap_or(0.0)
    }

    /// 成本指数, 缺失按 0 (⇒ 设施税为 0)
    pub fn cost_index(&self, location: Option<LocationId>, activity: ActivityKind) -> f64 {
        location
            .and_then(|loc| self.cost_indices.get(&(loc, activity)).copied())
            .unwrap_or(0.0)
    }

    /// 在途作业占用, 缺失按 0
    pub fn inflight(&self, character: CharacterId, activity: ActivityKind) -> i32 {
        self.inflight_jobs
            .get(&(character, activity))
            .copied()
            .unwrap_or(0)
    }
}
