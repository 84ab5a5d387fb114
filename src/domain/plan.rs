// ==========================================
// EVE 工业规划系统 - 生产计划领域模型
// ==========================================
// 红线: 计划与步骤在规划期间不可变,规划器只读不写
// 步骤以扁平集合 + parent_step_id 存储, 树结构见 domain/recipe.rs
// ==========================================

use crate::domain::types::{
    ActivityKind, FulfillmentMode, LocationId, RigLevel, RoutePreference, SecurityClass,
    StructureType, TypeId,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ==========================================
// TransportPolicy - 运输策略
// ==========================================
// 计划未配置运输策略时, 运输批处理整体关闭
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportPolicy {
    pub fulfillment: FulfillmentMode,      // 履约模式
    pub route_preference: RoutePreference, // 路线偏好 (自运时查询路线用)
    pub rate_per_m3: f64,                  // 每 m³ 运费 (快递) / 每 m³ 每跳运费 (自运)
    pub collateral_rate: f64,              // 抵押费率 (仅快递合同)
    pub transport_profile_id: Option<i64>, // 运输配置引用 (自运时必须可解析)
}

// ==========================================
// Plan - 生产计划
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub plan_id: String,                   // 计划ID
    pub plan_name: String,                 // 计划名称
    pub owner_id: i64,                     // 所属用户
    pub root_product_id: TypeId,           // 最终产物类型
    /// 各活动类型的默认产出位置 (步骤未指定 output_location 时回退)
    pub default_output_locations: HashMap<ActivityKind, LocationId>,
    /// 外购材料的采购位置 (如吉他贸易枢纽); 未设置则不为外购材料生成运输
    pub source_location_id: Option<LocationId>,
    pub transport_policy: Option<TransportPolicy>, // 运输策略 (None = 不批运输)
    pub created_at: NaiveDateTime,         // 创建时间
    pub updated_at: NaiveDateTime,         // 更新时间
}

impl Plan {
    /// 是否启用运输批处理
    pub fn transport_enabled(&self) -> bool {
        self.transport_policy.is_some()
    }
}

// ==========================================
// PlanStep - 计划步骤
// ==========================================
// 一个步骤 = 一种产物的一次建造活动
// 非根步骤的 parent_step_id 必须指向同计划内的步骤
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanStep {
    pub step_id: String,                     // 步骤ID
    pub plan_id: String,                     // 所属计划
    pub product_type_id: TypeId,             // 产物类型
    pub blueprint_type_id: TypeId,           // 蓝图类型
    pub activity: ActivityKind,              // 活动类型 (制造/反应)
    pub material_efficiency: u8,             // 材料效率等级 ME (0-10)
    pub time_efficiency: u8,                 // 时间效率等级 TE (0-20)

    // ===== 设施修正 =====
    pub structure_type: StructureType,       // 建筑类型
    pub rig_level: RigLevel,                 // 改装件等级
    pub security: SecurityClass,             // 所在星系安全等级
    pub facility_tax_rate: f64,              // 设施税率 (小数)

    pub parent_step_id: Option<String>,      // 父步骤 (None = 根)
    pub output_location_id: Option<LocationId>, // 指定产出位置
}

impl PlanStep {
    /// 解析该步骤的产出位置: 显式指定优先, 其次计划内按活动类型的默认位置
    pub fn resolved_location(&self, plan: &Plan) -> Option<LocationId> {
        self.output_location_id
            .or_else(|| plan.default_output_locations.get(&self.activity).copied())
    }

    /// ME 材料系数 (1 - ME/100)
    pub fn material_factor(&self) -> f64 {
        1.0 - f64::from(self.material_efficiency) / 100.0
    }
}

// ==========================================
// PlanRun - 规划执行请求
// ==========================================
// 瞬态对象: 每次规划调用新建, 不要求持久化
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanRun {
    pub run_id: String,        // 请求ID
    pub plan_id: String,       // 目标计划
    pub quantity: i64,         // 最终产物目标数量 (必须 > 0)
    /// 并行度: 0 = 不做角色分配模拟
    pub parallelism: u32,
    pub requested_at: NaiveDateTime,
}
