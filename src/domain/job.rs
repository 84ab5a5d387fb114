// ==========================================
// EVE 工业规划系统 - 作业记录领域模型
// ==========================================
// 红线: 作业记录是规划快照, 不可反向修改计划/步骤
// 一个步骤的轮数拆分到多个角色时产生多条 JobRecord (碎片)
// ==========================================

use crate::domain::types::{
    ActivityKind, CharacterId, FulfillmentMode, JobStatus, LocationId, SkipReason, TypeId,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==========================================
// JobRecord - 作业记录 (碎片)
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    pub job_id: String,                      // 作业ID
    pub plan_id: String,                     // 所属计划
    pub step_id: String,                     // 来源步骤
    pub product_type_id: TypeId,             // 产物类型
    pub activity: ActivityKind,              // 活动类型
    pub runs: i64,                           // 本碎片轮数
    pub assigned_character_id: Option<CharacterId>, // 指派角色 (None = 未指派)
    pub output_location_id: Option<LocationId>,     // 产出位置快照
    pub estimated_cost_isk: f64,             // 估算成本 (ISK)
    pub estimated_duration_secs: i64,        // 估算时长 (秒, 按碎片计)
    pub status: JobStatus,                   // 状态 (规划产出恒为 PLANNED)
    pub created_at: NaiveDateTime,           // 创建时间
}

impl JobRecord {
    pub fn new_planned(
        plan_id: &str,
        step_id: &str,
        product_type_id: TypeId,
        activity: ActivityKind,
        runs: i64,
        now: NaiveDateTime,
    ) -> Self {
        Self {
            job_id: Uuid::new_v4().to_string(),
            plan_id: plan_id.to_string(),
            step_id: step_id.to_string(),
            product_type_id,
            activity,
            runs,
            assigned_character_id: None,
            output_location_id: None,
            estimated_cost_isk: 0.0,
            estimated_duration_secs: 0,
            status: JobStatus::Planned,
            created_at: now,
        }
    }
}

// ==========================================
// SkippedStep - 跳过记录
// ==========================================
// 部分失败是合法输出, 不是错误 (兄弟子树继续)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedStep {
    pub step_id: String,         // 被跳过的步骤
    pub product_type_id: TypeId, // 其产物类型
    pub reason: SkipReason,      // 原因 (必填)
}

// ==========================================
// TransportJobRecord - 运输作业记录
// ==========================================

/// 单条运输货物
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportItem {
    pub type_id: TypeId,   // 材料类型
    pub quantity: i64,     // 数量
    pub volume_m3: f64,    // 总体积
    pub value_isk: f64,    // 总价值 (抵押费计算用)
}

/// 按 (起点, 终点) 路线合并后的运输作业
///
/// 红线: 一条路线一条记录, 禁止按材料逐条开运输
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportJobRecord {
    pub transport_job_id: String,         // 运输作业ID
    pub plan_id: String,                  // 所属计划
    pub origin_location_id: LocationId,   // 起点
    pub destination_location_id: LocationId, // 终点
    pub items: Vec<TransportItem>,        // 货物清单
    pub fulfillment: FulfillmentMode,     // 履约模式
    pub estimated_cost_isk: f64,          // 估算运费
    pub estimated_jumps: i64,             // 估算跳数 (快递合同为 0)
    /// 对应的队列条目 (activity = TRANSPORT)
    pub linked_job_id: Option<String>,
    pub created_at: NaiveDateTime,        // 创建时间
}

impl TransportJobRecord {
    pub fn total_volume_m3(&self) -> f64 {
        self.items.iter().map(|i| i.volume_m3).sum()
    }

    pub fn total_value_isk(&self) -> f64 {
        self.items.iter().map(|i| i.value_isk).sum()
    }
}
