// ==========================================
// EVE 工业规划系统 - 协作方仓储接口
// ==========================================
// 红线: Repository 不含业务逻辑
// 接口面向批量: 规划调用前一次性预取, 避免 O(步骤数) 外部往返
// HTTP/ESI/数据库实现由外层提供; 本 crate 自带内存实现与 SDE SQLite 实现
// ==========================================

use crate::domain::job::{JobRecord, TransportJobRecord};
use crate::domain::recipe::RecipeData;
use crate::domain::types::{
    ActivityKind, CharacterId, LocationId, RoutePreference, SystemId, TypeId,
};
use crate::domain::worker::{CharacterSkills, TransportProfile};
use crate::engine::snapshot::MarketPrice;
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;
use std::collections::HashMap;

// ==========================================
// BlueprintRepository - 蓝图配方 (SDE)
// ==========================================
#[async_trait]
pub trait BlueprintRepository: Send + Sync {
    /// 按 (产物类型, 活动) 批量解析配方; 缺失的键不出现在结果中
    async fn find_recipes(
        &self,
        keys: &[(TypeId, ActivityKind)],
    ) -> RepositoryResult<HashMap<(TypeId, ActivityKind), RecipeData>>;
}

// ==========================================
// MarketPriceRepository - 市场价格
// ==========================================
#[async_trait]
pub trait MarketPriceRepository: Send + Sync {
    async fn load_market_prices(
        &self,
        type_ids: &[TypeId],
    ) -> RepositoryResult<HashMap<TypeId, MarketPrice>>;

    async fn load_adjusted_prices(
        &self,
        type_ids: &[TypeId],
    ) -> RepositoryResult<HashMap<TypeId, f64>>;
}

// ==========================================
// CostIndexRepository - 系统成本指数
// ==========================================
#[async_trait]
pub trait CostIndexRepository: Send + Sync {
    async fn load_cost_indices(
        &self,
        keys: &[(LocationId, ActivityKind)],
    ) -> RepositoryResult<HashMap<(LocationId, ActivityKind), f64>>;
}

// ==========================================
// SkillRepository - 角色技能
// ==========================================
#[async_trait]
pub trait SkillRepository: Send + Sync {
    /// 技能数据集中不存在的角色不出现在结果中
    async fn load_skills(
        &self,
        character_ids: &[CharacterId],
    ) -> RepositoryResult<HashMap<CharacterId, CharacterSkills>>;
}

// ==========================================
// JobQueueRepository - 作业队列
// ==========================================
#[async_trait]
pub trait JobQueueRepository: Send + Sync {
    /// 持久化作业记录 (子步骤记录必须先于父步骤提交)
    async fn create_job(&self, job: &JobRecord) -> RepositoryResult<JobRecord>;

    /// 持久化运输作业记录
    async fn create_transport_job(
        &self,
        job: &TransportJobRecord,
    ) -> RepositoryResult<TransportJobRecord>;

    /// 各角色各活动的在途作业占用槽位数
    async fn load_inflight_counts(
        &self,
        character_ids: &[CharacterId],
    ) -> RepositoryResult<HashMap<(CharacterId, ActivityKind), i32>>;
}

// ==========================================
// RouteRepository - 星图路线
// ==========================================
#[async_trait]
pub trait RouteRepository: Send + Sync {
    /// 星系间路线 (含起止星系的有序航点表)
    async fn find_route(
        &self,
        origin: SystemId,
        destination: SystemId,
        preference: RoutePreference,
    ) -> RepositoryResult<Vec<SystemId>>;

    /// 位置 -> 所在星系, 批量
    async fn resolve_systems(
        &self,
        location_ids: &[LocationId],
    ) -> RepositoryResult<HashMap<LocationId, SystemId>>;
}

// ==========================================
// TransportProfileRepository - 运输配置
// ==========================================
#[async_trait]
pub trait TransportProfileRepository: Send + Sync {
    async fn find_profile(&self, profile_id: i64) -> RepositoryResult<Option<TransportProfile>>;
}
