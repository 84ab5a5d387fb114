// ==========================================
// EVE 工业规划系统 - 内存仓储实现
// ==========================================
// 用途: 测试与演示场景; 外层服务用 ESI/数据库实现替换
// 队列实现记录所有提交, 测试可断言落库顺序
// ==========================================

use crate::domain::job::{JobRecord, TransportJobRecord};
use crate::domain::recipe::RecipeData;
use crate::domain::types::{
    ActivityKind, CharacterId, LocationId, RoutePreference, SystemId, TypeId,
};
use crate::domain::worker::{CharacterSkills, TransportProfile};
use crate::engine::snapshot::MarketPrice;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::traits::{
    BlueprintRepository, CostIndexRepository, JobQueueRepository, MarketPriceRepository,
    RouteRepository, SkillRepository, TransportProfileRepository,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

// ==========================================
// InMemoryBlueprintRepository
// ==========================================
#[derive(Debug, Default)]
pub struct InMemoryBlueprintRepository {
    recipes: HashMap<(TypeId, ActivityKind), RecipeData>,
}

impl InMemoryBlueprintRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_recipe(mut self, activity: ActivityKind, recipe: RecipeData) -> Self {
        self.recipes
            .insert((recipe.product_type_id, activity), recipe);
        self
    }
}

#[async_trait]
impl BlueprintRepository for InMemoryBlueprintRepository {
    async fn find_recipes(
        &self,
        keys: &[(TypeId, ActivityKind)],
    ) -> RepositoryResult<HashMap<(TypeId, ActivityKind), RecipeData>> {
        Ok(keys
            .iter()
            .filter_map(|k| self.recipes.get(k).map(|r| (*k, r.clone())))
            .collect())
    }
}

// ==========================================
// InMemoryMarketPriceRepository
// ==========================================
#[derive(Debug, Default)]
pub struct InMemoryMarketPriceRepository {
    market: HashMap<TypeId, MarketPrice>,
    adjusted: HashMap<TypeId, f64>,
}

impl InMemoryMarketPriceRepository {
    pub fn new(market: HashMap<TypeId, MarketPrice>, adjusted: HashMap<TypeId, f64>) -> Self {
        Self { market, adjusted }
    }

    pub fn with_price(mut self, type_id: TypeId, sell: f64, adjusted: f64) -> Self {
        self.market.insert(
            type_id,
            MarketPrice {
                buy_isk: sell * 0.9,
                sell_isk: sell,
            },
        );
        self.adjusted.insert(type_id, adjusted);
        self
    }
}

#[async_trait]
impl MarketPriceRepository for InMemoryMarketPriceRepository {
    async fn load_market_prices(
        &self,
        type_ids: &[TypeId],
    ) -> RepositoryResult<HashMap<TypeId, MarketPrice>> {
        Ok(type_ids
            .iter()
            .filter_map(|id| self.market.get(id).map(|p| (*id, *p)))
            .collect())
    }

    async fn load_adjusted_prices(
        &self,
        type_ids: &[TypeId],
    ) -> RepositoryResult<HashMap<TypeId, f64>> {
        Ok(type_ids
            .iter()
            .filter_map(|id| self.adjusted.get(id).map(|p| (*id, *p)))
            .collect())
    }
}

// ==========================================
// InMemoryCostIndexRepository
// ==========================================
#[derive(Debug, Default)]
pub struct InMemoryCostIndexRepository {
    indices: HashMap<(LocationId, ActivityKind), f64>,
}

impl InMemoryCostIndexRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_index(mut self, location: LocationId, activity: ActivityKind, index: f64) -> Self {
        self.indices.insert((location, activity), index);
        self
    }
}

#[async_trait]
impl CostIndexRepository for InMemoryCostIndexRepository {
    async fn load_cost_indices(
        &self,
        keys: &[(LocationId, ActivityKind)],
    ) -> RepositoryResult<HashMap<(LocationId, ActivityKind), f64>> {
        Ok(keys
            .iter()
            .filter_map(|k| self.indices.get(k).map(|v| (*k, *v)))
            .collect())
    }
}

// ==========================================
// InMemorySkillRepository
// ==========================================
#[derive(Debug, Default)]
pub struct InMemorySkillRepository {
    skills: HashMap<CharacterId, CharacterSkills>,
}

impl InMemorySkillRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_character(mut self, skills: CharacterSkills) -> Self {
        self.skills.insert(skills.character_id, skills);
        self
    }
}

#[async_trait]
impl SkillRepository for InMemorySkillRepository {
    async fn load_skills(
        &self,
        character_ids: &[CharacterId],
    ) -> RepositoryResult<HashMap<CharacterId, CharacterSkills>> {
        Ok(character_ids
            .iter()
            .filter_map(|id| self.skills.get(id).map(|s| (*id, s.clone())))
            .collect())
    }
}

// ==========================================
// InMemoryJobQueueRepository
// ==========================================
// 记录提交顺序, 测试断言 "子先于父落库" 用
#[derive(Debug, Default)]
pub struct InMemoryJobQueueRepository {
    pub created_jobs: Mutex<Vec<JobRecord>>,
    pub created_transport_jobs: Mutex<Vec<TransportJobRecord>>,
    inflight: HashMap<(CharacterId, ActivityKind), i32>,
}

impl InMemoryJobQueueRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_inflight(mut self, character: CharacterId, activity: ActivityKind, count: i32) -> Self {
        self.inflight.insert((character, activity), count);
        self
    }

    /// 提交顺序中的步骤 ID 序列
    pub fn created_step_ids(&self) -> Vec<String> {
        self.created_jobs
            .lock()
            .expect("queue mutex poisoned")
            .iter()
            .map(|j| j.step_id.clone())
            .collect()
    }
}

#[async_trait]
impl JobQueueRepository for InMemoryJobQueueRepository {
    async fn create_job(&self, job: &JobRecord) -> RepositoryResult<JobRecord> {
        self.created_jobs
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?
            .push(job.clone());
        Ok(job.clone())
    }

    async fn create_transport_job(
        &self,
        job: &TransportJobRecord,
    ) -> RepositoryResult<TransportJobRecord> {
        self.created_transport_jobs
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?
            .push(job.clone());
        Ok(job.clone())
    }

    async fn load_inflight_counts(
        &self,
        character_ids: &[CharacterId],
    ) -> RepositoryResult<HashMap<(CharacterId, ActivityKind), i32>> {
        Ok(self
            .inflight
            .iter()
            .filter(|((c, _), _)| character_ids.contains(c))
            .map(|(k, v)| (*k, *v))
            .collect())
    }
}

// ==========================================
// InMemoryRouteRepository
// ==========================================
#[derive(Debug, Default)]
pub struct InMemoryRouteRepository {
    /// (起点星系, 终点星系) -> 航点表
    routes: HashMap<(SystemId, SystemId), Vec<SystemId>>,
    /// 位置 -> 星系
    location_systems: HashMap<LocationId, SystemId>,
}

impl InMemoryRouteRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_location(mut self, location: LocationId, system: SystemId) -> Self {
        self.location_systems.insert(location, system);
        self
    }

    pub fn with_route(mut self, origin: SystemId, dest: SystemId, waypoints: Vec<SystemId>) -> Self {
        self.routes.insert((origin, dest), waypoints);
        self
    }
}

#[async_trait]
impl RouteRepository for InMemoryRouteRepository {
    async fn find_route(
        &self,
        origin: SystemId,
        destination: SystemId,
        _preference: RoutePreference,
    ) -> RepositoryResult<Vec<SystemId>> {
        if origin == destination {
            return Ok(vec![origin]);
        }
        self.routes
            .get(&(origin, destination))
            .cloned()
            .ok_or(RepositoryError::RouteNotFound {
                origin,
                destination,
            })
    }

    async fn resolve_systems(
        &self,
        location_ids: &[LocationId],
    ) -> RepositoryResult<HashMap<LocationId, SystemId>> {
        Ok(location_ids
            .iter()
            .filter_map(|id| self.location_systems.get(id).map(|s| (*id, *s)))
            .collect())
    }
}

// ==========================================
// InMemoryTransportProfileRepository
// ==========================================
#[derive(Debug, Default)]
pub struct InMemoryTransportProfileRepository {
    profiles: HashMap<i64, TransportProfile>,
}

impl InMemoryTransportProfileRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(mut self, profile: TransportProfile) -> Self {
        self.profiles.insert(profile.profile_id, profile);
        self
    }
}

#[async_trait]
impl TransportProfileRepository for InMemoryTransportProfileRepository {
    async fn find_profile(&self, profile_id: i64) -> RepositoryResult<Option<TransportProfile>> {
        Ok(self.profiles.get(&profile_id).cloned())
    }
}
