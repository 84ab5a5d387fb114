// ==========================================
// EVE 工业规划系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 协作方数据访问接口 + 内存/SDE 实现
// ==========================================

pub mod error;
pub mod memory;
pub mod sde_repo;
pub mod traits;

pub use error::{RepositoryError, RepositoryResult};
pub use memory::{
    InMemoryBlueprintRepository, InMemoryCostIndexRepository, InMemoryJobQueueRepository,
    InMemoryMarketPriceRepository, InMemoryRouteRepository, InMemorySkillRepository,
    InMemoryTransportProfileRepository,
};
pub use sde_repo::SdeBlueprintRepository;
pub use traits::{
    BlueprintRepository, CostIndexRepository, JobQueueRepository, MarketPriceRepository,
    RouteRepository, SkillRepository, TransportProfileRepository,
};
