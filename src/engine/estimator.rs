// ==========================================
// EVE 工业规划系统 - 成本/时长估算引擎
// ==========================================
// 红线: 制造与反应是两套公式族, 按活动类型分派, 禁止复用 TE
//   制造 TE = (1 - 蓝图TE/100) × (1 - 工业×0.04) × (1 - 高级工业×0.03)
//             × 建筑乘数 × 改装件乘数
//   反应 TE = (1 - 反应×0.04) × 建筑乘数 × 改装件乘数
//   (反应等级读取与制造"工业等级"同一字段; 蓝图TE 与高级工业永不参与)
// 价格/成本指数缺失按 0 代入, 只欠估不阻断
// ==========================================

use crate::config::PlannerConfig;
use crate::domain::plan::PlanStep;
use crate::domain::recipe::RecipeData;
use crate::domain::types::ActivityKind;
use crate::engine::snapshot::PlanningSnapshot;

// ==========================================
// EstimatorSkills - 估算技能输入
// ==========================================

/// 估算用技能输入
///
/// `industry_level` 对制造步骤是工业技能, 对反应步骤承载反应技能
/// (与来源数据同一字段)。
#[derive(Debug, Clone, Copy, Default)]
pub struct EstimatorSkills {
    pub industry_level: u8,
    pub advanced_industry_level: u8,
}

/// 单步骤估算结果 (每轮)
#[derive(Debug, Clone, Copy)]
pub struct StepEstimate {
    pub cost_per_run_isk: f64,
    pub duration_per_run_secs: i64,
}

// ==========================================
// CostDurationEstimator - 估算引擎
// ==========================================
pub struct CostDurationEstimator {
    config: PlannerConfig,
}

impl CostDurationEstimator {
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    /// 估算一个步骤的每轮成本与时长
    ///
    /// 成本 = 材料成本 × ME系数 + 作业费 + 设施税
    ///   材料成本 = Σ 数量 × 单价 (吉他卖价, 缺失退调整价, 再缺按 0)
    ///   作业费   = Σ 数量 × 调整价 × 成本指数
    ///   设施税   = 作业费 × 设施税率
    pub fn estimate(
        &self,
        step: &PlanStep,
        recipe: &RecipeData,
        skills: EstimatorSkills,
        cost_index: f64,
        snapshot: &PlanningSnapshot,
    ) -> StepEstimate {
        let te = self.time_factor(step, skills);
        let duration_per_run_secs =
            (recipe.base_cycle_time_secs as f64 * te).floor() as i64;

        let material_factor = step.material_factor();
        let mut material_cost = 0.0;
        let mut estimated_item_value = 0.0;
        for m in &recipe.materials {
            let qty = m.quantity as f64;
            material_cost += qty * snapshot.unit_price(m.type_id);
            estimated_item_value += qty * snapshot.adjusted_price(m.type_id);
        }
        material_cost *= material_factor;

        // 成本指数为 0 时作业费与设施税均为 0
        let job_fee = estimated_item_value * cost_index;
        let facility_tax = job_fee * step.facility_tax_rate;

        StepEstimate {
            cost_per_run_isk: material_cost + job_fee + facility_tax,
            duration_per_run_secs,
        }
    }

    /// 时间系数: 按活动类型分派两套公式
    fn time_factor(&self, step: &PlanStep, skills: EstimatorSkills) -> f64 {
        let structure_mult = step.structure_type.time_multiplier();
        let rig_mult = step.rig_level.time_multiplier(step.security);

        match step.activity {
            ActivityKind::Manufacturing => {
                let bp_te = 1.0 - f64::from(step.time_efficiency) / 100.0;
                let industry = 1.0
                    - f64::from(skills.industry_level)
                        * self.config.industry_time_bonus_per_level;
                let advanced = 1.0
                    - f64::from(skills.advanced_industry_level)
                        * self.config.advanced_industry_time_bonus_per_level;
                bp_te * industry * advanced * structure_mult * rig_mult
            }
            ActivityKind::Reaction => {
                // 蓝图 TE 与高级工业不参与
                let reactions = 1.0
                    - f64::from(skills.industry_level)
                        * self.config.reactions_time_bonus_per_level;
                reactions * structure_mult * rig_mult
            }
            // 运输作业无配方时长, 此分支不会从规划主流程进入
            ActivityKind::Transport => structure_mult * rig_mult,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::recipe::RecipeMaterial;
    use crate::domain::types::{RigLevel, SecurityClass, StructureType};

    fn test_step(activity: ActivityKind) -> PlanStep {
        PlanStep {
            step_id: "S1".to_string(),
            plan_id: "P001".to_string(),
            product_type_id: 16670,
            blueprint_type_id: 16671,
            activity,
            material_efficiency: 10,
            time_efficiency: 20,
            structure_type: StructureType::Station,
            rig_level: RigLevel::None,
            security: SecurityClass::HighSec,
            facility_tax_rate: 0.01,
            parent_step_id: None,
            output_location_id: None,
        }
    }

    fn test_recipe() -> RecipeData {
        RecipeData {
            blueprint_type_id: 16671,
            product_type_id: 16670,
            base_cycle_time_secs: 10_000,
            output_quantity: 1,
            materials: vec![RecipeMaterial {
                type_id: 34,
                quantity: 100,
                volume_m3: 0.01,
            }],
        }
    }

    #[test]
    fn test_manufacturing_and_reaction_durations_differ() {
        // 回归检查: 除活动类型外完全相同的两个步骤,
        // 相同技能/建筑输入必须得到不同时长
        let est = CostDurationEstimator::new(PlannerConfig::default());
        let snapshot = PlanningSnapshot::default();
        let skills = EstimatorSkills {
            industry_level: 5,
            advanced_industry_level: 5,
        };

        let mfg = est.estimate(
            &test_step(ActivityKind::Manufacturing),
            &test_recipe(),
            skills,
            0.0,
            &snapshot,
        );
        let rea = est.estimate(
            &test_step(ActivityKind::Reaction),
            &test_recipe(),
            skills,
            0.0,
            &snapshot,
        );

        // 制造: 10000 × 0.80 × 0.80 × 0.85 = 5440
        assert_eq!(mfg.duration_per_run_secs, 5440);
        // 反应: 10000 × 0.80 = 8000 (蓝图TE 与高级工业不参与)
        assert_eq!(rea.duration_per_run_secs, 8000);
        assert_ne!(mfg.duration_per_run_secs, rea.duration_per_run_secs);
    }

    #[test]
    fn test_zero_cost_index_means_zero_tax() {
        let est = CostDurationEstimator::new(PlannerConfig::default());
        let mut snapshot = PlanningSnapshot::default();
        snapshot.adjusted_prices.insert(34, 4.0);

        let e = est.estimate(
            &test_step(ActivityKind::Manufacturing),
            &test_recipe(),
            EstimatorSkills::default(),
            0.0,
            &snapshot,
        );
        // 无市场价, 材料价退调整价: 100 × 4.0 × 0.90 = 360; 作业费/税为 0
        assert!((e.cost_per_run_isk - 360.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_price_substitutes_zero() {
        let est = CostDurationEstimator::new(PlannerConfig::default());
        let snapshot = PlanningSnapshot::default();

        let e = est.estimate(
            &test_step(ActivityKind::Manufacturing),
            &test_recipe(),
            EstimatorSkills::default(),
            0.05,
            &snapshot,
        );
        assert_eq!(e.cost_per_run_isk, 0.0);
    }

    #[test]
    fn test_job_fee_and_facility_tax() {
        let est = CostDurationEstimator::new(PlannerConfig::default());
        let mut snapshot = PlanningSnapshot::default();
        snapshot
            .market_prices
            .insert(34, crate::engine::snapshot::MarketPrice { buy_isk: 4.0, sell_isk: 5.0 });
        snapshot.adjusted_prices.insert(34, 4.0);

        let e = est.estimate(
            &test_step(ActivityKind::Manufacturing),
            &test_recipe(),
            EstimatorSkills::default(),
            0.10,
            &snapshot,
        );
        // 材料: 100 × 5.0 × 0.90 = 450
        // 作业费: 100 × 4.0 × 0.10 = 40; 税: 40 × 0.01 = 0.4
        assert!((e.cost_per_run_isk - 490.4).abs() < 1e-9);
    }
}
