// ==========================================
// EVE 工业规划系统 - 数量传播引擎
// ==========================================
// 职责: 把根产物目标数量沿步骤树传播为每步骤轮数
// 红线: 子步骤先于父步骤落库 (输出序列为后序)
// 红线: 非根步骤缺蓝图 = 整棵子树跳过, 兄弟继续; 根缺蓝图 = 致命
// ==========================================

use crate::domain::job::SkippedStep;
use crate::domain::recipe::StepTree;
use crate::domain::types::SkipReason;
use crate::engine::error::{PlannerError, PlannerResult};
use crate::engine::snapshot::PlanningSnapshot;
use tracing::{debug, warn};

// ==========================================
// ResolvedStep - 已解析步骤
// ==========================================

/// 数量传播后的单步骤结果
#[derive(Debug, Clone)]
pub struct ResolvedStep {
    pub step_index: usize, // 步骤树 arena 下标
    pub runs: i64,         // 轮数
    pub depth: u32,        // 深度 (根 = 0)
}

/// 数量传播结果: 成功与跳过并存 (部分失败是合法输出)
#[derive(Debug, Clone, Default)]
pub struct PropagationResult {
    /// 后序排列 (子先于父), 供落库顺序直接使用
    pub resolved: Vec<ResolvedStep>,
    pub skipped: Vec<SkippedStep>,
}

// ==========================================
// QuantityPropagator - 数量传播引擎
// ==========================================
pub struct QuantityPropagator;

impl QuantityPropagator {
    pub fn new() -> Self {
        Self
    }

    /// 传播目标数量为每步骤轮数
    ///
    /// 根: runs = ceil(Q / 每轮产出)
    /// 非根: runs = ceil(父每轮消耗 × 父轮数 / 每轮产出)
    /// 只有存在子步骤的材料才视为子建造, 其余为外购叶子。
    pub fn propagate(
        &self,
        tree: &StepTree,
        snapshot: &PlanningSnapshot,
        quantity: i64,
    ) -> PlannerResult<PropagationResult> {
        if quantity <= 0 {
            return Err(PlannerError::InvalidQuantity(quantity));
        }

        let root = tree.root_index();
        let root_step = tree.step(root);
        let root_recipe = snapshot
            .recipe(root_step.product_type_id, root_step.activity)
            .ok_or(PlannerError::RootBlueprintNotFound {
                product_type_id: root_step.product_type_id,
            })?;

        let mut runs: Vec<Option<i64>> = vec![None; tree.len()];
        let mut skipped: Vec<SkippedStep> = Vec::new();

        runs[root] = Some(ceil_div(quantity, root_recipe.output_quantity.max(1)));
        debug!(
            root_step = %root_step.step_id,
            quantity,
            root_runs = runs[root].unwrap(),
            "根步骤轮数已确定"
        );

        // 自根向下: 父轮数先确定, 子轮数随之可算 (先序)
        let mut stack = vec![root];
        while let Some(parent_idx) = stack.pop() {
            let Some(parent_runs) = runs[parent_idx] else {
                continue;
            };
            let parent_step = tree.step(parent_idx);
            // 根配方上面已校验过; 非根在被父处理时校验
            let parent_recipe = snapshot
                .recipe(parent_step.product_type_id, parent_step.activity)
                .expect("已解析步骤必有配方");

            for &child_idx in tree.children_of(parent_idx) {
                let child_step = tree.step(child_idx);

                let Some(child_recipe) =
                    snapshot.recipe(child_step.product_type_id, child_step.activity)
                else {
                    // 蓝图缺失: 整棵子树跳过, 兄弟不受影响
                    warn!(
                        step_id = %child_step.step_id,
                        product_type_id = child_step.product_type_id,
                        "蓝图数据未找到, 跳过该步骤及其子树"
                    );
                    self.skip_subtree(tree, child_idx, &mut skipped);
                    continue;
                };

                let need = match parent_recipe.material_quantity(child_step.product_type_id) {
                    Some(q) => q,
                    None => {
                        // 子步骤产物未出现在父配方中: 轮数为 0, 仍然物化
                        warn!(
                            step_id = %child_step.step_id,
                            parent_step_id = %parent_step.step_id,
                            product_type_id = child_step.product_type_id,
                            "子步骤产物不在父配方材料清单中, 轮数记 0"
                        );
                        0
                    }
                };

                let required_units = need * parent_runs;
                let child_runs = ceil_div(required_units, child_recipe.output_quantity.max(1));
                runs[child_idx] = Some(child_runs);
                stack.push(child_idx);
            }
        }

        // 输出后序序列: 子先于父, 下游可直接按序落库
        let resolved = tree
            .post_order()
            .into_iter()
            .filter_map(|idx| {
                runs[idx].map(|r| ResolvedStep {
                    step_index: idx,
                    runs: r,
                    depth: tree.depth(idx),
                })
            })
            .collect();

        Ok(PropagationResult { resolved, skipped })
    }

    /// 整棵子树记为跳过: 树根记蓝图缺失, 后代记祖先连带
    fn skip_subtree(&self, tree: &StepTree, idx: usize, skipped: &mut Vec<SkippedStep>) {
        for (i, sub_idx) in tree.subtree_of(idx).into_iter().enumerate() {
            let step = tree.step(sub_idx);
            skipped.push(SkippedStep {
                step_id: step.step_id.clone(),
                product_type_id: step.product_type_id,
                reason: if i == 0 {
                    SkipReason::BlueprintDataNotFound
                } else {
                    SkipReason::AncestorSkipped
                },
            });
        }
    }
}

impl Default for QuantityPropagator {
    fn default() -> Self {
        Self::new()
    }
}

/// 向上取整除法 (b > 0)
pub fn ceil_div(a: i64, b: i64) -> i64 {
    debug_assert!(b > 0);
    (a + b - 1) / b
}
