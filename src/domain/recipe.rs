// ==========================================
// EVE 工业规划系统 - 蓝图配方与步骤树
// ==========================================
// 红线: 步骤树用扁平 arena + 父指针表示, 禁止对象间循环引用
// 无环性在装载时校验一次 (StepTree::build)
// ==========================================

use crate::domain::plan::PlanStep;
use crate::domain::types::TypeId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

// ==========================================
// RecipeData - 蓝图配方 (SDE 提供)
// ==========================================

/// 单条材料需求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeMaterial {
    pub type_id: TypeId,   // 材料类型
    pub quantity: i64,     // 每轮消耗数量
    pub volume_m3: f64,    // 单位体积 (运输批处理用)
}

/// 蓝图配方: 一轮 (run) 的产出与消耗
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeData {
    pub blueprint_type_id: TypeId,      // 蓝图类型
    pub product_type_id: TypeId,        // 产物类型
    pub base_cycle_time_secs: i64,      // 基础单轮时长 (秒)
    pub output_quantity: i64,           // 每轮产出数量
    pub materials: Vec<RecipeMaterial>, // 每轮材料消耗
}

impl RecipeData {
    /// 查找某材料的每轮消耗量
    pub fn material_quantity(&self, type_id: TypeId) -> Option<i64> {
        self.materials
            .iter()
            .find(|m| m.type_id == type_id)
            .map(|m| m.quantity)
    }
}

// ==========================================
// StepTree - 步骤树 (arena)
// ==========================================

/// 步骤树构建错误
#[derive(Error, Debug)]
pub enum StepTreeError {
    #[error("计划没有步骤")]
    Empty,

    #[error("计划没有根步骤 (所有步骤都有父步骤)")]
    NoRoot,

    #[error("计划存在多个根步骤: {0} 与 {1}")]
    MultipleRoots(String, String),

    #[error("步骤 {step_id} 的父步骤 {parent_id} 不存在于同一计划")]
    ParentNotFound { step_id: String, parent_id: String },

    #[error("步骤 {0} 出现在自己的祖先链中 (环)")]
    Cycle(String),

    #[error("步骤 {step_id} 不属于计划 {plan_id}")]
    ForeignStep { step_id: String, plan_id: String },
}

/// 步骤树: 扁平 arena, 索引引用
///
/// 构建时完成全部结构校验, 之后的遍历方法不再失败。
#[derive(Debug, Clone)]
pub struct StepTree {
    steps: Vec<PlanStep>,
    /// step_id -> arena 下标
    index: HashMap<String, usize>,
    /// 子步骤下标表 (与 steps 对齐)
    children: Vec<Vec<usize>>,
    root: usize,
    /// 深度 (根 = 0, 与 steps 对齐)
    depths: Vec<u32>,
}

impl StepTree {
    /// 从扁平步骤集合构建树并校验结构
    ///
    /// 校验项: 非空、唯一根、父引用有效且同计划、无环。
    pub fn build(plan_id: &str, steps: Vec<PlanStep>) -> Result<Self, StepTreeError> {
        if steps.is_empty() {
            return Err(StepTreeError::Empty);
        }

        let mut index = HashMap::with_capacity(steps.len());
        for (i, step) in steps.iter().enumerate() {
            if step.plan_id != plan_id {
                return Err(StepTreeError::ForeignStep {
                    step_id: step.step_id.clone(),
                    plan_id: plan_id.to_string(),
                });
            }
            index.insert(step.step_id.clone(), i);
        }

        let mut children: Vec<Vec<usize>> = vec![Vec::new(); steps.len()];
        let mut root: Option<usize> = None;

        for (i, step) in steps.iter().enumerate() {
            match &step.parent_step_id {
                None => match root {
                    None => root = Some(i),
                    Some(r) => {
                        return Err(StepTreeError::MultipleRoots(
                            steps[r].step_id.clone(),
                            step.step_id.clone(),
                        ))
                    }
                },
                Some(parent_id) => {
                    let parent_idx =
                        *index
                            .get(parent_id)
                            .ok_or_else(|| StepTreeError::ParentNotFound {
                                step_id: step.step_id.clone(),
                                parent_id: parent_id.clone(),
                            })?;
                    children[parent_idx].push(i);
                }
            }
        }

        let root = root.ok_or(StepTreeError::NoRoot)?;

        // 无环校验 + 深度计算: 从根做一次 BFS, 未覆盖的步骤必在环上
        let mut depths = vec![u32::MAX; steps.len()];
        let mut queue = std::collections::VecDeque::new();
        depths[root] = 0;
        queue.push_back(root);
        let mut visited = 1usize;
        while let Some(i) = queue.pop_front() {
            for &c in &children[i] {
                depths[c] = depths[i] + 1;
                visited += 1;
                queue.push_back(c);
            }
        }
        if visited != steps.len() {
            let orphan = depths
                .iter()
                .position(|&d| d == u32::MAX)
                .map(|i| steps[i].step_id.clone())
                .unwrap_or_default();
            return Err(StepTreeError::Cycle(orphan));
        }

        Ok(Self {
            steps,
            index,
            children,
            root,
            depths,
        })
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn root_index(&self) -> usize {
        self.root
    }

    pub fn step(&self, idx: usize) -> &PlanStep {
        &self.steps[idx]
    }

    pub fn depth(&self, idx: usize) -> u32 {
        self.depths[idx]
    }

    pub fn children_of(&self, idx: usize) -> &[usize] {
        &self.children[idx]
    }

    pub fn index_of(&self, step_id: &str) -> Option<usize> {
        self.index.get(step_id).copied()
    }

    /// 在子步骤中查找生产指定材料的步骤
    pub fn child_producing(&self, idx: usize, type_id: TypeId) -> Option<usize> {
        self.children[idx]
            .iter()
            .copied()
            .find(|&c| self.steps[c].product_type_id == type_id)
    }

    /// 后序遍历下标序列 (子先于父)
    pub fn post_order(&self) -> Vec<usize> {
        let mut out = Vec::with_capacity(self.steps.len());
        self.post_order_visit(self.root, &mut out);
        out
    }

    fn post_order_visit(&self, idx: usize, out: &mut Vec<usize>) {
        for &c in &self.children[idx] {
            self.post_order_visit(c, out);
        }
        out.push(idx);
    }

    /// 收集某步骤整棵子树的下标 (含自身, 先序)
    pub fn subtree_of(&self, idx: usize) -> Vec<usize> {
        let mut out = Vec::new();
        let mut stack = vec![idx];
        while let Some(i) = stack.pop() {
            out.push(i);
            stack.extend(self.children[i].iter().copied());
        }
        out
    }

    /// 树内出现的全部产物类型 (配方批量预取用)
    pub fn product_type_ids(&self) -> Vec<TypeId> {
        let mut ids: Vec<TypeId> = self.steps.iter().map(|s| s.product_type_id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{ActivityKind, RigLevel, SecurityClass, StructureType};

    fn step(id: &str, parent: Option<&str>, product: TypeId) -> PlanStep {
        PlanStep {
            step_id: id.to_string(),
            plan_id: "P001".to_string(),
            product_type_id: product,
            blueprint_type_id: product + 1,
            activity: ActivityKind::Manufacturing,
            material_efficiency: 0,
            time_efficiency: 0,
            structure_type: StructureType::Station,
            rig_level: RigLevel::None,
            security: SecurityClass::HighSec,
            facility_tax_rate: 0.0,
            parent_step_id: parent.map(|s| s.to_string()),
            output_location_id: None,
        }
    }

    #[test]
    fn test_build_and_post_order() {
        let tree = StepTree::build(
            "P001",
            vec![
                step("ROOT", None, 100),
                step("A", Some("ROOT"), 200),
                step("B", Some("ROOT"), 300),
                step("A1", Some("A"), 400),
            ],
        )
        .unwrap();

        assert_eq!(tree.len(), 4);
        assert_eq!(tree.depth(tree.index_of("A1").unwrap()), 2);

        let order = tree.post_order();
        let pos =
            |id: &str| order.iter().position(|&i| tree.step(i).step_id == id).unwrap();
        // 子先于父
        assert!(pos("A1") < pos("A"));
        assert!(pos("A") < pos("ROOT"));
        assert!(pos("B") < pos("ROOT"));
    }

    #[test]
    fn test_build_rejects_cycle() {
        // A <-> B 互为父子, 且根独立存在
        let err = StepTree::build(
            "P001",
            vec![
                step("ROOT", None, 100),
                step("A", Some("B"), 200),
                step("B", Some("A"), 300),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, StepTreeError::Cycle(_)));
    }

    #[test]
    fn test_build_rejects_multiple_roots() {
        let err = StepTree::build(
            "P001",
            vec![step("R1", None, 100), step("R2", None, 200)],
        )
        .unwrap_err();
        assert!(matches!(err, StepTreeError::MultipleRoots(_, _)));
    }

    #[test]
    fn test_build_rejects_foreign_parent() {
        let err = StepTree::build(
            "P001",
            vec![step("ROOT", None, 100), step("A", Some("GHOST"), 200)],
        )
        .unwrap_err();
        assert!(matches!(err, StepTreeError::ParentNotFound { .. }));
    }
}
