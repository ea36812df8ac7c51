//! 试卷分配 - 业务能力层
//!
//! 把题量、DOK 等级和总分拆分到各个类别，所有函数都是纯函数。

use crate::models::assessment::{DokLevel, QuestionType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use tracing::debug;

pub type QuestionTypeCounts = BTreeMap<QuestionType, u32>;
pub type DokDistribution = BTreeMap<DokLevel, u32>;
pub type PointsPerType = BTreeMap<QuestionType, u32>;

/// 分值微调的最大迭代次数
pub const MAX_ADJUSTMENT_ITERATIONS: usize = 100;

/// 分值分配方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllocationMode {
    /// 每种题型统一分值，尽量接近总分（可能达不到）
    #[default]
    Legacy,
    /// 最大余数法，总分精确相等
    Exact,
}

impl FromStr for AllocationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "legacy" => Ok(AllocationMode::Legacy),
            "exact" => Ok(AllocationMode::Exact),
            other => Err(format!("未知的分配方式: {}", other)),
        }
    }
}

/// 按比例拆分，最后一个类别吸收余数
///
/// 四舍五入后前面的类别之和可能已经超过总数，这时从最大的类别里扣回去
fn split_by_ratio<K: Ord + Copy>(total: u32, keys: &[K], ratio: impl Fn(K) -> f64) -> BTreeMap<K, u32> {
    let mut counts = BTreeMap::new();
    let Some((&last, rest)) = keys.split_last() else {
        return counts;
    };

    for &key in rest {
        let count = (f64::from(total) * ratio(key)).round().max(0.0) as u32;
        counts.insert(key, count);
    }

    let assigned: u32 = counts.values().sum();
    counts.insert(last, total.saturating_sub(assigned));

    let mut overshoot = assigned.saturating_sub(total);
    while overshoot > 0 {
        let Some((&largest, &value)) = counts.iter().rev().max_by_key(|&(_, &v)| v) else {
            break;
        };
        if value == 0 {
            break;
        }
        let take = value.min(overshoot);
        counts.insert(largest, value - take);
        overshoot -= take;
    }

    counts
}

/// 按固定比例分配题型数量，连线题吸收余数
pub fn distribute_questions(total: u32) -> QuestionTypeCounts {
    split_by_ratio(total, &QuestionType::ALL, QuestionType::ratio)
}

/// 按固定比例分配 DOK 等级，4 级吸收余数
pub fn distribute_dok(total: u32) -> DokDistribution {
    split_by_ratio(total, &DokLevel::ALL, DokLevel::ratio)
}

fn running_total(counts: &QuestionTypeCounts, points: &PointsPerType) -> u64 {
    counts
        .iter()
        .map(|(t, &count)| u64::from(count) * u64::from(points.get(t).copied().unwrap_or(0)))
        .sum()
}

/// 计算每种题型每题的分值
///
/// 先按权重缩放，再逐次给某个题型 +1 分，使总分尽量接近但不超过目标。
/// 任何一次 +1 都会超出目标时停止，返回能达到的最佳结果。
pub fn distribute_points(total_points: u32, counts: &QuestionTypeCounts) -> PointsPerType {
    let mut points: PointsPerType = QuestionType::ALL.iter().map(|&t| (t, t.weight())).collect();

    let active: Vec<(QuestionType, u32)> = counts
        .iter()
        .filter(|&(_, &count)| count > 0)
        .map(|(&t, &count)| (t, count))
        .collect();

    let weighted_sum: u64 = active
        .iter()
        .map(|&(t, count)| u64::from(count) * u64::from(t.weight()))
        .sum();
    if weighted_sum == 0 {
        return points;
    }

    let scale = f64::from(total_points) / weighted_sum as f64;
    for &(t, _) in &active {
        let scaled = (f64::from(t.weight()) * scale).floor() as u32;
        points.insert(t, scaled.max(1));
    }

    let target = u64::from(total_points);
    let mut current = running_total(counts, &points);
    let mut iterations = 0;

    while current < target && iterations < MAX_ADJUSTMENT_ITERATIONS {
        iterations += 1;

        // 选择 +1 后最接近目标且不超出的题型
        let best = active
            .iter()
            .filter(|&&(_, count)| current + u64::from(count) <= target)
            .fold(None::<(QuestionType, u32)>, |best, &(t, count)| match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((t, count)),
            });

        match best {
            Some((t, count)) => {
                if let Some(p) = points.get_mut(&t) {
                    *p += 1;
                }
                current += u64::from(count);
            }
            None => {
                debug!(
                    "任何题型 +1 都会超出总分，停止微调: {} / {}",
                    current, total_points
                );
                break;
            }
        }
    }

    debug!(
        "分值分配完成: {} / {} (迭代 {} 次)",
        current, total_points, iterations
    );
    points
}

/// 某个题型的分值预算
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeBudget {
    pub count: u32,
    /// 该题型的总分
    pub total: u32,
    /// 每题基础分
    pub base: u32,
    /// 前 `extra` 道题各多 1 分
    pub extra: u32,
}

impl TypeBudget {
    fn new(count: u32, total: u32) -> Self {
        Self {
            count,
            total,
            base: total / count,
            extra: total % count,
        }
    }

    fn uniform(count: u32, points: u32) -> Self {
        Self {
            count,
            total: count * points,
            base: points,
            extra: 0,
        }
    }
}

/// 用最大余数法精确分配总分
///
/// 每道题至少 1 分，剩余分值按 `题量 × 权重` 的比例分给各题型。
/// 总分不少于题目总数时，各题型总分之和严格等于 `total_points`。
pub fn distribute_point_budget(
    total_points: u32,
    counts: &QuestionTypeCounts,
) -> BTreeMap<QuestionType, TypeBudget> {
    let active: Vec<(QuestionType, u32)> = counts
        .iter()
        .filter(|&(_, &count)| count > 0)
        .map(|(&t, &count)| (t, count))
        .collect();

    let total_questions: u32 = active.iter().map(|&(_, count)| count).sum();
    if total_questions == 0 {
        return BTreeMap::new();
    }

    if total_points < total_questions {
        debug!(
            "总分 {} 少于题目数 {}，每题 1 分",
            total_points, total_questions
        );
        return active
            .into_iter()
            .map(|(t, count)| (t, TypeBudget::uniform(count, 1)))
            .collect();
    }

    let remaining = u64::from(total_points - total_questions);
    let weights: Vec<u64> = active
        .iter()
        .map(|&(t, count)| u64::from(count) * u64::from(t.weight()))
        .collect();
    let weight_sum: u64 = weights.iter().sum();

    let mut shares: Vec<u64> = weights.iter().map(|w| remaining * w / weight_sum).collect();
    let leftover = remaining - shares.iter().sum::<u64>();

    // 余数大的优先，余数相同按题型顺序
    let mut order: Vec<usize> = (0..active.len()).collect();
    order.sort_by(|&a, &b| {
        let ra = remaining * weights[a] % weight_sum;
        let rb = remaining * weights[b] % weight_sum;
        rb.cmp(&ra).then(a.cmp(&b))
    });
    for &idx in order.iter().take(leftover as usize) {
        shares[idx] += 1;
    }

    active
        .iter()
        .zip(shares)
        .map(|(&(t, count), share)| (t, TypeBudget::new(count, count + share as u32)))
        .collect()
}

/// 试卷生成参数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationRequest {
    pub total_questions: u32,
    pub total_points: u32,
    #[serde(default)]
    pub mode: AllocationMode,
}

/// 分配结果，每次参数变化都重新计算
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationResult {
    pub total_questions: u32,
    pub total_points: u32,
    pub question_type_counts: QuestionTypeCounts,
    pub dok_distribution: DokDistribution,
    /// 每题分值（精确模式下为基础分）
    pub points_per_type: PointsPerType,
    pub budgets: BTreeMap<QuestionType, TypeBudget>,
    /// 实际能达到的总分
    pub achieved_points: u32,
}

impl AllocationResult {
    pub fn is_exact(&self) -> bool {
        self.achieved_points == self.total_points
    }
}

impl AllocationRequest {
    pub fn new(total_questions: u32, total_points: u32) -> Self {
        Self {
            total_questions,
            total_points,
            mode: AllocationMode::Legacy,
        }
    }

    pub fn with_mode(mut self, mode: AllocationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn allocate(&self) -> AllocationResult {
        let question_type_counts = distribute_questions(self.total_questions);
        let dok_distribution = distribute_dok(self.total_questions);

        let (points_per_type, budgets) = match self.mode {
            AllocationMode::Legacy => {
                let points = distribute_points(self.total_points, &question_type_counts);
                let budgets: BTreeMap<QuestionType, TypeBudget> = question_type_counts
                    .iter()
                    .filter(|&(_, &count)| count > 0)
                    .map(|(&t, &count)| {
                        let per_question = points.get(&t).copied().unwrap_or(1);
                        (t, TypeBudget::uniform(count, per_question))
                    })
                    .collect();
                (points, budgets)
            }
            AllocationMode::Exact => {
                let budgets = distribute_point_budget(self.total_points, &question_type_counts);
                let points: PointsPerType = budgets.iter().map(|(&t, b)| (t, b.base)).collect();
                (points, budgets)
            }
        };
        let achieved_points = budgets.values().map(|b| b.total).sum();

        AllocationResult {
            total_questions: self.total_questions,
            total_points: self.total_points,
            question_type_counts,
            dok_distribution,
            points_per_type,
            budgets,
            achieved_points,
        }
    }
}
