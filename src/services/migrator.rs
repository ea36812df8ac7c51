//! 旧版标记迁移
//!
//! 旧版配置的标记可能是纯字符串，或者是缺少 `points` 字段的对象。
//! 加载时统一升级为当前格式，并把 `100 - 努力分` 平均分给所有标记。

use crate::models::marker::{MarkerCategory, RawMarker, SectionMarker};
use tracing::{debug, info, warn};

/// 迁移后所有分段加努力分的满分
const MIGRATION_TOTAL_POINTS: u32 = 100;

/// 把旧版标记列表升级为当前格式
///
/// 只要列表中有一个旧版记录，所有标记都会重新分配分值：
/// 每个标记 `floor(available / N)` 分，余数全部加到第一个标记上。
/// 已经是当前格式的列表原样返回，所以重复迁移不会改变结果。
pub fn migrate_legacy(markers: &[RawMarker], effort_points: u32) -> Vec<SectionMarker> {
    if markers.is_empty() {
        return Vec::new();
    }

    let needs_migration = markers.iter().any(RawMarker::is_legacy);
    let mut migrated: Vec<SectionMarker> = markers
        .iter()
        .enumerate()
        .map(|(idx, raw)| to_section_marker(idx as u64, raw))
        .collect();

    if !needs_migration {
        debug!("标记列表已是当前格式，无需迁移");
        return migrated;
    }

    let count = migrated.len() as u32;
    let available = MIGRATION_TOTAL_POINTS.saturating_sub(effort_points);
    let per_marker = available / count;
    let remainder = available % count;

    for marker in migrated.iter_mut() {
        marker.points = per_marker;
    }
    if let Some(first) = migrated.first_mut() {
        first.points += remainder;
    }

    info!(
        "🔄 已迁移 {} 个旧版标记: 可分配 {} 分，每个 {} 分，余数 {} 分给第一个标记",
        count, available, per_marker, remainder
    );

    migrated
}

fn to_section_marker(id: u64, raw: &RawMarker) -> SectionMarker {
    match raw {
        RawMarker::Text(start) => SectionMarker::new(id, start.clone()),
        RawMarker::Record(record) => SectionMarker {
            id,
            start: record.start.clone(),
            end: record.end.clone(),
            points: record.points.unwrap_or(0),
            category: resolve_category(record.category.as_deref()),
        },
    }
}

fn resolve_category(category: Option<&str>) -> MarkerCategory {
    match category {
        None => MarkerCategory::Written,
        Some(raw) => MarkerCategory::from_alias(raw).unwrap_or_else(|| {
            warn!("未知的标记类别 '{}'，按 written 处理", raw);
            MarkerCategory::Written
        }),
    }
}
