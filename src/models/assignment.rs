use crate::models::marker::{ExcludeMarker, MarkerCategory, RawMarker, SectionMarker};
use crate::services::migrator::migrate_legacy;
use serde::{Deserialize, Serialize};

fn default_total_points() -> u32 {
    100
}

/// 评分标准类型
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RubricType {
    #[default]
    Standard,
    Custom,
}

/// 自定义评分标准中的一项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RubricCriterion {
    pub name: String,
    pub weight: f64,
    #[serde(default)]
    pub description: String,
}

/// 作业配置
///
/// 由外部持久化服务保存，这里只定义内存中的结构
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentConfig {
    pub title: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default = "default_total_points")]
    pub total_points: u32,
    #[serde(default)]
    pub markers: Vec<SectionMarker>,
    #[serde(default)]
    pub exclude_markers: Vec<ExcludeMarker>,
    #[serde(default)]
    pub effort_points: u32,
    #[serde(default)]
    pub section_template: String,
    /// 历史标题，只追加不修改
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub rubric_type: RubricType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_rubric: Option<Vec<RubricCriterion>>,
    /// 导入文档的原始文件名
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imported_filename: Option<String>,
}

/// 分值汇总
///
/// 分值之和与总分不一致时只做提示，不会拒绝保存
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointSummary {
    pub marker_points: u32,
    pub effort_points: u32,
    pub total_points: u32,
}

impl PointSummary {
    pub fn assigned(&self) -> u32 {
        self.marker_points + self.effort_points
    }

    /// 已分配分值与总分的差值，正数表示超出
    pub fn difference(&self) -> i64 {
        i64::from(self.assigned()) - i64::from(self.total_points)
    }

    pub fn is_balanced(&self) -> bool {
        self.difference() == 0
    }
}

/// 交给评分服务的分段信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GradingSection {
    pub start: String,
    pub end: Option<String>,
    pub points: u32,
    pub category: MarkerCategory,
}

impl AssignmentConfig {
    /// 创建一个空白作业配置
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subject: String::new(),
            total_points: default_total_points(),
            markers: Vec::new(),
            exclude_markers: Vec::new(),
            effort_points: 0,
            section_template: String::new(),
            aliases: Vec::new(),
            rubric_type: RubricType::Standard,
            custom_rubric: None,
            imported_filename: None,
        }
    }

    /// 重命名作业，旧标题追加到别名列表中
    pub fn rename(&self, new_title: impl Into<String>) -> Self {
        let new_title = new_title.into();
        let mut aliases = self.aliases.clone();
        let old_title = self.title.trim();

        if !old_title.is_empty()
            && old_title != new_title.trim()
            && !aliases.iter().any(|alias| alias == old_title)
        {
            aliases.push(old_title.to_string());
        }

        Self {
            title: new_title,
            aliases,
            ..self.clone()
        }
    }

    /// 用于文件匹配的所有名称：当前标题、历史别名、导入文档文件名
    pub fn match_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.aliases.len() + 2);
        names.push(self.title.clone());
        names.extend(self.aliases.iter().cloned());

        if let Some(filename) = &self.imported_filename {
            let stem = std::path::Path::new(filename)
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| filename.clone());
            names.push(stem);
        }

        names.retain(|name| !name.trim().is_empty());
        names
    }

    pub fn point_summary(&self) -> PointSummary {
        PointSummary {
            marker_points: self.markers.iter().map(|m| m.points).sum(),
            effort_points: self.effort_points,
            total_points: self.total_points,
        }
    }

    pub fn grading_sections(&self) -> Vec<GradingSection> {
        self.markers
            .iter()
            .map(|m| GradingSection {
                start: m.start.clone(),
                end: m.end.clone(),
                points: m.points,
                category: m.category,
            })
            .collect()
    }

    pub fn excluded_texts(&self) -> Vec<&str> {
        self.exclude_markers.iter().map(|e| e.text.as_str()).collect()
    }
}

/// 持久化格式的作业配置，标记列表可能还是旧版格式
#[derive(Debug, Clone, Deserialize)]
pub struct StoredAssignmentConfig {
    #[serde(default)]
    pub markers: Vec<RawMarker>,
    #[serde(flatten)]
    pub config: AssignmentConfig,
}

impl StoredAssignmentConfig {
    /// 迁移旧版标记并为所有标记编号
    pub fn into_config(self) -> AssignmentConfig {
        let markers = migrate_legacy(&self.markers, self.config.effort_points);
        let exclude_markers = self
            .config
            .exclude_markers
            .into_iter()
            .enumerate()
            .map(|(idx, e)| ExcludeMarker::new(idx as u64, e.text))
            .collect();

        AssignmentConfig {
            markers,
            exclude_markers,
            ..self.config
        }
    }
}
