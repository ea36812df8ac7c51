use phf::phf_map;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 标记的运行时 ID
///
/// 创建时由计数器分配，会话内不会复用；不参与序列化
pub type MarkerId = u64;

/// 分段的题型类别
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarkerCategory {
    /// 书面作答
    #[default]
    #[serde(rename = "written")]
    Written,
    /// 填空
    #[serde(rename = "fill-blank")]
    FillBlank,
    /// 词汇
    #[serde(rename = "vocabulary")]
    Vocabulary,
    /// 连线匹配
    #[serde(rename = "matching")]
    Matching,
}

/// 旧版配置中出现过的类别写法
static CATEGORY_ALIASES: phf::Map<&'static str, MarkerCategory> = phf_map! {
    "written" => MarkerCategory::Written,
    "writing" => MarkerCategory::Written,
    "short_answer" => MarkerCategory::Written,
    "short-answer" => MarkerCategory::Written,
    "essay" => MarkerCategory::Written,
    "fill-blank" => MarkerCategory::FillBlank,
    "fill_blank" => MarkerCategory::FillBlank,
    "fillblank" => MarkerCategory::FillBlank,
    "fill-in-the-blank" => MarkerCategory::FillBlank,
    "fill_in_the_blank" => MarkerCategory::FillBlank,
    "vocabulary" => MarkerCategory::Vocabulary,
    "vocab" => MarkerCategory::Vocabulary,
    "matching" => MarkerCategory::Matching,
    "match" => MarkerCategory::Matching,
};

impl MarkerCategory {
    /// 获取标准名称
    pub fn as_str(self) -> &'static str {
        match self {
            MarkerCategory::Written => "written",
            MarkerCategory::FillBlank => "fill-blank",
            MarkerCategory::Vocabulary => "vocabulary",
            MarkerCategory::Matching => "matching",
        }
    }

    /// 从旧版写法解析类别（大小写不敏感）
    pub fn from_alias(s: &str) -> Option<Self> {
        CATEGORY_ALIASES
            .get(s.trim().to_lowercase().as_str())
            .copied()
    }
}

impl fmt::Display for MarkerCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 分段标记
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionMarker {
    #[serde(skip)]
    pub id: MarkerId,
    pub start: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    pub points: u32,
    #[serde(default)]
    pub category: MarkerCategory,
}

impl SectionMarker {
    /// 新建一个只有开始文本的标记
    pub fn new(id: MarkerId, start: impl Into<String>) -> Self {
        Self {
            id,
            start: start.into(),
            end: None,
            points: 0,
            category: MarkerCategory::Written,
        }
    }

    /// 是否还在等待结束标记
    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }
}

/// 排除标记：这段文字既不计分也不扣分
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludeMarker {
    #[serde(skip)]
    pub id: MarkerId,
    pub text: String,
}

impl ExcludeMarker {
    pub fn new(id: MarkerId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }
}

/// 旧版配置中的标记记录
///
/// 旧版可能直接存字符串，也可能是缺少 `points` 的对象
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawMarker {
    Text(String),
    Record(RawMarkerRecord),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMarkerRecord {
    pub start: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl RawMarker {
    /// 是否需要迁移到当前格式
    pub fn is_legacy(&self) -> bool {
        match self {
            RawMarker::Text(_) => true,
            RawMarker::Record(record) => record.points.is_none(),
        }
    }
}

impl From<SectionMarker> for RawMarker {
    fn from(marker: SectionMarker) -> Self {
        RawMarker::Record(RawMarkerRecord {
            start: marker.start,
            end: marker.end,
            points: Some(marker.points),
            category: Some(marker.category.as_str().to_string()),
        })
    }
}

impl From<&str> for RawMarker {
    fn from(text: &str) -> Self {
        RawMarker::Text(text.to_string())
    }
}

/// 高亮的角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HighlightRole {
    Start,
    End,
    Exclude,
}

impl HighlightRole {
    pub fn as_str(self) -> &'static str {
        match self {
            HighlightRole::Start => "start",
            HighlightRole::End => "end",
            HighlightRole::Exclude => "exclude",
        }
    }

    /// 高亮背景色
    pub fn color(self) -> &'static str {
        match self {
            HighlightRole::Start => "#c8e6c9",
            HighlightRole::End => "#ffcdd2",
            HighlightRole::Exclude => "#e0e0e0",
        }
    }
}

/// 高亮 span 的 ID，格式为 `{role}-{index}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HighlightId {
    pub role: HighlightRole,
    pub index: MarkerId,
}

impl HighlightId {
    pub fn new(role: HighlightRole, index: MarkerId) -> Self {
        Self { role, index }
    }
}

impl fmt::Display for HighlightId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.role.as_str(), self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_aliases() {
        assert_eq!(MarkerCategory::from_alias("Fill_Blank"), Some(MarkerCategory::FillBlank));
        assert_eq!(MarkerCategory::from_alias(" vocab "), Some(MarkerCategory::Vocabulary));
        assert_eq!(MarkerCategory::from_alias("matching"), Some(MarkerCategory::Matching));
        assert_eq!(MarkerCategory::from_alias("diagram"), None);
    }

    #[test]
    fn test_raw_marker_deserialize_mixed_list() {
        let json = r#"["Summary:", {"start": "Vocabulary:", "category": "vocabulary"}, {"start": "Q3", "points": 10}]"#;
        let markers: Vec<RawMarker> = serde_json::from_str(json).unwrap();

        assert_eq!(markers[0], RawMarker::Text("Summary:".to_string()));
        assert!(markers[0].is_legacy());
        assert!(markers[1].is_legacy());
        assert!(!markers[2].is_legacy());
    }

    #[test]
    fn test_section_marker_serializes_without_id() {
        let mut marker = SectionMarker::new(7, "Summary:");
        marker.category = MarkerCategory::FillBlank;
        let json = serde_json::to_value(&marker).unwrap();

        assert!(json.get("id").is_none());
        assert!(json.get("end").is_none());
        assert_eq!(json["category"], "fill-blank");
    }

    #[test]
    fn test_highlight_id_format() {
        assert_eq!(HighlightId::new(HighlightRole::Start, 0).to_string(), "start-0");
        assert_eq!(HighlightId::new(HighlightRole::Exclude, 12).to_string(), "exclude-12");
    }
}
