//! 标记模型 - 业务能力层
//!
//! 标记列表的所有修改都是纯函数：`(state, action) -> state`。
//! 传入的状态永远不会被原地修改，校验失败时返回错误，状态保持不变。

use crate::error::MarkerError;
use crate::models::assignment::AssignmentConfig;
use crate::models::marker::{ExcludeMarker, MarkerCategory, MarkerId, SectionMarker};
use tracing::debug;

/// 选中文本的最少字符数
pub const MIN_SELECTION_CHARS: usize = 3;
/// 选中文本的最多字符数
pub const MAX_SELECTION_CHARS: usize = 2000;

/// 去掉首尾空白，并把连续空白合并为一个空格（保留大小写）
pub fn normalize_selection(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 校验选中文本长度，返回规范化后的文本
pub fn validate_selection(text: &str) -> Result<String, MarkerError> {
    let normalized = normalize_selection(text);
    let len = normalized.chars().count();

    if len < MIN_SELECTION_CHARS {
        return Err(MarkerError::SelectionTooShort {
            len,
            min: MIN_SELECTION_CHARS,
        });
    }
    if len > MAX_SELECTION_CHARS {
        return Err(MarkerError::SelectionTooLong {
            len,
            max: MAX_SELECTION_CHARS,
        });
    }

    Ok(normalized)
}

/// 标记操作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerAction {
    /// 开始模式下选中文本
    AddStart(String),
    /// 结束模式下选中文本，挂到第一个未闭合的标记上
    AddEnd(String),
    AddExclude(String),
    /// 设置或清除某个标记的结束文本
    SetEnd { index: usize, text: Option<String> },
    SetPoints { index: usize, points: u32 },
    SetCategory { index: usize, category: MarkerCategory },
    Remove(usize),
    RemoveExclude(usize),
    /// 清空全部标记
    Reset,
}

/// 一份作业的标记状态
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkerState {
    markers: Vec<SectionMarker>,
    exclude_markers: Vec<ExcludeMarker>,
    next_marker_id: MarkerId,
    next_exclude_id: MarkerId,
}

impl MarkerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从已有标记构建状态，按列表顺序重新编号
    pub fn from_parts(markers: Vec<SectionMarker>, exclude_markers: Vec<ExcludeMarker>) -> Self {
        let markers: Vec<SectionMarker> = markers
            .into_iter()
            .enumerate()
            .map(|(idx, m)| SectionMarker { id: idx as u64, ..m })
            .collect();
        let exclude_markers: Vec<ExcludeMarker> = exclude_markers
            .into_iter()
            .enumerate()
            .map(|(idx, e)| ExcludeMarker { id: idx as u64, ..e })
            .collect();

        Self {
            next_marker_id: markers.len() as u64,
            next_exclude_id: exclude_markers.len() as u64,
            markers,
            exclude_markers,
        }
    }

    pub fn from_config(config: &AssignmentConfig) -> Self {
        Self::from_parts(config.markers.clone(), config.exclude_markers.clone())
    }

    /// 把当前标记写回一份新的作业配置
    pub fn to_config(&self, config: &AssignmentConfig) -> AssignmentConfig {
        AssignmentConfig {
            markers: self.markers.clone(),
            exclude_markers: self.exclude_markers.clone(),
            ..config.clone()
        }
    }

    pub fn markers(&self) -> &[SectionMarker] {
        &self.markers
    }

    pub fn exclude_markers(&self) -> &[ExcludeMarker] {
        &self.exclude_markers
    }

    /// 第一个还没有结束文本的标记
    pub fn open_marker_index(&self) -> Option<usize> {
        self.markers.iter().position(SectionMarker::is_open)
    }

    /// 执行一个操作，返回新的状态
    pub fn apply(&self, action: MarkerAction) -> Result<Self, MarkerError> {
        let mut next = self.clone();

        match action {
            MarkerAction::AddStart(text) => {
                let start = validate_selection(&text)?;
                if next.markers.iter().any(|m| m.start == start) {
                    debug!("开始标记已存在，忽略: {}", start);
                    return Ok(next);
                }
                let id = next.next_marker_id;
                next.next_marker_id += 1;
                next.markers.push(SectionMarker::new(id, start));
            }
            MarkerAction::AddEnd(text) => {
                let end = validate_selection(&text)?;
                let index = next
                    .open_marker_index()
                    .ok_or(MarkerError::NoOpenStartMarker)?;
                next.markers[index].end = Some(end);
            }
            MarkerAction::AddExclude(text) => {
                let text = validate_selection(&text)?;
                if next.exclude_markers.iter().any(|e| e.text == text) {
                    debug!("排除标记已存在，忽略: {}", text);
                    return Ok(next);
                }
                let id = next.next_exclude_id;
                next.next_exclude_id += 1;
                next.exclude_markers.push(ExcludeMarker::new(id, text));
            }
            MarkerAction::SetEnd { index, text } => {
                let end = text.as_deref().map(validate_selection).transpose()?;
                next.marker_mut(index)?.end = end;
            }
            MarkerAction::SetPoints { index, points } => {
                next.marker_mut(index)?.points = points;
            }
            MarkerAction::SetCategory { index, category } => {
                next.marker_mut(index)?.category = category;
            }
            MarkerAction::Remove(index) => {
                next.check_marker_index(index)?;
                next.markers.remove(index);
            }
            MarkerAction::RemoveExclude(index) => {
                let len = next.exclude_markers.len();
                if index >= len {
                    return Err(MarkerError::IndexOutOfRange { index, len });
                }
                next.exclude_markers.remove(index);
            }
            MarkerAction::Reset => {
                next.markers.clear();
                next.exclude_markers.clear();
            }
        }

        Ok(next)
    }

    pub fn add_start_marker(&self, text: &str) -> Result<Self, MarkerError> {
        self.apply(MarkerAction::AddStart(text.to_string()))
    }

    pub fn add_end_marker(&self, text: &str) -> Result<Self, MarkerError> {
        self.apply(MarkerAction::AddEnd(text.to_string()))
    }

    pub fn add_exclude_marker(&self, text: &str) -> Result<Self, MarkerError> {
        self.apply(MarkerAction::AddExclude(text.to_string()))
    }

    pub fn set_end_marker(&self, index: usize, text: Option<&str>) -> Result<Self, MarkerError> {
        self.apply(MarkerAction::SetEnd {
            index,
            text: text.map(str::to_string),
        })
    }

    pub fn remove_marker(&self, index: usize) -> Result<Self, MarkerError> {
        self.apply(MarkerAction::Remove(index))
    }

    fn check_marker_index(&self, index: usize) -> Result<(), MarkerError> {
        let len = self.markers.len();
        if index >= len {
            return Err(MarkerError::IndexOutOfRange { index, len });
        }
        Ok(())
    }

    fn marker_mut(&mut self, index: usize) -> Result<&mut SectionMarker, MarkerError> {
        self.check_marker_index(index)?;
        Ok(&mut self.markers[index])
    }
}
