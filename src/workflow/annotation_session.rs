//! 标注会话 - 流程层
//!
//! 持有一份作业配置和导入文档的 HTML。每次标记操作都经过纯函数 reducer
//! 得到新的状态，然后重新渲染高亮，保证页面上的高亮和标记列表一致。

use crate::error::MarkerError;
use crate::models::assignment::{AssignmentConfig, PointSummary};
use crate::models::document::ImportedDocument;
use crate::services::highlight_renderer::reapply_all;
use crate::services::marker_model::{MarkerAction, MarkerState};
use crate::utils::logging::truncate_text;
use tracing::{info, warn};

/// 标注会话
///
/// 所有操作都返回新的会话，原会话保持不变
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationSession {
    config: AssignmentConfig,
    state: MarkerState,
    source_html: String,
    rendered_html: String,
}

impl AnnotationSession {
    /// 用作业配置和导入的文档开始标注
    pub fn new(config: AssignmentConfig, document: &ImportedDocument) -> Self {
        let state = MarkerState::from_config(&config);
        let mut config = state.to_config(&config);
        if config.imported_filename.is_none() && !document.filename.trim().is_empty() {
            config.imported_filename = Some(document.filename.clone());
        }

        let rendered_html = reapply_all(&document.html, state.markers(), state.exclude_markers());

        Self {
            config,
            state,
            source_html: document.html.clone(),
            rendered_html,
        }
    }

    /// 执行一个标记操作并重新渲染高亮
    ///
    /// 校验失败时返回错误（需要提示老师），会话不发生变化
    pub fn dispatch(&self, action: MarkerAction) -> Result<Self, MarkerError> {
        let description = describe(&action);
        let state = match self.state.apply(action) {
            Ok(state) => state,
            Err(e) => {
                warn!("⚠️ {} 被拒绝: {}", description, e);
                return Err(e);
            }
        };

        if state == self.state {
            return Ok(self.clone());
        }

        let rendered_html = reapply_all(&self.rendered_html, state.markers(), state.exclude_markers());
        info!(
            "✏️ 《{}》{} (分段 {} 个, 排除 {} 个)",
            self.config.title,
            description,
            state.markers().len(),
            state.exclude_markers().len()
        );

        Ok(Self {
            config: state.to_config(&self.config),
            state,
            source_html: self.source_html.clone(),
            rendered_html,
        })
    }

    /// 重命名作业，旧标题进入别名列表
    pub fn rename(&self, new_title: &str) -> Self {
        Self {
            config: self.config.rename(new_title),
            ..self.clone()
        }
    }

    pub fn config(&self) -> &AssignmentConfig {
        &self.config
    }

    pub fn state(&self) -> &MarkerState {
        &self.state
    }

    /// 带高亮的 HTML
    pub fn html(&self) -> &str {
        &self.rendered_html
    }

    /// 导入时的原始 HTML
    pub fn source_html(&self) -> &str {
        &self.source_html
    }

    pub fn point_summary(&self) -> PointSummary {
        self.config.point_summary()
    }
}

fn describe(action: &MarkerAction) -> String {
    match action {
        MarkerAction::AddStart(text) => format!("添加开始标记「{}」", truncate_text(text, 30)),
        MarkerAction::AddEnd(text) => format!("添加结束标记「{}」", truncate_text(text, 30)),
        MarkerAction::AddExclude(text) => format!("添加排除标记「{}」", truncate_text(text, 30)),
        MarkerAction::SetEnd { index, text: Some(_) } => format!("修改第 {} 个分段的结束标记", index + 1),
        MarkerAction::SetEnd { index, text: None } => format!("清除第 {} 个分段的结束标记", index + 1),
        MarkerAction::SetPoints { index, points } => format!("第 {} 个分段设为 {} 分", index + 1, points),
        MarkerAction::SetCategory { index, category } => {
            format!("第 {} 个分段类别设为 {}", index + 1, category)
        }
        MarkerAction::Remove(index) => format!("删除第 {} 个分段", index + 1),
        MarkerAction::RemoveExclude(index) => format!("删除第 {} 个排除标记", index + 1),
        MarkerAction::Reset => "清空全部标记".to_string(),
    }
}
