use serde::{Deserialize, Serialize};

/// 文档转换服务返回的导入结果（Word / PDF → HTML）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportedDocument {
    pub text: String,
    pub html: String,
    pub filename: String,
}

impl ImportedDocument {
    pub fn new(
        text: impl Into<String>,
        html: impl Into<String>,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            html: html.into(),
            filename: filename.into(),
        }
    }
}
