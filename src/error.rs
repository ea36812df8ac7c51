use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 标记操作被拒绝
    #[error("标记错误: {0}")]
    Marker(#[from] MarkerError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 标记操作错误
///
/// 这些错误都是"校验拒绝"：需要提示老师，但状态不会发生任何变化
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarkerError {
    /// 选中的文本太短
    #[error("选中的文本太短 ({len} 个字符)，至少需要 {min} 个字符")]
    SelectionTooShort { len: usize, min: usize },
    /// 选中的文本太长
    #[error("选中的文本太长 ({len} 个字符)，最多允许 {max} 个字符")]
    SelectionTooLong { len: usize, max: usize },
    /// 没有等待结束标记的开始标记
    #[error("没有未闭合的开始标记，请先添加开始标记")]
    NoOpenStartMarker,
    /// 索引超出范围
    #[error("标记索引 {index} 超出范围 (共 {len} 个)")]
    IndexOutOfRange { index: usize, len: usize },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 目录不存在
    #[error("目录不存在: {path}")]
    DirectoryNotFound { path: String },
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 不支持的配置文件格式
    #[error("不支持的配置文件格式: {path}")]
    UnsupportedFormat { path: String },
    /// JSON 解析失败
    #[error("JSON解析失败 ({path}): {source}")]
    JsonParseFailed {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// 配置错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件读取错误
    pub fn file_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建环境变量解析错误
    pub fn env_parse_failed(
        var_name: impl Into<String>,
        value: impl Into<String>,
        expected_type: impl Into<String>,
    ) -> Self {
        AppError::Config(ConfigError::EnvVarParseFailed {
            var_name: var_name.into(),
            value: value.into(),
            expected_type: expected_type.into(),
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
