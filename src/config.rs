use crate::error::{AppError, AppResult};
use crate::services::allocation::AllocationMode;
use crate::services::file_matcher::MatchStrictness;
use std::str::FromStr;

/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 作业配置文件（JSON / TOML）存放目录
    pub assignments_folder: String,
    /// 学生提交文件存放目录
    pub submissions_folder: String,
    /// 学生筛选条件（支持 "Last; First Middle" 格式）
    pub student_filter: Option<String>,
    /// 文件名匹配严格程度
    pub match_strictness: MatchStrictness,
    /// 同时加载的配置文件数量
    pub max_concurrent_loads: usize,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    // --- 试卷生成参数 ---
    pub total_questions: u32,
    pub total_points: u32,
    pub allocation_mode: AllocationMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            assignments_folder: "assignments".to_string(),
            submissions_folder: "submissions".to_string(),
            student_filter: None,
            match_strictness: MatchStrictness::Lenient,
            max_concurrent_loads: 8,
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
            total_questions: 20,
            total_points: 100,
            allocation_mode: AllocationMode::Legacy,
        }
    }
}

impl Config {
    /// 从环境变量读取配置，无法解析的值回退为默认值
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            assignments_folder: std::env::var("ASSIGNMENTS_FOLDER").unwrap_or(default.assignments_folder),
            submissions_folder: std::env::var("SUBMISSIONS_FOLDER").unwrap_or(default.submissions_folder),
            student_filter: std::env::var("STUDENT_FILTER").ok().filter(|v| !v.trim().is_empty()),
            match_strictness: std::env::var("MATCH_STRICTNESS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.match_strictness),
            max_concurrent_loads: std::env::var("MAX_CONCURRENT_LOADS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_concurrent_loads),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            total_questions: std::env::var("TOTAL_QUESTIONS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.total_questions),
            total_points: std::env::var("TOTAL_POINTS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.total_points),
            allocation_mode: std::env::var("ALLOCATION_MODE").ok().and_then(|v| v.parse().ok()).unwrap_or(default.allocation_mode),
        }
    }

    /// 从环境变量读取配置，遇到无法解析的值时返回错误
    pub fn try_from_env() -> AppResult<Self> {
        let lenient = Self::from_env();
        Ok(Self {
            match_strictness: parse_env("MATCH_STRICTNESS", "strictness")?.unwrap_or(lenient.match_strictness),
            max_concurrent_loads: parse_env("MAX_CONCURRENT_LOADS", "usize")?.unwrap_or(lenient.max_concurrent_loads),
            verbose_logging: parse_env("VERBOSE_LOGGING", "bool")?.unwrap_or(lenient.verbose_logging),
            total_questions: parse_env("TOTAL_QUESTIONS", "u32")?.unwrap_or(lenient.total_questions),
            total_points: parse_env("TOTAL_POINTS", "u32")?.unwrap_or(lenient.total_points),
            allocation_mode: parse_env("ALLOCATION_MODE", "allocation mode")?.unwrap_or(lenient.allocation_mode),
            ..lenient
        })
    }
}

fn parse_env<T: FromStr>(var_name: &str, expected_type: &str) -> AppResult<Option<T>> {
    match std::env::var(var_name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| AppError::env_parse_failed(var_name, value, expected_type)),
        Err(_) => Ok(None),
    }
}
