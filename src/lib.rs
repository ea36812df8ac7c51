//! # Assignment Annotator
//!
//! 老师给作业文档做分段标注、按文件名把学生提交分配到作业、
//! 并为自动生成的试卷计算题型和分值分配。
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 数据层（Models）
//! - `models/` - 作业配置、标记、学生、导入文档等纯数据结构
//! - `models/loaders` - 从目录读取作业配置（JSON / TOML）和提交文件列表
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，全部是同步纯函数
//! - `MarkerState` - 标记列表的 reducer
//! - `migrator` - 旧版标记迁移
//! - `highlight_renderer` - 在 HTML 中加 / 去高亮
//! - `allocation` - 题型、DOK、分值分配
//! - `FileMatcher` - 文件名与学生 / 作业的匹配
//!
//! ### ③ 流程层（Workflow）
//! - `AnnotationSession` - 标记操作 + 重新渲染高亮
//! - `SubmissionFilter` - 把提交文件分配到作业
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/watch_cycle` - 一次完整巡检，管理并发和统计
//!
//! ## 模块结构

pub mod config;
pub mod error;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult, ConfigError, FileError, MarkerError};
pub use models::{AssignmentConfig, ExcludeMarker, ImportedDocument, SectionMarker, Student};
pub use orchestrator::{App, CycleOutcome};
pub use services::{AllocationRequest, FileMatcher, MarkerAction, MarkerState, MatchStrictness};
pub use workflow::{AnnotationSession, RoutingReport, SubmissionFilter};
