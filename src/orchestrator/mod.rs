//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 负责一次完整的巡检：加载作业配置、列出提交文件、分配文件、
//! 输出试卷生成的分值方案。本层只做调度和统计，不做具体业务判断。
//!
//! ## 层次关系
//!
//! ```text
//! watch_cycle::App (一次巡检)
//!     ↓
//! workflow::SubmissionFilter (按学生 / 作业分配文件)
//!     ↓
//! services (能力层：file_matcher / allocation)
//!     ↓
//! models::loaders (读取作业配置 / 列出提交文件)
//! ```

pub mod watch_cycle;

pub use watch_cycle::{App, CycleOutcome};
