//! 巡检流程 - 编排层
//!
//! 1. **初始化**：写日志文件头、打印启动信息
//! 2. **批量加载**：并发读取作业配置（Semaphore 限流），列出提交文件
//! 3. **分配**：交给 `SubmissionFilter` 按学生和作业分配
//! 4. **试卷方案**：按配置计算题型、DOK 和分值分配
//! 5. **统计**：输出结果并写入日志文件

use crate::config::Config;
use crate::models::assignment::AssignmentConfig;
use crate::models::{list_submission_files, load_all_assignment_configs};
use crate::services::allocation::{AllocationRequest, AllocationResult};
use crate::utils::logging::{
    append_log, init_log_file, log_allocation, log_inputs_loaded, log_routing_report,
    log_startup, print_final_stats,
};
use crate::workflow::{RoutingReport, SubmissionFilter};
use anyhow::{Context, Result};
use tracing::{info, warn};

/// 一次巡检的结果
#[derive(Debug, Clone)]
pub struct CycleOutcome {
    pub assignments: Vec<AssignmentConfig>,
    pub report: RoutingReport,
    pub allocation: AllocationResult,
}

/// 应用主结构
pub struct App {
    config: Config,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        init_log_file(&config.output_log_file)
            .with_context(|| format!("无法创建日志文件: {}", config.output_log_file))?;

        log_startup(&config);

        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 运行一次巡检
    pub async fn run(&self) -> Result<CycleOutcome> {
        info!("\n📁 正在扫描作业配置和提交文件...");
        let assignments = load_all_assignment_configs(
            &self.config.assignments_folder,
            self.config.max_concurrent_loads,
        )
        .await?;
        let submissions = list_submission_files(&self.config.submissions_folder).await?;

        log_inputs_loaded(assignments.len(), submissions.len());

        if assignments.is_empty() {
            warn!("⚠️ 没有找到作业配置，所有文件都会被记为未匹配");
        }

        let filter = SubmissionFilter::new(&self.config);
        let report = filter.route(&submissions, &assignments);
        log_routing_report(&report);

        let allocation = AllocationRequest::new(self.config.total_questions, self.config.total_points)
            .with_mode(self.config.allocation_mode)
            .allocate();
        log_allocation(&allocation);

        append_log(&self.config.output_log_file, &report.to_string())?;
        print_final_stats(&report, &self.config.output_log_file);

        Ok(CycleOutcome {
            assignments,
            report,
            allocation,
        })
    }
}
