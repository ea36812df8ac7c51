use anyhow::Result;
/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use std::fs::{self, OpenOptions};
use std::io::Write;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::services::allocation::AllocationResult;
use crate::workflow::RoutingReport;

/// 初始化 tracing 日志
///
/// 优先使用 `RUST_LOG`，否则按 `verbose` 选择 debug / info。
/// 重复调用不会报错（测试里可以放心调用）
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n作业标注日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 向日志文件追加一段内容
pub fn append_log(log_file_path: &str, content: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)?;
    writeln!(file, "{}", content)?;
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 作业标注与提交分配");
    info!("📁 作业目录: {}", config.assignments_folder);
    info!("📥 提交目录: {}", config.submissions_folder);
    info!("🎯 匹配模式: {:?}", config.match_strictness);
    if let Some(student) = &config.student_filter {
        info!("👤 学生筛选: {}", student);
    }
    info!("📊 最大并发数: {}", config.max_concurrent_loads);
    info!("{}", "=".repeat(60));
}

/// 记录作业和提交文件加载信息
///
/// # 参数
/// - `assignments`: 作业数量
/// - `submissions`: 提交文件数量
pub fn log_inputs_loaded(assignments: usize, submissions: usize) {
    info!("✓ 加载了 {} 份作业配置", assignments);
    info!("✓ 找到 {} 个提交文件\n", submissions);
}

/// 记录一次分配结果
pub fn log_routing_report(report: &RoutingReport) {
    info!("\n{}", "─".repeat(60));
    for (title, files) in &report.routed {
        info!("📄 《{}》: {} 个文件", title, files.len());
    }
    if !report.unmatched.is_empty() {
        info!("❓ 未匹配: {} 个文件", report.unmatched.len());
    }
    info!("{}", "─".repeat(60));
}

/// 记录题型和分值分配
pub fn log_allocation(result: &AllocationResult) {
    info!(
        "🧮 试卷生成: {} 题 / {} 分",
        result.total_questions, result.total_points
    );
    for (question_type, budget) in &result.budgets {
        info!(
            "   {:<16} {} 题, 共 {} 分",
            question_type.as_str(),
            budget.count,
            budget.total
        );
    }
    if !result.is_exact() {
        info!(
            "⚠️ 分值无法精确凑齐: 实际 {} / 目标 {}",
            result.achieved_points, result.total_points
        );
    }
}

/// 打印最终统计信息
///
/// # 参数
/// - `report`: 分配结果
/// - `log_file_path`: 日志文件路径
pub fn print_final_stats(report: &RoutingReport, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 本轮分配完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 已分配: {}", report.routed_count());
    info!("❓ 未匹配: {}", report.unmatched.len());
    info!("🚫 学生筛选排除: {}", report.filtered_out);
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text_counts_chars() {
        assert_eq!(truncate_text("Summary:", 30), "Summary:");
        assert_eq!(truncate_text("作业标注日志", 2), "作业...");
    }

    #[test]
    fn test_log_file_header_and_append() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.txt");
        let path = path.to_str().unwrap();

        init_log_file(path).unwrap();
        append_log(path, "《Reading Log》: a.pdf").unwrap();

        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("作业标注日志"));
        assert!(content.ends_with("《Reading Log》: a.pdf\n"));
    }
}
