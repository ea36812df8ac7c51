//! 提交文件筛选 - 流程层
//!
//! 每次老师应用筛选条件或自动巡检触发时，把提交目录里的文件
//! 按学生、按作业分配好，交给外部评分服务。

use crate::config::Config;
use crate::models::assignment::AssignmentConfig;
use crate::services::file_matcher::FileMatcher;
use std::collections::BTreeMap;
use std::fmt::Display;
use tracing::debug;

/// 一次分配的结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutingReport {
    /// 作业标题 → 匹配到的文件
    pub routed: BTreeMap<String, Vec<String>>,
    /// 没有匹配到任何作业的文件
    pub unmatched: Vec<String>,
    /// 学生筛选后剩下的文件数
    pub considered: usize,
    /// 被学生筛选排除的文件数
    pub filtered_out: usize,
}

impl RoutingReport {
    pub fn routed_count(&self) -> usize {
        self.routed.values().map(Vec::len).sum()
    }
}

impl Display for RoutingReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "[共 {} 个文件 | 已分配 {} 次 | 未匹配 {} 个 | 学生筛选排除 {} 个]",
            self.considered,
            self.routed_count(),
            self.unmatched.len(),
            self.filtered_out
        )?;
        for (title, files) in &self.routed {
            writeln!(f, "《{}》: {}", title, files.join(", "))?;
        }
        if !self.unmatched.is_empty() {
            writeln!(f, "未匹配: {}", self.unmatched.join(", "))?;
        }
        Ok(())
    }
}

/// 提交文件筛选流程
///
/// - 只处理文件名，不读取文件内容
/// - 一个文件可以同时匹配多个作业（宽松匹配）
pub struct SubmissionFilter {
    matcher: FileMatcher,
    student_query: Option<String>,
}

impl SubmissionFilter {
    pub fn new(config: &Config) -> Self {
        Self {
            matcher: FileMatcher::new(config.match_strictness),
            student_query: config.student_filter.clone(),
        }
    }

    pub fn with_matcher(matcher: FileMatcher, student_query: Option<String>) -> Self {
        Self {
            matcher,
            student_query,
        }
    }

    /// 按学生筛选，没有筛选条件时返回全部文件
    pub fn filter_by_student(&self, files: &[String]) -> Vec<String> {
        match &self.student_query {
            Some(query) => files
                .iter()
                .filter(|f| self.matcher.matches_student_query(f, query))
                .cloned()
                .collect(),
            None => files.to_vec(),
        }
    }

    /// 筛选属于某个作业的文件
    pub fn filter_by_assignment(&self, files: &[String], assignment: &AssignmentConfig) -> Vec<String> {
        let names = assignment.match_names();
        files
            .iter()
            .filter(|f| self.matcher.matches_assignment(f, &names))
            .cloned()
            .collect()
    }

    /// 先按学生筛选，再把文件分配到各个作业
    pub fn route(&self, files: &[String], assignments: &[AssignmentConfig]) -> RoutingReport {
        let candidates = self.filter_by_student(files);
        let mut report = RoutingReport {
            considered: candidates.len(),
            filtered_out: files.len() - candidates.len(),
            ..Default::default()
        };

        let assignment_names: Vec<(&str, Vec<String>)> = assignments
            .iter()
            .map(|a| (a.title.as_str(), a.match_names()))
            .collect();

        for file in candidates {
            let mut matched = false;
            for (title, names) in &assignment_names {
                if self.matcher.matches_assignment(&file, names) {
                    debug!("{} → 《{}》", file, title);
                    report
                        .routed
                        .entry(title.to_string())
                        .or_default()
                        .push(file.clone());
                    matched = true;
                }
            }
            if !matched {
                report.unmatched.push(file);
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::file_matcher::MatchStrictness;

    fn files(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn assignments() -> Vec<AssignmentConfig> {
        let reading = AssignmentConfig::new("Chapter 10 – Section 2 Reading");
        let essay = AssignmentConfig::new("Persuasive Essay Draft").rename("Argument Essay");
        vec![reading, essay]
    }

    #[test]
    fn test_route_by_assignment_and_alias() {
        let filter = SubmissionFilter::with_matcher(FileMatcher::default(), None);
        let report = filter.route(
            &files(&[
                "ch10-sec2-notes.pdf",
                "John_Smith_Persuasive_Essay_Draft.docx",
                "random_scan.png",
            ]),
            &assignments(),
        );

        assert_eq!(
            report.routed["Chapter 10 – Section 2 Reading"],
            vec!["ch10-sec2-notes.pdf".to_string()]
        );
        // 旧标题仍然能匹配
        assert_eq!(
            report.routed["Argument Essay"],
            vec!["John_Smith_Persuasive_Essay_Draft.docx".to_string()]
        );
        assert_eq!(report.unmatched, vec!["random_scan.png".to_string()]);
        assert_eq!(report.considered, 3);
        assert_eq!(report.routed_count(), 2);
    }

    #[test]
    fn test_route_with_student_filter() {
        let filter = SubmissionFilter::with_matcher(
            FileMatcher::new(MatchStrictness::Lenient),
            Some("Smith; John Michael".to_string()),
        );
        let report = filter.route(
            &files(&[
                "John_Smith_Persuasive_Essay_Draft.docx",
                "Jane_Doe_Persuasive_Essay_Draft.docx",
            ]),
            &assignments(),
        );

        assert_eq!(report.considered, 1);
        assert_eq!(report.filtered_out, 1);
        assert_eq!(report.routed_count(), 1);
        assert!(report.to_string().contains("John_Smith_Persuasive_Essay_Draft.docx"));
    }

    #[test]
    fn test_filter_by_assignment_uses_imported_filename() {
        let mut config = AssignmentConfig::new("Lab 4");
        config.imported_filename = Some("density_lab_template.docx".to_string());

        let filter = SubmissionFilter::with_matcher(FileMatcher::default(), None);
        let matched = filter.filter_by_assignment(
            &files(&["Smith - density_lab_template.pdf", "Smith - other.pdf"]),
            &config,
        );
        assert_eq!(matched, files(&["Smith - density_lab_template.pdf"]));
    }
}
