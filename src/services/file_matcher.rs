//! 文件名匹配 - 业务能力层
//!
//! 判断上传的文件属于哪个学生、哪个作业。文件名由老师随意命名，格式不统一，
//! 所以默认采用宽松匹配：宁可多匹配，也不要漏掉真实的提交。

use crate::models::student::Student;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::sync::OnceLock;
use tracing::warn;

/// 匹配严格程度
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStrictness {
    /// 所有启发式规则，任意一条命中即可
    #[default]
    Lenient,
    /// 只接受完整姓名，作业名必须按整词匹配
    Strict,
}

impl FromStr for MatchStrictness {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lenient" => Ok(MatchStrictness::Lenient),
            "strict" => Ok(MatchStrictness::Strict),
            other => Err(format!("未知的匹配严格程度: {}", other)),
        }
    }
}

static CHAPTER_SECTION_RE: OnceLock<Option<Regex>> = OnceLock::new();

fn chapter_section_re() -> Option<&'static Regex> {
    CHAPTER_SECTION_RE
        .get_or_init(|| {
            match Regex::new(r"\b(?:chapter|chap|ch)\s*(\d+).*?(?:section|sect|sec)\s*(\d+)") {
                Ok(re) => Some(re),
                Err(e) => {
                    warn!("章节正则编译失败: {}", e);
                    None
                }
            }
        })
        .as_ref()
}

fn is_emoji(c: char) -> bool {
    matches!(
        c as u32,
        0x1F000..=0x1FAFF | 0x2600..=0x27BF | 0x2B00..=0x2BFF | 0xFE00..=0xFE0F | 0x200D | 0x20E3 | 0xE0020..=0xE007F
    )
}

/// 规范化名称：去掉 emoji，标点替换为空格，合并空白，转小写
pub fn normalize_name(s: &str) -> String {
    let cleaned: String = s
        .chars()
        .filter(|&c| !is_emoji(c))
        .map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    cleaned
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// 去掉文件扩展名（只处理看起来像扩展名的后缀，比如 `.docx`）
fn strip_extension(filename: &str) -> &str {
    let path = Path::new(filename);
    let looks_like_extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|ext| {
            (1..=5).contains(&ext.len())
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
                && ext.chars().any(|c| c.is_ascii_alphabetic())
        })
        .unwrap_or(false);

    match filename.rfind('.') {
        Some(pos) if looks_like_extension => &filename[..pos],
        _ => filename,
    }
}

/// 从文字中提取 (章, 节)，支持 `chapter 10 section 2`、`ch10 sec2` 等写法
pub fn extract_chapter_section(s: &str) -> Option<(u32, u32)> {
    let normalized = normalize_name(s);
    let caps = chapter_section_re()?.captures(&normalized)?;
    let chapter = caps[1].parse().ok()?;
    let section = caps[2].parse().ok()?;
    Some((chapter, section))
}

/// 把 "Last; First Middle" 或 "Last, First" 改写为 "First Last"
pub fn normalize_student_query(raw: &str) -> String {
    match raw.find([';', ',']) {
        Some(pos) => {
            let last = raw[..pos].trim();
            let first = raw[pos + 1..].split_whitespace().next().unwrap_or("");
            match (first.is_empty(), last.is_empty()) {
                (false, false) => format!("{} {}", first, last),
                (true, _) => last.to_string(),
                (false, true) => first.to_string(),
            }
        }
        None => raw.split_whitespace().collect::<Vec<_>>().join(" "),
    }
}

/// 从筛选条件解析出学生姓名，只有一个词时返回 `None`
pub fn student_from_query(raw: &str) -> Option<Student> {
    let normalized = normalize_student_query(raw);
    let words: Vec<&str> = normalized.split_whitespace().collect();
    match words.as_slice() {
        [first, .., last] => Some(Student::new(*first, *last)),
        _ => None,
    }
}

fn contains_words(haystack: &str, needle: &str) -> bool {
    format!(" {} ", haystack).contains(&format!(" {} ", needle))
}

/// 文件名匹配器
#[derive(Debug, Clone, Copy, Default)]
pub struct FileMatcher {
    strictness: MatchStrictness,
}

impl FileMatcher {
    pub fn new(strictness: MatchStrictness) -> Self {
        Self { strictness }
    }

    pub fn strictness(&self) -> MatchStrictness {
        self.strictness
    }

    /// 文件名是否属于该学生（大小写不敏感）
    pub fn matches_student(&self, filename: &str, student: &Student) -> bool {
        if !student.is_complete() {
            return false;
        }

        let name = filename.to_lowercase();
        let first = student.first.trim().to_lowercase();
        let last = student.last.trim().to_lowercase();

        let full_name = name.contains(&format!("{}, {}", first, last))
            || name.contains(&format!("{}, {}", last, first))
            || name.contains(&format!("{} {}", first, last))
            || name.contains(&format!("{}_{}", first, last));

        if full_name || self.strictness == MatchStrictness::Strict {
            return full_name;
        }

        let last_initial: String = last.chars().take(1).collect();
        let initial_re = Regex::new(&format!(
            r"\b{} {}\b",
            regex::escape(&first),
            regex::escape(&last_initial)
        ));

        name.contains(&format!("{}, {}", first, last_initial))
            || initial_re.map(|re| re.is_match(&name)).unwrap_or(false)
            || name.starts_with(&format!("{},", first))
            || name.starts_with(&format!("{} ", first))
    }

    /// 用原始筛选条件匹配（支持 "Last; First" 格式）
    ///
    /// 只有一个词时，宽松模式按子串匹配，严格模式按整词匹配
    pub fn matches_student_query(&self, filename: &str, raw_query: &str) -> bool {
        if let Some(student) = student_from_query(raw_query) {
            return self.matches_student(filename, &student);
        }

        let token = normalize_name(raw_query);
        if token.is_empty() {
            return false;
        }
        match self.strictness {
            MatchStrictness::Lenient => filename.to_lowercase().contains(&token),
            MatchStrictness::Strict => contains_words(&normalize_name(strip_extension(filename)), &token),
        }
    }

    /// 文件名是否属于某个作业
    ///
    /// `names` 包含当前标题、所有历史别名以及导入文档的文件名
    pub fn matches_assignment(&self, filename: &str, names: &[String]) -> bool {
        let file_lower = filename.to_lowercase();
        let file_norm = normalize_name(strip_extension(filename));
        let file_chapter = extract_chapter_section(&file_norm);

        names.iter().any(|name| {
            let name_norm = normalize_name(name);
            if name_norm.is_empty() {
                return false;
            }

            let text_match = match self.strictness {
                MatchStrictness::Lenient => {
                    file_lower.contains(&name.trim().to_lowercase()) || file_norm.contains(&name_norm)
                }
                MatchStrictness::Strict => contains_words(&file_norm, &name_norm),
            };

            text_match || (file_chapter.is_some() && file_chapter == extract_chapter_section(&name_norm))
        })
    }
}

/// 宽松模式下判断文件是否属于学生
pub fn matches_student(filename: &str, student: &Student) -> bool {
    FileMatcher::default().matches_student(filename, student)
}

/// 宽松模式下判断文件是否属于作业
pub fn matches_assignment(filename: &str, names: &[String]) -> bool {
    FileMatcher::default().matches_assignment(filename, names)
}
