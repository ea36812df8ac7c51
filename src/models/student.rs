use serde::{Deserialize, Serialize};
use std::fmt;

/// 学生姓名
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Student {
    pub first: String,
    pub last: String,
}

impl Student {
    pub fn new(first: impl Into<String>, last: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            last: last.into(),
        }
    }

    /// 姓或名为空时无法用于匹配
    pub fn is_complete(&self) -> bool {
        !self.first.trim().is_empty() && !self.last.trim().is_empty()
    }
}

impl fmt::Display for Student {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.first, self.last)
    }
}
