use serde::{Deserialize, Serialize};
use std::fmt;

/// 试卷题型
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    MultipleChoice,
    ShortAnswer,
    ExtendedResponse,
    TrueFalse,
    Matching,
}

impl QuestionType {
    pub const ALL: [QuestionType; 5] = [
        QuestionType::MultipleChoice,
        QuestionType::ShortAnswer,
        QuestionType::ExtendedResponse,
        QuestionType::TrueFalse,
        QuestionType::Matching,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "multiple_choice",
            QuestionType::ShortAnswer => "short_answer",
            QuestionType::ExtendedResponse => "extended_response",
            QuestionType::TrueFalse => "true_false",
            QuestionType::Matching => "matching",
        }
    }

    /// 题量占比
    pub fn ratio(self) -> f64 {
        match self {
            QuestionType::MultipleChoice => 0.50,
            QuestionType::ShortAnswer => 0.15,
            QuestionType::ExtendedResponse => 0.10,
            QuestionType::TrueFalse => 0.15,
            QuestionType::Matching => 0.10,
        }
    }

    /// 每题基础分值权重
    pub fn weight(self) -> u32 {
        match self {
            QuestionType::ExtendedResponse => 4,
            QuestionType::ShortAnswer => 2,
            QuestionType::MultipleChoice | QuestionType::TrueFalse | QuestionType::Matching => 1,
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 知识深度（Depth of Knowledge）等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DokLevel {
    /// 回忆
    #[serde(rename = "1")]
    Recall,
    /// 技能与概念
    #[serde(rename = "2")]
    SkillConcept,
    /// 策略思考
    #[serde(rename = "3")]
    StrategicThinking,
    /// 拓展思考
    #[serde(rename = "4")]
    ExtendedThinking,
}

impl DokLevel {
    pub const ALL: [DokLevel; 4] = [
        DokLevel::Recall,
        DokLevel::SkillConcept,
        DokLevel::StrategicThinking,
        DokLevel::ExtendedThinking,
    ];

    pub fn level(self) -> u8 {
        match self {
            DokLevel::Recall => 1,
            DokLevel::SkillConcept => 2,
            DokLevel::StrategicThinking => 3,
            DokLevel::ExtendedThinking => 4,
        }
    }

    pub fn ratio(self) -> f64 {
        match self {
            DokLevel::Recall => 0.20,
            DokLevel::SkillConcept => 0.40,
            DokLevel::StrategicThinking => 0.30,
            DokLevel::ExtendedThinking => 0.10,
        }
    }
}

impl fmt::Display for DokLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DOK {}", self.level())
    }
}
