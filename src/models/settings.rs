use serde::{Deserialize, Serialize};

use crate::models::question::QuestionType;

/// 难度档位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// 该档位对应的认知层级侧重
    pub fn guideline(self) -> &'static str {
        match self {
            Difficulty::Easy => {
                "Focus on Knowledge and Understanding levels of Bloom's Taxonomy. Simple recall."
            }
            Difficulty::Medium => {
                "Focus on Application and Analysis levels. Include scenario-based questions."
            }
            Difficulty::Hard => {
                "Focus on Evaluation and Synthesis. Require high-level critical thinking."
            }
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Difficulty::Easy => "EASY",
            Difficulty::Medium => "MEDIUM",
            Difficulty::Hard => "HARD",
        }
    }
}

/// 生成结果必须包含哪些题目字段
///
/// 两种出卷流程对题目字段的要求不同，作为请求参数传入
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaProfile {
    /// 要求 estimatedTime
    #[default]
    Timed,
    /// 要求 markingRubric 与 cognitiveLevel
    TeacherGuide,
}

impl SchemaProfile {
    /// 题目对象的必填字段
    pub fn required_question_fields(self) -> Vec<&'static str> {
        let mut fields = vec!["id", "type", "text", "marks"];
        match self {
            SchemaProfile::Timed => fields.push("estimatedTime"),
            SchemaProfile::TeacherGuide => {
                fields.push("markingRubric");
                fields.push("cognitiveLevel");
            }
        }
        fields
    }
}

/// 出卷设置
///
/// 发起生成请求时整体克隆一份快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    pub language: String,
    pub difficulty: Difficulty,
    pub mcq_count: u32,
    pub short_count: u32,
    pub long_count: u32,
    pub fill_blanks_count: u32,
    pub true_false_count: u32,
    pub title: String,
    pub subject: String,
    pub institution_name: String,
    pub duration: String,
    pub watermark_text: String,
    pub logo_url: String,
    pub schema_profile: SchemaProfile,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            language: "English".to_string(),
            difficulty: Difficulty::Medium,
            mcq_count: 10,
            short_count: 4,
            long_count: 2,
            fill_blanks_count: 5,
            true_false_count: 5,
            title: "Final Examination - 2025".to_string(),
            subject: "General Knowledge".to_string(),
            institution_name: "Royal International School".to_string(),
            duration: "180 Minutes".to_string(),
            watermark_text: "CONFIDENTIAL".to_string(),
            logo_url: String::new(),
            schema_profile: SchemaProfile::Timed,
        }
    }
}

impl GeneratorSettings {
    /// 某一题型要求的题目数量
    pub fn count_for(&self, question_type: QuestionType) -> u32 {
        match question_type {
            QuestionType::Mcq => self.mcq_count,
            QuestionType::Short => self.short_count,
            QuestionType::Long => self.long_count,
            QuestionType::FillBlanks => self.fill_blanks_count,
            QuestionType::TrueFalse => self.true_false_count,
        }
    }

    pub fn total_question_count(&self) -> u64 {
        QuestionType::ALL
            .iter()
            .map(|t| u64::from(self.count_for(*t)))
            .sum()
    }

    /// 按固定分值计算的预期总分
    pub fn expected_total_marks(&self) -> u64 {
        QuestionType::ALL
            .iter()
            .map(|t| u64::from(self.count_for(*t)) * u64::from(t.fixed_marks()))
            .sum()
    }

    /// 水印文字，空字符串视为未设置
    pub fn watermark(&self) -> Option<String> {
        non_empty(&self.watermark_text)
    }

    /// 校徽，空字符串视为未设置
    pub fn logo(&self) -> Option<String> {
        non_empty(&self.logo_url)
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
