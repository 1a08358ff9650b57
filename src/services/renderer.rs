//! 双模式渲染 - 业务能力层
//!
//! 把 `Paper` 投影成一份"哪些内容要展示"的视图，供导出使用。
//! 纯函数：不修改试卷，相同输入必然得到相同输出。
//!
//! | 内容                         | 学生卷 | 教师卷 |
//! |------------------------------|--------|--------|
//! | 认知层级 / 知识点 / 预计用时 | ✗      | ✓      |
//! | 评分细则 / 参考答案          | ✗      | ✓      |
//! | 选择题正确选项高亮           | ✗      | ✓      |
//! | 主观题作答横线               | ✓      | ✗      |
//! | 题干 / 题号 / 分值 / 卷头    | ✓      | ✓      |

use serde::Serialize;

use crate::models::{CognitiveLevel, Paper, Question, QuestionType};

/// 从右向左书写的语言
pub const RTL_LANGUAGES: [&str; 4] = ["Urdu", "Arabic", "Persian", "Hebrew"];

/// 水印透明度
pub const WATERMARK_OPACITY: f32 = 0.035;

/// 考生信息栏
pub const CANDIDATE_FIELDS: [&str; 2] = ["Name", "Roll No"];

/// 渲染模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    Student,
    Teacher,
}

impl RenderMode {
    pub fn label(self) -> &'static str {
        match self {
            RenderMode::Student => "Student",
            RenderMode::Teacher => "Teacher",
        }
    }

    /// 视图标题
    pub fn heading(self) -> &'static str {
        match self {
            RenderMode::Student => "Student Question Paper",
            RenderMode::Teacher => "Teacher's Master Copy",
        }
    }
}

/// 书写方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    Ltr,
    Rtl,
}

impl TextDirection {
    pub fn for_language(language: &str) -> Self {
        if RTL_LANGUAGES
            .iter()
            .any(|rtl| rtl.eq_ignore_ascii_case(language.trim()))
        {
            TextDirection::Rtl
        } else {
            TextDirection::Ltr
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            TextDirection::Ltr => "ltr",
            TextDirection::Rtl => "rtl",
        }
    }
}

/// 卷头
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeaderBlock {
    pub institution_name: String,
    pub title: String,
    pub subject: String,
    pub duration: String,
    pub total_marks: u64,
    pub logo_url: Option<String>,
}

/// 水印
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Watermark {
    pub text: String,
    pub opacity: f32,
}

/// 教师卷的考纲概览
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyllabusSummary {
    pub topics_covered: Vec<String>,
    pub estimated_total_time: Option<u64>,
}

/// 选项
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionView {
    /// 选项字母 a, b, c...
    pub label: char,
    pub text: String,
    /// 是否高亮为正确选项（仅教师卷）
    pub highlighted: bool,
}

/// 单道题的展示内容
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionView {
    pub id: String,
    /// 全卷连续题号，从 1 开始
    pub number: usize,
    pub question_type: QuestionType,
    pub text: String,
    pub marks: u32,
    pub options: Vec<OptionView>,
    // --- 仅教师卷 ---
    pub cognitive_level: Option<CognitiveLevel>,
    pub topic_tag: Option<String>,
    pub estimated_time: Option<u32>,
    pub marking_rubric: Option<String>,
    pub model_answer: Option<String>,
    // --- 仅学生卷 ---
    /// 作答横线数，0 表示不留空
    pub answer_lines: u8,
}

/// 分区
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionView {
    pub title: String,
    pub questions: Vec<QuestionView>,
}

/// 完整视图
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaperView {
    pub mode: RenderMode,
    pub direction: TextDirection,
    pub subject: String,
    pub header: HeaderBlock,
    pub candidate_fields: Vec<String>,
    pub watermark: Option<Watermark>,
    pub set_badge: Option<String>,
    pub instructions: Vec<String>,
    pub syllabus: Option<SyllabusSummary>,
    pub sections: Vec<SectionView>,
}

impl PaperView {
    pub fn questions(&self) -> impl Iterator<Item = &QuestionView> {
        self.sections.iter().flat_map(|s| s.questions.iter())
    }
}

/// 渲染视图
pub fn render_view(paper: &Paper, mode: RenderMode, language: &str) -> PaperView {
    let teacher = mode == RenderMode::Teacher;
    let mut number = 0;

    let sections = paper
        .sections
        .iter()
        .map(|section| SectionView {
            title: section.title.clone(),
            questions: section
                .questions
                .iter()
                .map(|question| {
                    number += 1;
                    render_question(question, number, teacher)
                })
                .collect(),
        })
        .collect();

    let syllabus = if teacher {
        Some(SyllabusSummary {
            topics_covered: paper.topics_covered.clone().unwrap_or_default(),
            estimated_total_time: paper.estimated_total_time,
        })
    } else {
        None
    };

    PaperView {
        mode,
        direction: TextDirection::for_language(language),
        subject: paper.subject.clone(),
        header: HeaderBlock {
            institution_name: paper.institution_name.clone(),
            title: paper.title.clone(),
            subject: paper.subject.clone(),
            duration: paper.duration.clone(),
            total_marks: paper.total_marks,
            logo_url: paper.logo_url.clone(),
        },
        candidate_fields: CANDIDATE_FIELDS.iter().map(|f| f.to_string()).collect(),
        watermark: paper
            .watermark
            .as_ref()
            .filter(|w| !w.trim().is_empty())
            .map(|text| Watermark {
                text: text.clone(),
                opacity: WATERMARK_OPACITY,
            }),
        set_badge: paper.set_label.clone(),
        instructions: paper.instructions.clone(),
        syllabus,
        sections,
    }
}

fn render_question(question: &Question, number: usize, teacher: bool) -> QuestionView {
    let is_mcq = question.question_type == QuestionType::Mcq;

    let options = if is_mcq {
        question
            .options
            .as_deref()
            .unwrap_or_default()
            .iter()
            .enumerate()
            .map(|(idx, text)| OptionView {
                label: option_label(idx),
                text: text.clone(),
                highlighted: teacher && question.correct_answer.as_deref() == Some(text.as_str()),
            })
            .collect()
    } else {
        Vec::new()
    };

    QuestionView {
        id: question.id.clone(),
        number,
        question_type: question.question_type,
        text: question.text.clone(),
        marks: question.marks,
        options,
        cognitive_level: question.cognitive_level.filter(|_| teacher),
        topic_tag: question.topic_tag.clone().filter(|_| teacher),
        estimated_time: Some(question.estimated_time).filter(|_| teacher),
        marking_rubric: question.marking_rubric.clone().filter(|_| teacher),
        model_answer: question
            .correct_answer
            .clone()
            .filter(|_| teacher && !is_mcq),
        answer_lines: if teacher {
            0
        } else {
            question.question_type.answer_lines()
        },
    }
}

fn option_label(idx: usize) -> char {
    char::from_u32('a' as u32 + idx as u32).unwrap_or('?')
}
