use serde::{Deserialize, Serialize};

/// 题型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionType {
    /// 单项选择
    Mcq,
    /// 简答
    Short,
    /// 论述
    Long,
    /// 填空
    FillBlanks,
    /// 判断
    TrueFalse,
}

impl QuestionType {
    /// 全部题型，按试卷分区顺序（A-E）排列
    pub const ALL: [QuestionType; 5] = [
        QuestionType::Mcq,
        QuestionType::TrueFalse,
        QuestionType::FillBlanks,
        QuestionType::Short,
        QuestionType::Long,
    ];

    /// 该题型的固定分值
    pub fn fixed_marks(self) -> u32 {
        match self {
            QuestionType::Mcq | QuestionType::TrueFalse | QuestionType::FillBlanks => 1,
            QuestionType::Short => 5,
            QuestionType::Long => 10,
        }
    }

    /// 结构约定里使用的名称
    pub fn code(self) -> &'static str {
        match self {
            QuestionType::Mcq => "MCQ",
            QuestionType::Short => "SHORT",
            QuestionType::Long => "LONG",
            QuestionType::FillBlanks => "FILL_BLANKS",
            QuestionType::TrueFalse => "TRUE_FALSE",
        }
    }

    /// 指令里使用的可读名称
    pub fn display_name(self) -> &'static str {
        match self {
            QuestionType::Mcq => "MCQs",
            QuestionType::Short => "Short Answer",
            QuestionType::Long => "Long Answer",
            QuestionType::FillBlanks => "Fill in Blanks",
            QuestionType::TrueFalse => "True/False",
        }
    }

    /// 学生卷中预留的作答行数，只有主观题需要
    pub fn answer_lines(self) -> u8 {
        match self {
            QuestionType::Short => 3,
            QuestionType::Long => 10,
            _ => 0,
        }
    }
}

impl std::fmt::Display for QuestionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// 认知层级（布鲁姆分类法六级）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CognitiveLevel {
    Knowledge,
    Understanding,
    Application,
    Analysis,
    Synthesis,
    Evaluation,
}

impl CognitiveLevel {
    pub const ALL: [CognitiveLevel; 6] = [
        CognitiveLevel::Knowledge,
        CognitiveLevel::Understanding,
        CognitiveLevel::Application,
        CognitiveLevel::Analysis,
        CognitiveLevel::Synthesis,
        CognitiveLevel::Evaluation,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CognitiveLevel::Knowledge => "Knowledge",
            CognitiveLevel::Understanding => "Understanding",
            CognitiveLevel::Application => "Application",
            CognitiveLevel::Analysis => "Analysis",
            CognitiveLevel::Synthesis => "Synthesis",
            CognitiveLevel::Evaluation => "Evaluation",
        }
    }
}

impl std::fmt::Display for CognitiveLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 单道题目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marking_rubric: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cognitive_level: Option<CognitiveLevel>,
    /// 预计作答时间（分钟），缺省为 0
    #[serde(default, deserialize_with = "deserialize_whole_number")]
    pub estimated_time: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_tag: Option<String>,
    #[serde(deserialize_with = "deserialize_whole_number")]
    pub marks: u32,
}

impl Question {
    /// 创建一道只有必填字段的题目
    pub fn new(
        id: impl Into<String>,
        question_type: QuestionType,
        text: impl Into<String>,
        marks: u32,
    ) -> Self {
        Self {
            id: id.into(),
            question_type,
            text: text.into(),
            options: None,
            correct_answer: None,
            explanation: None,
            marking_rubric: None,
            cognitive_level: None,
            estimated_time: 0,
            topic_tag: None,
            marks,
        }
    }

    /// 合并补丁：只覆盖补丁中提供的字段
    ///
    /// 题型改为非选择题且补丁未提及选项时，清空原有选项
    pub fn apply(&mut self, patch: QuestionPatch) {
        if let Some(question_type) = patch.question_type {
            if question_type != QuestionType::Mcq && patch.options.is_none() {
                self.options = None;
            }
            self.question_type = question_type;
        }
        if let Some(text) = patch.text {
            self.text = text;
        }
        if let Some(options) = patch.options {
            self.options = options;
        }
        if let Some(correct_answer) = patch.correct_answer {
            self.correct_answer = correct_answer;
        }
        if let Some(explanation) = patch.explanation {
            self.explanation = explanation;
        }
        if let Some(marking_rubric) = patch.marking_rubric {
            self.marking_rubric = marking_rubric;
        }
        if let Some(cognitive_level) = patch.cognitive_level {
            self.cognitive_level = cognitive_level;
        }
        if let Some(estimated_time) = patch.estimated_time {
            self.estimated_time = estimated_time;
        }
        if let Some(topic_tag) = patch.topic_tag {
            self.topic_tag = topic_tag;
        }
        if let Some(marks) = patch.marks {
            self.marks = marks;
        }
    }
}

/// 题目的局部修改，`None` 表示保持原值
///
/// 可选字段使用两层 `Option`：`Some(None)` 表示清空，JSON 中对应显式的 `null`。
/// id 不可修改，保证试卷内题目 id 唯一
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionPatch {
    #[serde(default, rename = "type")]
    pub question_type: Option<QuestionType>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub options: Option<Option<Vec<String>>>,
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub correct_answer: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub explanation: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub marking_rubric: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub cognitive_level: Option<Option<CognitiveLevel>>,
    #[serde(default)]
    pub estimated_time: Option<u32>,
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub topic_tag: Option<Option<String>>,
    #[serde(default)]
    pub marks: Option<u32>,
}

impl QuestionPatch {
    pub fn marks(marks: u32) -> Self {
        Self {
            marks: Some(marks),
            ..Self::default()
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }
}

// 字段出现即为 Some，值为 null 时得到 Some(None)
fn deserialize_present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// Helper function to deserialize a non-negative whole number written as an
// integer, an integral float (5.0) or a numeric string ("5")
fn deserialize_whole_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    use std::fmt;

    struct WholeNumberVisitor;

    impl<'de> Visitor<'de> for WholeNumberVisitor {
        type Value = u32;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a non-negative whole number")
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            u32::try_from(value).map_err(|_| E::custom(format!("number {} is too large", value)))
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            u32::try_from(value).map_err(|_| E::custom(format!("number {} is out of range", value)))
        }

        fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if value.fract() != 0.0 || value < 0.0 || value > f64::from(u32::MAX) {
                return Err(E::custom(format!("number {} is not a whole number", value)));
            }
            Ok(value as u32)
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            let trimmed = value.trim();
            if let Ok(number) = trimmed.parse::<u32>() {
                return Ok(number);
            }
            match trimmed.parse::<f64>() {
                Ok(number) => self.visit_f64(number),
                Err(_) => Err(E::custom(format!("'{}' is not a number", value))),
            }
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(0)
        }
    }

    deserializer.deserialize_any(WholeNumberVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fixed_marks() {
        assert_eq!(QuestionType::Mcq.fixed_marks(), 1);
        assert_eq!(QuestionType::TrueFalse.fixed_marks(), 1);
        assert_eq!(QuestionType::FillBlanks.fixed_marks(), 1);
        assert_eq!(QuestionType::Short.fixed_marks(), 5);
        assert_eq!(QuestionType::Long.fixed_marks(), 10);
    }

    #[test]
    fn test_question_from_camel_case_json() {
        let question: Question = serde_json::from_value(json!({
            "id": "q1",
            "type": "FILL_BLANKS",
            "text": "Water boils at ___ °C.",
            "correctAnswer": "100",
            "cognitiveLevel": "Knowledge",
            "estimatedTime": 2.0,
            "marks": "1"
        }))
        .unwrap();

        assert_eq!(question.question_type, QuestionType::FillBlanks);
        assert_eq!(question.correct_answer.as_deref(), Some("100"));
        assert_eq!(question.cognitive_level, Some(CognitiveLevel::Knowledge));
        assert_eq!(question.estimated_time, 2);
        assert_eq!(question.marks, 1);
    }

    #[test]
    fn test_missing_estimated_time_defaults_to_zero() {
        let question: Question = serde_json::from_value(json!({
            "id": "q1", "type": "MCQ", "text": "?", "marks": 1
        }))
        .unwrap();
        assert_eq!(question.estimated_time, 0);
    }

    #[test]
    fn test_fractional_marks_rejected() {
        let result: Result<Question, _> = serde_json::from_value(json!({
            "id": "q1", "type": "MCQ", "text": "?", "marks": 1.5
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_cognitive_level_rejected() {
        let result: Result<Question, _> = serde_json::from_value(json!({
            "id": "q1", "type": "MCQ", "text": "?", "marks": 1, "cognitiveLevel": "Memorising"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_apply_patch_merges_only_supplied_fields() {
        let mut question = Question::new("q1", QuestionType::Short, "Explain osmosis.", 5);
        question.marking_rubric = Some("2 marks for definition".to_string());

        question.apply(QuestionPatch {
            marks: Some(8),
            topic_tag: Some(Some("Cells".to_string())),
            ..QuestionPatch::default()
        });

        assert_eq!(question.marks, 8);
        assert_eq!(question.topic_tag.as_deref(), Some("Cells"));
        assert_eq!(question.text, "Explain osmosis.");
        assert_eq!(
            question.marking_rubric.as_deref(),
            Some("2 marks for definition")
        );
        assert_eq!(question.id, "q1");
    }

    #[test]
    fn test_patch_can_clear_optional_fields() {
        let mut question = Question::new("q1", QuestionType::Short, "Explain osmosis.", 5);
        question.marking_rubric = Some("2 marks for definition".to_string());
        question.topic_tag = Some("Cells".to_string());

        let patch: QuestionPatch =
            serde_json::from_value(json!({ "markingRubric": null })).unwrap();
        assert_eq!(patch.marking_rubric, Some(None));
        assert_eq!(patch.topic_tag, None);

        question.apply(patch);

        assert_eq!(question.marking_rubric, None);
        assert_eq!(question.topic_tag.as_deref(), Some("Cells"));
    }

    #[test]
    fn test_changing_mcq_type_drops_stale_options() {
        let mut question = Question::new("q1", QuestionType::Mcq, "Pick one", 1);
        question.options = Some(vec!["a".to_string(), "b".to_string()]);
        question.correct_answer = Some("a".to_string());

        question.apply(QuestionPatch {
            question_type: Some(QuestionType::Short),
            correct_answer: Some(None),
            ..QuestionPatch::default()
        });

        assert_eq!(question.question_type, QuestionType::Short);
        assert_eq!(question.options, None);
        assert_eq!(question.correct_answer, None);

        let mut kept = Question::new("q2", QuestionType::Mcq, "Pick one", 1);
        kept.apply(QuestionPatch {
            question_type: Some(QuestionType::TrueFalse),
            options: Some(Some(vec!["True".to_string(), "False".to_string()])),
            ..QuestionPatch::default()
        });
        assert_eq!(kept.options.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn test_patch_json_round_trips_clear_marker() {
        let patch = QuestionPatch {
            explanation: Some(None),
            marks: Some(3),
            ..QuestionPatch::default()
        };
        let value = serde_json::to_value(&patch).unwrap();
        assert!(value["explanation"].is_null());
        assert!(value.get("options").is_none());

        let back: QuestionPatch = serde_json::from_value(value).unwrap();
        assert_eq!(back, patch);
    }
}
