//! 生成请求构建 - 业务能力层
//!
//! 把源材料与出卷设置组合成一次生成请求：媒体内容 + 指令 + 输出结构约定

use serde_json::{json, Value as JsonValue};
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::{
    encode_data_url, CognitiveLevel, GeneratorSettings, QuestionType, SchemaProfile, SourceFile,
};

/// 发给生成服务的媒体内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaPart {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl MediaPart {
    pub fn data_url(&self) -> String {
        encode_data_url(&self.mime_type, &self.data)
    }
}

/// 一次生成请求
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// 源材料，顺序与上传顺序一致
    pub media: Vec<MediaPart>,
    /// 自然语言指令
    pub instruction: String,
    /// 输出结构约定（JSON Schema）
    pub schema: JsonValue,
    /// 发起请求时的设置快照
    pub settings: GeneratorSettings,
}

/// 构建生成请求
///
/// 没有任何源文件时直接失败，不会发出请求
pub fn build_request(
    settings: &GeneratorSettings,
    sources: &[SourceFile],
) -> AppResult<GenerationRequest> {
    if sources.is_empty() {
        return Err(AppError::configuration("至少需要上传一个源文件"));
    }

    let media = sources
        .iter()
        .map(|file| MediaPart {
            mime_type: file.mime_type.clone(),
            data: file.data.clone(),
        })
        .collect::<Vec<_>>();

    let instruction = build_instruction(settings);
    let schema = build_schema(settings.schema_profile);

    debug!(
        "生成请求已构建: {} 个媒体, 指令 {} 字符, 预期总分 {}",
        media.len(),
        instruction.len(),
        settings.expected_total_marks()
    );

    Ok(GenerationRequest {
        media,
        instruction,
        schema,
        settings: settings.clone(),
    })
}

/// 构建出卷指令
pub fn build_instruction(settings: &GeneratorSettings) -> String {
    let distribution = QuestionType::ALL
        .iter()
        .enumerate()
        .map(|(idx, question_type)| {
            format!(
                "    - Section {}: {} {} ({}m each, type {})",
                section_letter(idx),
                settings.count_for(*question_type),
                question_type.display_name(),
                question_type.fixed_marks(),
                question_type.code()
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"TASK: Generate a professional academic question paper and Teacher Master Guide in {language} using the provided multimodal content.

TEACHER FEATURES:
1. Categorize each question into Bloom's Taxonomy levels ('cognitiveLevel').
2. Provide a 'markingRubric' for partial marks.
3. Provide 'estimatedTime' (integer minutes) for a student to solve each question.
4. Provide 'topicTag' for each question (e.g., "Organic Chemistry").
5. List 'topicsCovered' as a summary array of main concepts found in the source files.

LANGUAGE: All academic content MUST be in {language}.
LEVEL: {level} ({guideline})
TITLE: {title}
SUBJECT: {subject}

DISTRIBUTION:
{distribution}

Every question id must be unique across the whole paper.
Return as structured JSON."#,
        language = settings.language,
        level = settings.difficulty.code(),
        guideline = settings.difficulty.guideline(),
        title = settings.title,
        subject = settings.subject,
        distribution = distribution,
    )
}

/// 构建输出结构约定
pub fn build_schema(profile: SchemaProfile) -> JsonValue {
    let question_types: Vec<&str> = QuestionType::ALL.iter().map(|t| t.code()).collect();
    let levels: Vec<&str> = CognitiveLevel::ALL.iter().map(|l| l.name()).collect();

    json!({
        "type": "object",
        "properties": {
            "title": { "type": "string" },
            "subject": { "type": "string" },
            "institutionName": { "type": "string" },
            "totalMarks": { "type": "number" },
            "duration": { "type": "string" },
            "topicsCovered": { "type": "array", "items": { "type": "string" } },
            "instructions": { "type": "array", "items": { "type": "string" } },
            "sections": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "title": { "type": "string" },
                        "questions": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "properties": {
                                    "id": { "type": "string" },
                                    "type": { "type": "string", "enum": question_types },
                                    "text": { "type": "string" },
                                    "options": { "type": "array", "items": { "type": "string" } },
                                    "correctAnswer": { "type": "string" },
                                    "explanation": { "type": "string" },
                                    "markingRubric": { "type": "string" },
                                    "cognitiveLevel": { "type": "string", "enum": levels },
                                    "estimatedTime": { "type": "number" },
                                    "topicTag": { "type": "string" },
                                    "marks": { "type": "number" }
                                },
                                "required": profile.required_question_fields()
                            }
                        }
                    },
                    "required": ["title", "questions"]
                }
            }
        },
        "required": ["title", "subject", "totalMarks", "sections"]
    })
}

fn section_letter(idx: usize) -> char {
    (b'A' + idx as u8) as char
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenerationError;
    use crate::models::Difficulty;

    fn sources() -> Vec<SourceFile> {
        vec![
            SourceFile::new(b"%PDF".to_vec(), "application/pdf", "ch1.pdf"),
            SourceFile::new(b"img".to_vec(), "image/png", "p2.png"),
        ]
    }

    #[test]
    fn test_no_sources_is_configuration_error() {
        let result = build_request(&GeneratorSettings::default(), &[]);
        assert!(matches!(
            result,
            Err(AppError::Generation(GenerationError::Configuration { .. }))
        ));
    }

    #[test]
    fn test_media_keeps_upload_order() {
        let request = build_request(&GeneratorSettings::default(), &sources()).unwrap();
        assert_eq!(request.media.len(), 2);
        assert_eq!(request.media[0].mime_type, "application/pdf");
        assert_eq!(request.media[1].data, b"img");
    }

    #[test]
    fn test_instruction_contains_language_level_and_distribution() {
        let settings = GeneratorSettings {
            language: "French".to_string(),
            difficulty: Difficulty::Hard,
            mcq_count: 7,
            long_count: 3,
            title: "Unit Test 3".to_string(),
            subject: "Chemistry".to_string(),
            ..GeneratorSettings::default()
        };
        let instruction = build_instruction(&settings);

        assert!(instruction.contains("TITLE: Unit Test 3"));
        assert!(instruction.contains("SUBJECT: Chemistry"));
        assert!(instruction.contains("in French"));
        assert!(instruction.contains("LEVEL: HARD"));
        assert!(instruction.contains("Evaluation and Synthesis"));
        assert!(instruction.contains("Section A: 7 MCQs (1m each"));
        assert!(instruction.contains("Section D: 4 Short Answer (5m each"));
        assert!(instruction.contains("Section E: 3 Long Answer (10m each"));
    }

    #[test]
    fn test_schema_required_fields_follow_profile() {
        let schema = build_schema(SchemaProfile::TeacherGuide);
        let required = &schema["properties"]["sections"]["items"]["properties"]["questions"]
            ["items"]["required"];
        let required: Vec<&str> = required
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(
            required,
            vec!["id", "type", "text", "marks", "markingRubric", "cognitiveLevel"]
        );

        let levels = &schema["properties"]["sections"]["items"]["properties"]["questions"]
            ["items"]["properties"]["cognitiveLevel"]["enum"];
        assert_eq!(levels.as_array().unwrap().len(), 6);
    }
}
