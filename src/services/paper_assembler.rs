//! 试卷组装 - 业务能力层
//!
//! 把生成服务返回的结构化结果校验、规范化为 `Paper`
//!
//! - 解析失败统一视为 `MalformedResponse`
//! - 总分与总用时只从题目重新计算，不信任返回值
//! - 补齐分区 id，修复重复或空白的题目 id

use chrono::Utc;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::collections::HashSet;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{GeneratorSettings, Paper, Question, Section};

/// 生成服务返回的试卷结构
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPaper {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    subject: Option<String>,
    #[serde(default)]
    institution_name: Option<String>,
    #[serde(default)]
    duration: Option<String>,
    #[serde(default)]
    topics_covered: Option<Vec<String>>,
    #[serde(default)]
    instructions: Vec<String>,
    sections: Vec<RawSection>,
}

#[derive(Debug, Deserialize)]
struct RawSection {
    #[serde(default)]
    id: Option<String>,
    title: String,
    questions: Vec<Question>,
}

/// 从 JSON 文本组装试卷
pub fn assemble_from_str(raw: &str, settings: &GeneratorSettings) -> AppResult<Paper> {
    let value: JsonValue = serde_json::from_str(raw.trim())
        .map_err(|e| AppError::malformed_response(format!("返回内容不是合法 JSON: {}", e)))?;
    assemble(value, settings)
}

/// 从结构化结果组装试卷
pub fn assemble(raw: JsonValue, settings: &GeneratorSettings) -> AppResult<Paper> {
    let raw: RawPaper = serde_json::from_value(raw)
        .map_err(|e| AppError::malformed_response(format!("返回结构不符合约定: {}", e)))?;

    let mut seen_ids = HashSet::new();
    let sections = raw
        .sections
        .into_iter()
        .enumerate()
        .map(|(s_idx, section)| {
            let questions = section
                .questions
                .into_iter()
                .enumerate()
                .map(|(q_idx, mut question)| {
                    question.id = unique_question_id(&question.id, s_idx, q_idx, &mut seen_ids);
                    question
                })
                .collect();
            Section {
                id: section
                    .id
                    .filter(|id| !id.trim().is_empty())
                    .unwrap_or_else(|| format!("section-{}", s_idx + 1)),
                title: section.title,
                questions,
            }
        })
        .collect::<Vec<_>>();

    let mut paper = Paper {
        id: Uuid::new_v4().to_string(),
        created_at: Utc::now().timestamp_millis(),
        title: or_setting(raw.title, &settings.title),
        subject: or_setting(raw.subject, &settings.subject),
        institution_name: or_setting(raw.institution_name, &settings.institution_name),
        logo_url: settings.logo(),
        total_marks: 0,
        duration: or_setting(raw.duration, &settings.duration),
        estimated_total_time: None,
        topics_covered: raw.topics_covered,
        instructions: raw.instructions,
        watermark: settings.watermark(),
        set_label: None,
        sections,
    };
    paper.recompute_aggregates();

    if paper.total_marks != settings.expected_total_marks() {
        warn!(
            "⚠️ 试卷总分 {} 与设置预期 {} 不一致",
            paper.total_marks,
            settings.expected_total_marks()
        );
    }

    info!(
        "✓ 试卷组装完成: {} 个分区, {} 道题, 总分 {}",
        paper.sections.len(),
        paper.question_count(),
        paper.total_marks
    );
    debug!("试卷 ID: {}", paper.id);

    Ok(paper)
}

/// 返回值缺失或为空白时使用设置中的值
fn or_setting(value: Option<String>, setting: &str) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| setting.to_string())
}

/// 保证题目 id 在整张试卷内唯一
fn unique_question_id(
    id: &str,
    section_index: usize,
    question_index: usize,
    seen: &mut HashSet<String>,
) -> String {
    let base = if id.trim().is_empty() {
        format!("q-{}-{}", section_index + 1, question_index + 1)
    } else {
        id.trim().to_string()
    };

    let mut candidate = base.clone();
    let mut suffix = 2;
    while seen.contains(&candidate) {
        candidate = format!("{}-{}", base, suffix);
        suffix += 1;
    }
    if candidate != id {
        debug!("题目 id '{}' 重复或为空，改为 '{}'", id, candidate);
    }
    seen.insert(candidate.clone());
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenerationError;
    use serde_json::json;

    fn question(id: &str, kind: &str, marks: u32, time: u32) -> JsonValue {
        json!({ "id": id, "type": kind, "text": format!("Question {}", id), "marks": marks, "estimatedTime": time })
    }

    fn section(title: &str, kind: &str, count: usize, marks: u32, prefix: &str) -> JsonValue {
        let questions: Vec<JsonValue> = (0..count)
            .map(|i| question(&format!("{}{}", prefix, i + 1), kind, marks, 2))
            .collect();
        json!({ "title": title, "questions": questions })
    }

    #[test]
    fn test_default_blueprint_totals_sixty() {
        let raw = json!({
            "title": "Final Examination - 2025",
            "subject": "Biology",
            "totalMarks": 100,
            "sections": [
                section("Section A", "MCQ", 10, 1, "a"),
                section("Section B", "TRUE_FALSE", 5, 1, "b"),
                section("Section C", "FILL_BLANKS", 5, 1, "c"),
                section("Section D", "SHORT", 4, 5, "d"),
                section("Section E", "LONG", 2, 10, "e"),
            ]
        });

        let paper = assemble(raw, &GeneratorSettings::default()).unwrap();

        assert_eq!(paper.total_marks, 60);
        assert_eq!(paper.estimated_total_time, Some(26 * 2));
        assert_eq!(paper.question_count(), 26);
        assert!(paper.aggregates_consistent());
    }

    #[test]
    fn test_ignores_response_aggregates_and_attaches_settings() {
        let raw = json!({
            "title": "Quiz",
            "subject": "History",
            "totalMarks": 999,
            "estimatedTotalTime": 999,
            "sections": [{ "title": "A", "questions": [
                { "id": "q1", "type": "MCQ", "text": "?", "marks": 1 },
                question("q2", "SHORT", 5, 7)
            ]}]
        });
        let settings = GeneratorSettings {
            logo_url: "data:image/png;base64,AAAA".to_string(),
            ..GeneratorSettings::default()
        };

        let paper = assemble(raw, &settings).unwrap();

        assert_eq!(paper.total_marks, 6);
        assert_eq!(paper.estimated_total_time, Some(7));
        assert_eq!(paper.watermark.as_deref(), Some("CONFIDENTIAL"));
        assert_eq!(paper.logo_url.as_deref(), Some("data:image/png;base64,AAAA"));
        assert_eq!(paper.institution_name, "Royal International School");
        assert_eq!(paper.duration, "180 Minutes");
        assert_eq!(paper.sections[0].id, "section-1");
        assert!(Uuid::parse_str(&paper.id).is_ok());
        assert!(paper.created_at > 0);
    }

    #[test]
    fn test_missing_title_and_subject_use_settings() {
        let raw = json!({
            "subject": "  ",
            "sections": [{ "title": "A", "questions": [question("q1", "SHORT", 5, 3)] }]
        });
        let settings = GeneratorSettings {
            title: "Mid Term - 2025".to_string(),
            subject: "Physics".to_string(),
            ..GeneratorSettings::default()
        };

        let paper = assemble(raw, &settings).unwrap();

        assert_eq!(paper.title, "Mid Term - 2025");
        assert_eq!(paper.subject, "Physics");
    }

    #[test]
    fn test_huge_marks_sum_without_overflow() {
        let raw = json!({
            "title": "Quiz",
            "subject": "History",
            "sections": [{ "title": "A", "questions": [
                question("q1", "LONG", 3_000_000_000, 1),
                question("q2", "LONG", 3_000_000_000, 1)
            ]}]
        });

        let paper = assemble(raw, &GeneratorSettings::default()).unwrap();

        assert_eq!(paper.total_marks, 6_000_000_000);
        assert!(paper.aggregates_consistent());
    }

    #[test]
    fn test_duplicate_and_blank_ids_are_repaired() {
        let raw = json!({
            "title": "Quiz",
            "subject": "History",
            "sections": [
                { "title": "A", "questions": [question("q1", "MCQ", 1, 1), question("q1", "MCQ", 1, 1)] },
                { "title": "B", "questions": [question("q1", "LONG", 10, 1), question(" ", "LONG", 10, 1)] }
            ]
        });

        let paper = assemble(raw, &GeneratorSettings::default()).unwrap();

        let ids: Vec<&str> = paper.questions().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, vec!["q1", "q1-2", "q1-3", "q-2-2"]);
    }

    #[test]
    fn test_malformed_response() {
        let missing_sections = json!({ "title": "Quiz", "subject": "History" });
        let result = assemble(missing_sections, &GeneratorSettings::default());
        assert!(matches!(
            result,
            Err(AppError::Generation(GenerationError::MalformedResponse { .. }))
        ));

        let bad_type = json!({
            "title": "Quiz", "subject": "History",
            "sections": [{ "title": "A", "questions": [{ "id": "1", "type": "ESSAY", "text": "?", "marks": 1 }] }]
        });
        assert!(assemble(bad_type, &GeneratorSettings::default()).is_err());

        assert!(assemble_from_str("not json", &GeneratorSettings::default()).is_err());
    }

    #[test]
    fn test_assemble_from_str() {
        let paper = assemble_from_str(
            r#"{"title":"T","subject":"S","sections":[{"title":"A","questions":[{"id":"x","type":"TRUE_FALSE","text":"Sky is blue","marks":1}]}]}"#,
            &GeneratorSettings::default(),
        )
        .unwrap();
        assert_eq!(paper.total_marks, 1);
        assert_eq!(paper.estimated_total_time, Some(0));
    }
}
