//! 试卷 HTML 输出
//!
//! 把 `PaperView` 写成可打印的 A4 HTML 页面，既交给 PDF 导出，也作为直接打印的兜底

use std::fmt::Write;

use crate::services::renderer::{PaperView, QuestionView, RenderMode};

const STYLE: &str = r#"
@page { size: A4; }
body { font-family: Georgia, 'Times New Roman', serif; color: #0f172a; margin: 0; }
.paper { position: relative; padding: 12mm 16mm; }
.watermark { position: fixed; inset: 0; display: flex; align-items: center; justify-content: center; transform: rotate(-40deg); font-size: 120px; font-weight: 900; text-transform: uppercase; white-space: nowrap; pointer-events: none; z-index: 0; }
.set-badge { position: absolute; top: 6mm; right: 6mm; border: 2px solid #0f172a; padding: 2px 10px; font-weight: 900; }
[dir=rtl] .set-badge { right: auto; left: 6mm; }
.content { position: relative; z-index: 1; }
header { text-align: center; border-bottom: 4px solid #0f172a; padding-bottom: 16px; margin-bottom: 16px; }
header img { height: 64px; }
.meta { display: flex; justify-content: space-between; font-size: 12px; font-weight: 700; margin-top: 16px; }
.candidate { display: flex; gap: 32px; margin-bottom: 16px; }
.candidate div { flex: 1; border-bottom: 2px solid #0f172a; padding-bottom: 4px; }
.section-title { background: #0f172a; color: #fff; display: inline-block; padding: 4px 16px; font-size: 12px; font-weight: 900; text-transform: uppercase; }
.question { break-inside: avoid; page-break-inside: avoid; margin: 14px 0; }
.question-row { display: flex; justify-content: space-between; gap: 16px; }
.marks { font-size: 11px; font-weight: 900; white-space: nowrap; }
.options { display: grid; grid-template-columns: 1fr 1fr; gap: 4px 24px; margin-top: 6px; }
.correct { background: #ecfdf5; color: #047857; font-weight: 700; }
.tag { display: inline-block; font-size: 9px; font-weight: 900; text-transform: uppercase; border: 1px solid #f59e0b; color: #b45309; padding: 1px 4px; margin-right: 4px; }
.guide { margin-top: 8px; padding: 8px; border-left: 4px solid #6366f1; background: #f8fafc; font-size: 13px; font-style: italic; }
.answer-line { border-bottom: 1px dotted #cbd5e1; height: 28px; }
"#;

/// 生成完整 HTML 文档
pub fn write_html(view: &PaperView) -> String {
    let mut html = String::new();
    let _ = write_document(&mut html, view);
    html
}

fn write_document(out: &mut String, view: &PaperView) -> std::fmt::Result {
    writeln!(out, "<!DOCTYPE html>")?;
    writeln!(out, "<html dir=\"{}\">", view.direction.code())?;
    writeln!(
        out,
        "<head><meta charset=\"utf-8\"><title>{} - {}</title><style>{}</style></head>",
        escape(&view.header.title),
        view.mode.heading(),
        STYLE
    )?;
    writeln!(out, "<body><div class=\"paper\">")?;

    if let Some(watermark) = &view.watermark {
        writeln!(
            out,
            "<div class=\"watermark\" style=\"opacity: {}\">{}</div>",
            watermark.opacity,
            escape(&watermark.text)
        )?;
    }
    if let Some(badge) = &view.set_badge {
        writeln!(out, "<div class=\"set-badge\">{}</div>", escape(badge))?;
    }

    writeln!(out, "<div class=\"content\">")?;
    write_header(out, view)?;

    for section in &view.sections {
        writeln!(
            out,
            "<section><div class=\"section-title\">{}</div>",
            escape(&section.title)
        )?;
        for question in &section.questions {
            write_question(out, question, view.mode)?;
        }
        writeln!(out, "</section>")?;
    }

    writeln!(out, "</div></div></body></html>")
}

fn write_header(out: &mut String, view: &PaperView) -> std::fmt::Result {
    let header = &view.header;
    writeln!(out, "<header>")?;
    if let Some(logo) = &header.logo_url {
        writeln!(out, "<img src=\"{}\" alt=\"Logo\">", escape(logo))?;
    }
    writeln!(out, "<h1>{}</h1>", escape(&header.institution_name))?;
    writeln!(out, "<h2>{}</h2>", escape(&header.title))?;
    writeln!(
        out,
        "<div class=\"meta\"><span>SUBJECT: {}</span><span>TIME: {}</span><span>TOTAL MARKS: {}</span></div>",
        escape(&header.subject),
        escape(&header.duration),
        header.total_marks
    )?;
    if let Some(syllabus) = &view.syllabus {
        if !syllabus.topics_covered.is_empty() {
            let topics: Vec<String> = syllabus.topics_covered.iter().map(|t| escape(t)).collect();
            writeln!(out, "<p class=\"guide\">Topics: {}</p>", topics.join(", "))?;
        }
        if let Some(minutes) = syllabus.estimated_total_time {
            writeln!(out, "<p class=\"guide\">Estimated solving time: {} min</p>", minutes)?;
        }
    }
    writeln!(out, "</header>")?;

    writeln!(out, "<div class=\"candidate\">")?;
    for field in &view.candidate_fields {
        writeln!(out, "<div>{}:</div>", escape(field))?;
    }
    writeln!(out, "</div>")?;

    if !view.instructions.is_empty() {
        writeln!(out, "<ol class=\"instructions\">")?;
        for instruction in &view.instructions {
            writeln!(out, "<li>{}</li>", escape(instruction))?;
        }
        writeln!(out, "</ol>")?;
    }
    Ok(())
}

fn write_question(out: &mut String, q: &QuestionView, mode: RenderMode) -> std::fmt::Result {
    writeln!(out, "<div class=\"question\" data-id=\"{}\">", escape(&q.id))?;

    if let Some(level) = q.cognitive_level {
        write!(out, "<span class=\"tag\">Bloom's: {}</span>", level)?;
    }
    if let Some(topic) = &q.topic_tag {
        write!(out, "<span class=\"tag\">{}</span>", escape(topic))?;
    }
    if let Some(minutes) = q.estimated_time {
        write!(out, "<span class=\"tag\">{} min</span>", minutes)?;
    }

    writeln!(
        out,
        "<div class=\"question-row\"><div><strong>{}.</strong> {}</div><span class=\"marks\">[{}M]</span></div>",
        q.number,
        escape(&q.text),
        q.marks
    )?;

    if !q.options.is_empty() {
        writeln!(out, "<div class=\"options\">")?;
        for option in &q.options {
            let class = if option.highlighted { " class=\"correct\"" } else { "" };
            writeln!(
                out,
                "<div{}>({}) {}</div>",
                class,
                option.label,
                escape(&option.text)
            )?;
        }
        writeln!(out, "</div>")?;
    }

    if mode == RenderMode::Teacher && (q.marking_rubric.is_some() || q.model_answer.is_some()) {
        writeln!(out, "<div class=\"guide\">")?;
        if let Some(rubric) = &q.marking_rubric {
            writeln!(out, "<p><b>Marking Rubric:</b> {}</p>", escape(rubric))?;
        }
        if let Some(answer) = &q.model_answer {
            writeln!(out, "<p><b>Model Answer:</b> {}</p>", escape(answer))?;
        }
        writeln!(out, "</div>")?;
    }

    for _ in 0..q.answer_lines {
        writeln!(out, "<div class=\"answer-line\"></div>")?;
    }

    writeln!(out, "</div>")
}

/// HTML 转义
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Paper, Question, QuestionType, Section};
    use crate::services::renderer::render_view;

    fn paper() -> Paper {
        let mut long = Question::new("l1", QuestionType::Long, "Compare <b>mitosis</b> & meiosis", 10);
        long.marking_rubric = Some("Structure 4, content 6".to_string());
        long.correct_answer = Some("Mitosis yields two cells".to_string());
        let mut paper = Paper {
            id: "p".to_string(),
            created_at: 0,
            title: "Biology Final".to_string(),
            subject: "Biology".to_string(),
            institution_name: "Royal School".to_string(),
            logo_url: None,
            total_marks: 0,
            duration: "90 Minutes".to_string(),
            estimated_total_time: None,
            topics_covered: None,
            instructions: vec![],
            watermark: Some("CONFIDENTIAL".to_string()),
            set_label: Some("Set A".to_string()),
            sections: vec![Section::new("e", "Section E", vec![long])],
        };
        paper.recompute_aggregates();
        paper
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("a<b>&\"'"), "a&lt;b&gt;&amp;&quot;&#39;");
    }

    #[test]
    fn test_student_html() {
        let html = write_html(&render_view(&paper(), RenderMode::Student, "English"));
        assert!(html.contains("<html dir=\"ltr\">"));
        assert!(html.contains("Compare &lt;b&gt;mitosis&lt;/b&gt; &amp; meiosis"));
        assert!(html.contains("[10M]"));
        assert!(html.contains("CONFIDENTIAL"));
        assert!(html.contains("Set A"));
        assert!(html.contains("Roll No:"));
        assert_eq!(html.matches("class=\"answer-line\"").count(), 10);
        assert!(!html.contains("Marking Rubric"));
        assert!(!html.contains("Mitosis yields"));
    }

    #[test]
    fn test_teacher_html() {
        let html = write_html(&render_view(&paper(), RenderMode::Teacher, "Urdu"));
        assert!(html.contains("<html dir=\"rtl\">"));
        assert!(html.contains("Marking Rubric:</b> Structure 4, content 6"));
        assert!(html.contains("Model Answer:</b> Mitosis yields two cells"));
        assert!(!html.contains("class=\"answer-line\""));
        assert!(html.contains("Teacher&#39;s Master Copy") || html.contains("Teacher's Master Copy"));
    }
}
