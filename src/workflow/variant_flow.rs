//! 套卷导出流程 - 流程层
//!
//! 按标签顺序逐套生成并导出，两次导出之间等待固定间隔，最后一套之后不等待。
//! 某一套导出失败时记录下来并继续处理后面的套卷。
//! 提供兜底导出器时，主导出器失败的套卷改为写出直接打印的 HTML。

use rand::Rng;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};

use crate::config::Config;
use crate::infrastructure::{export_with_fallback, ExportOptions, PaperExporter};
use crate::models::Paper;
use crate::services::{render_view, RenderMode, VariantGenerator};

/// 单套导出结果
#[derive(Debug)]
pub struct VariantAttempt {
    pub label: String,
    pub result: Result<PathBuf, String>,
    /// 是否改用了直接打印
    pub used_fallback: bool,
}

/// 套卷导出报告
#[derive(Debug, Default)]
pub struct VariantReport {
    pub attempts: Vec<VariantAttempt>,
}

impl VariantReport {
    pub fn succeeded(&self) -> usize {
        self.attempts.iter().filter(|a| a.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.attempts.len() - self.succeeded()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed() == 0
    }

    /// 改用直接打印的套数
    pub fn fallbacks(&self) -> usize {
        self.attempts.iter().filter(|a| a.used_fallback).count()
    }
}

/// 套卷导出流程
pub struct VariantFlow {
    delay: Duration,
}

impl VariantFlow {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(Duration::from_millis(config.export_delay_ms))
    }

    /// 逐套生成、渲染、导出
    #[allow(clippy::too_many_arguments)]
    pub async fn run<R: Rng>(
        &self,
        paper: &Paper,
        labels: &[String],
        mode: RenderMode,
        language: &str,
        generator: &mut VariantGenerator<R>,
        exporter: &dyn PaperExporter,
        fallback: Option<&dyn PaperExporter>,
    ) -> VariantReport {
        info!("\n{}", "=".repeat(60));
        info!("📦 开始导出 {} 套试卷 ({})", labels.len(), mode.label());
        info!("{}", "=".repeat(60));

        let mut report = VariantReport::default();

        for (index, label) in labels.iter().enumerate() {
            if index > 0 {
                tokio::time::sleep(self.delay).await;
            }

            let variant = generator.make_variant(paper, label);
            let view = render_view(&variant, mode, language);
            let outcome = match fallback {
                Some(fallback) => export_with_fallback(exporter, fallback, &view).await,
                None => exporter
                    .export(&view, &ExportOptions::for_view(&view))
                    .await
                    .map(|path| (path, false)),
            };

            let attempt = match outcome {
                Ok((path, used_fallback)) => {
                    info!("[{}] ✓ 导出成功: {}", label, path.display());
                    VariantAttempt {
                        label: label.clone(),
                        result: Ok(path),
                        used_fallback,
                    }
                }
                Err(e) => {
                    error!("[{}] ❌ 导出失败: {}", label, e);
                    VariantAttempt {
                        label: label.clone(),
                        result: Err(e.to_string()),
                        used_fallback: false,
                    }
                }
            };
            report.attempts.push(attempt);
        }

        info!("\n{}", "─".repeat(60));
        info!(
            "✓ 套卷导出完成: 成功 {}/{}",
            report.succeeded(),
            report.attempts.len()
        );
        info!("{}", "─".repeat(60));
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, AppResult};
    use crate::infrastructure::HtmlExporter;
    use crate::models::{Question, QuestionType, Section};
    use crate::services::PaperView;
    use async_trait::async_trait;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Mutex;

    /// 记录每次导出的套卷标签与题目顺序，指定标签导出失败
    struct RecordingExporter {
        fail_on: Option<&'static str>,
        calls: Mutex<Vec<(String, Vec<String>, tokio::time::Instant)>>,
    }

    impl RecordingExporter {
        fn new(fail_on: Option<&'static str>) -> Self {
            Self {
                fail_on,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl PaperExporter for RecordingExporter {
        async fn export(&self, view: &PaperView, options: &ExportOptions) -> AppResult<PathBuf> {
            let label = view.set_badge.clone().unwrap_or_default();
            let ids = view.questions().map(|q| q.id.clone()).collect();
            self.calls
                .lock()
                .unwrap()
                .push((label.clone(), ids, tokio::time::Instant::now()));
            if self.fail_on == Some(label.as_str()) {
                return Err(AppError::export_failed(&options.filename, "render crashed"));
            }
            Ok(PathBuf::from(&options.filename))
        }
    }

    fn paper() -> Paper {
        let questions = (1..=6)
            .map(|i| Question::new(format!("q{}", i), QuestionType::Mcq, "?", 1))
            .collect();
        let mut paper = Paper {
            id: "p".to_string(),
            created_at: 0,
            title: "Quiz".to_string(),
            subject: "Physics".to_string(),
            institution_name: "School".to_string(),
            logo_url: None,
            total_marks: 0,
            duration: "30 Minutes".to_string(),
            estimated_total_time: None,
            topics_covered: None,
            instructions: vec![],
            watermark: None,
            set_label: None,
            sections: vec![Section::new("a", "Section A", questions)],
        };
        paper.recompute_aggregates();
        paper
    }

    fn labels() -> Vec<String> {
        vec!["Set A".to_string(), "Set B".to_string(), "Set C".to_string()]
    }

    #[tokio::test(start_paused = true)]
    async fn test_exports_sequentially_with_delay() {
        let exporter = RecordingExporter::new(None);
        let mut generator = VariantGenerator::new(StdRng::seed_from_u64(11));
        let flow = VariantFlow::new(Duration::from_millis(1500));
        let started = tokio::time::Instant::now();

        let report = flow
            .run(&paper(), &labels(), RenderMode::Student, "English", &mut generator, &exporter, None)
            .await;

        assert!(report.all_succeeded());
        assert_eq!(
            report.attempts[2].result.as_ref().unwrap(),
            &PathBuf::from("Exam_Physics_Student_Set_C.pdf")
        );

        let calls = exporter.calls.lock().unwrap();
        let order: Vec<_> = calls.iter().map(|(label, _, _)| label.as_str()).collect();
        assert_eq!(order, vec!["Set A", "Set B", "Set C"]);
        assert_eq!(calls[1].2 - calls[0].2, Duration::from_millis(1500));
        assert_eq!(calls[2].2 - calls[1].2, Duration::from_millis(1500));
        // 最后一套之后不再等待
        assert_eq!(started.elapsed(), Duration::from_millis(3000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_continues_after_failed_export() {
        let exporter = RecordingExporter::new(Some("Set B"));
        let mut generator = VariantGenerator::new(StdRng::seed_from_u64(5));
        let flow = VariantFlow::new(Duration::from_millis(10));

        let report = flow
            .run(&paper(), &labels(), RenderMode::Teacher, "English", &mut generator, &exporter, None)
            .await;

        assert_eq!(report.attempts.len(), 3);
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 1);
        assert!(report.attempts[1].result.as_ref().unwrap_err().contains("Set_B"));
        assert!(report.attempts[2].result.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_set_falls_back_to_html() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = RecordingExporter::new(Some("Set B"));
        let html = HtmlExporter::new(dir.path());
        let mut generator = VariantGenerator::new(StdRng::seed_from_u64(8));

        let report = VariantFlow::new(Duration::from_millis(10))
            .run(
                &paper(),
                &labels(),
                RenderMode::Student,
                "English",
                &mut generator,
                &exporter,
                Some(&html),
            )
            .await;

        assert!(report.all_succeeded());
        assert_eq!(report.fallbacks(), 1);
        assert!(report.attempts[1].used_fallback);
        assert!(dir.path().join("Exam_Physics_Student_Set_B.html").exists());
        assert!(!dir.path().join("Exam_Physics_Student_Set_A.html").exists());
        assert!(!dir.path().join("Exam_Physics_Student_Set_C.html").exists());
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_set_has_same_questions() {
        let exporter = RecordingExporter::new(None);
        let mut generator = VariantGenerator::new(StdRng::seed_from_u64(2024));
        let original = paper();

        VariantFlow::new(Duration::from_millis(1))
            .run(&original, &labels(), RenderMode::Student, "English", &mut generator, &exporter, None)
            .await;

        let calls = exporter.calls.lock().unwrap();
        let mut sorted_original: Vec<_> = original.questions().map(|q| q.id.clone()).collect();
        sorted_original.sort();
        for (_, ids, _) in calls.iter() {
            let mut ids = ids.clone();
            ids.sort();
            assert_eq!(ids, sorted_original);
        }
        assert_eq!(original.set_label, None);
    }
}
