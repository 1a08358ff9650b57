//! 完整流水线 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责一次完整的出卷流程和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：日志文件、配置校验、启动无头浏览器
//! 2. **读取输入**：出卷设置（TOML）与源材料目录
//! 3. **生成试卷**：委托 `GenerationFlow`，结果写入历史记录
//! 4. **双模式导出**：学生卷、教师卷，PDF 失败时改用直接打印
//! 5. **套卷导出**：Set A / B / C 顺序导出
//! 6. **全局统计**：汇总导出结果
//!
//! 浏览器启动失败不会终止程序，所有导出改走直接打印。

use anyhow::{Context, Result};
use chromiumoxide::Browser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::infrastructure::{
    ingest_dir, launch_headless_browser, HtmlExporter, PaperExporter, PdfExporter,
};
use crate::models::load_settings_or_default;
use crate::orchestrator::export_processor::export_both_modes;
use crate::services::{HistoryVault, LlmService, RenderMode, VariantGenerator, DEFAULT_SET_LABELS};
use crate::utils::logging::{init_log_file, log_startup, print_final_stats, truncate_text};
use crate::workflow::{GenerationFlow, VariantFlow};

/// 应用主结构
pub struct App {
    config: Config,
    _browser: Option<Browser>,
    exporter: Box<dyn PaperExporter>,
    fallback: HtmlExporter,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        init_log_file(&config.output_log_file)?;
        log_startup(&config);

        config.validate().context("配置无效")?;

        let fallback = HtmlExporter::new(&config.export_dir);
        let (browser, exporter) =
            match launch_headless_browser(config.chrome_executable.as_deref()).await {
                Ok((browser, page)) => (
                    Some(browser),
                    Box::new(PdfExporter::new(page, &config.export_dir)) as Box<dyn PaperExporter>,
                ),
                Err(e) => {
                    warn!("⚠️ 无头浏览器不可用，全部改用直接打印: {}", e);
                    (
                        None,
                        Box::new(HtmlExporter::new(&config.export_dir)) as Box<dyn PaperExporter>,
                    )
                }
            };

        Ok(Self {
            config,
            _browser: browser,
            exporter,
            fallback,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<()> {
        let settings = load_settings_or_default(Path::new(&self.config.settings_file)).await?;

        info!("\n📁 正在读取源材料: {}", self.config.source_dir);
        let ingested = ingest_dir(Path::new(&self.config.source_dir))
            .await
            .context("读取源材料失败")?;
        if ingested.files.is_empty() {
            warn!("⚠️ 没有找到可用的源文件 (PDF / PNG / JPEG / WEBP)，程序结束");
            return Ok(());
        }

        let mut vault =
            HistoryVault::load(&self.config.history_file, self.config.history_max_entries);
        let flow = GenerationFlow::from_config(LlmService::new(&self.config), &self.config);

        let paper = flow
            .generate(&ingested.files, &settings, &mut vault)
            .await
            .context("生成试卷失败")?;

        if self.config.verbose_logging {
            for (index, question) in paper.questions().enumerate() {
                info!(
                    "  {}. [{}] {} ({}M)",
                    index + 1,
                    question.question_type.code(),
                    truncate_text(&question.text, 40),
                    question.marks
                );
            }
        }

        let stats =
            export_both_modes(&paper, &settings.language, self.exporter.as_ref(), &self.fallback)
                .await;

        let labels: Vec<String> = DEFAULT_SET_LABELS.iter().map(|l| l.to_string()).collect();
        let mut generator = VariantGenerator::new(StdRng::from_entropy());
        let report = VariantFlow::from_config(&self.config)
            .run(
                &paper,
                &labels,
                RenderMode::Student,
                &settings.language,
                &mut generator,
                self.exporter.as_ref(),
                Some(&self.fallback),
            )
            .await;

        print_final_stats(
            stats.exported + report.succeeded(),
            stats.failed + report.failed(),
            &self.config.output_log_file,
        );
        let fallbacks = stats.fallback + report.fallbacks();
        if fallbacks > 0 {
            warn!(
                "💡 {} 份 PDF 未能生成，已在 {} 写出 HTML，可直接打印",
                fallbacks, self.config.export_dir
            );
        }
        let failed = stats.failed + report.failed();
        if failed > 0 {
            error!("❌ {} 份试卷导出失败，未生成任何文件", failed);
        }

        Ok(())
    }
}
