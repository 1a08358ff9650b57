//! 试卷导出 - 基础设施层
//!
//! `PdfExporter` 持有唯一的无头浏览器 Page，只暴露"把视图导出为文件"的能力；
//! `HtmlExporter` 是直接打印的兜底：写出 HTML 交给浏览器打印；
//! `export_with_fallback` 把两者串起来，主导出器失败时写出 HTML

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;
use chromiumoxide::Page;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};
use crate::services::html_writer::write_html;
use crate::services::renderer::PaperView;

const MM_PER_INCH: f64 = 25.4;
const A4_WIDTH_MM: f64 = 210.0;
const A4_HEIGHT_MM: f64 = 297.0;

/// 纸张规格
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageFormat {
    A4,
}

/// 导出参数
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    /// 上、右、下、左页边距（毫米）
    pub margins_mm: [f64; 4],
    pub filename: String,
    /// 图片质量 0.0 - 1.0
    ///
    /// 随导出参数一起传递。DevTools 打印没有对应参数，
    /// PDF 中的图片按原图嵌入，这里只记录在导出日志里
    pub image_quality: f32,
    pub page_format: PageFormat,
    pub landscape: bool,
    /// 分页策略
    pub page_break_modes: Vec<String>,
}

impl ExportOptions {
    /// 按视图生成默认导出参数
    ///
    /// 文件名形如 `Exam_<科目>_<Teacher|Student>[_<套卷>].pdf`
    pub fn for_view(view: &PaperView) -> Self {
        let mut filename = format!(
            "Exam_{}_{}",
            sanitize_file_component(&view.subject),
            view.mode.label()
        );
        if let Some(label) = &view.set_badge {
            filename.push('_');
            filename.push_str(&sanitize_file_component(label));
        }
        filename.push_str(".pdf");

        Self {
            margins_mm: [10.0, 0.0, 10.0, 0.0],
            filename,
            image_quality: 1.0,
            page_format: PageFormat::A4,
            landscape: false,
            page_break_modes: vec![
                "avoid-all".to_string(),
                "css".to_string(),
                "legacy".to_string(),
            ],
        }
    }

    /// 同名但换扩展名
    pub fn with_extension(&self, extension: &str) -> Self {
        let stem = Path::new(&self.filename)
            .file_stem()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        Self {
            filename: format!("{}.{}", stem, extension),
            ..self.clone()
        }
    }

    /// 转换为 DevTools 打印参数（英寸）
    pub fn to_print_params(&self) -> PrintToPdfParams {
        let (width, height) = match self.page_format {
            PageFormat::A4 => (A4_WIDTH_MM, A4_HEIGHT_MM),
        };
        let [top, right, bottom, left] = self.margins_mm;

        let mut params = PrintToPdfParams::default();
        params.landscape = Some(self.landscape);
        params.print_background = Some(true);
        params.paper_width = Some(width / MM_PER_INCH);
        params.paper_height = Some(height / MM_PER_INCH);
        params.margin_top = Some(top / MM_PER_INCH);
        params.margin_right = Some(right / MM_PER_INCH);
        params.margin_bottom = Some(bottom / MM_PER_INCH);
        params.margin_left = Some(left / MM_PER_INCH);
        params.prefer_css_page_size = Some(self.page_break_modes.iter().any(|m| m == "css"));
        params
    }
}

/// 导出能力
#[async_trait]
pub trait PaperExporter: Send + Sync {
    /// 导出一份视图，返回生成的文件路径
    async fn export(&self, view: &PaperView, options: &ExportOptions) -> AppResult<PathBuf>;
}

/// 基于无头浏览器的 PDF 导出
pub struct PdfExporter {
    page: Page,
    output_dir: PathBuf,
}

impl PdfExporter {
    pub fn new(page: Page, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            page,
            output_dir: output_dir.into(),
        }
    }
}

#[async_trait]
impl PaperExporter for PdfExporter {
    async fn export(&self, view: &PaperView, options: &ExportOptions) -> AppResult<PathBuf> {
        let html = write_html(view);
        debug!(
            "导出 {}: HTML {} 字节, 图片质量 {}",
            options.filename,
            html.len(),
            options.image_quality
        );

        self.page
            .set_content(html)
            .await
            .map_err(|e| AppError::export_failed(&options.filename, e))?;

        let pdf = self
            .page
            .pdf(options.to_print_params())
            .await
            .map_err(|e| {
                warn!("PDF 渲染失败 ({}): {}", options.filename, e);
                AppError::export_failed(&options.filename, e)
            })?;

        let path = write_output(&self.output_dir, &options.filename, &pdf).await?;
        info!("✓ 已导出 PDF: {}", path.display());
        Ok(path)
    }
}

/// 直接打印兜底：写出可打印的 HTML 文件
pub struct HtmlExporter {
    output_dir: PathBuf,
}

impl HtmlExporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }
}

#[async_trait]
impl PaperExporter for HtmlExporter {
    async fn export(&self, view: &PaperView, options: &ExportOptions) -> AppResult<PathBuf> {
        let options = options.with_extension("html");
        let html = write_html(view);
        let path = write_output(&self.output_dir, &options.filename, html.as_bytes()).await?;
        info!("✓ 已写出打印版 HTML: {}", path.display());
        Ok(path)
    }
}

/// 导出一份视图，主导出器失败时改用兜底导出器
///
/// 返回文件路径，以及是否走了兜底
pub async fn export_with_fallback(
    primary: &dyn PaperExporter,
    fallback: &dyn PaperExporter,
    view: &PaperView,
) -> AppResult<(PathBuf, bool)> {
    let options = ExportOptions::for_view(view);
    match primary.export(view, &options).await {
        Ok(path) => Ok((path, false)),
        Err(e) => {
            warn!("⚠️ {}，改用直接打印", e);
            let path = fallback.export(view, &options).await?;
            Ok((path, true))
        }
    }
}

async fn write_output(dir: &Path, filename: &str, bytes: &[u8]) -> AppResult<PathBuf> {
    fs::create_dir_all(dir)
        .await
        .map_err(|e| AppError::export_failed(filename, e))?;
    let path = dir.join(filename);
    fs::write(&path, bytes)
        .await
        .map_err(|e| AppError::export_failed(filename, e))?;
    Ok(path)
}

/// 文件名中不允许的字符替换为下划线
pub fn sanitize_file_component(value: &str) -> String {
    let cleaned: String = value
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "Paper".to_string()
    } else {
        cleaned
    }
}
