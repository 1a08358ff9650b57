//! 单份试卷导出 - 编排层
//!
//! ## 职责
//!
//! 把一份试卷按学生卷、教师卷各导出一次。
//! 主导出器（PDF）失败时改用直接打印兜底，并记录统计。

use tracing::{error, info};

use crate::infrastructure::{export_with_fallback, PaperExporter};
use crate::models::Paper;
use crate::services::{render_view, RenderMode};

/// 导出统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExportStats {
    pub exported: usize,
    /// 改用直接打印的次数
    pub fallback: usize,
    pub failed: usize,
}

/// 按两种模式导出同一份试卷
pub async fn export_both_modes(
    paper: &Paper,
    language: &str,
    primary: &dyn PaperExporter,
    fallback: &dyn PaperExporter,
) -> ExportStats {
    let mut stats = ExportStats::default();

    for mode in [RenderMode::Student, RenderMode::Teacher] {
        info!("🖨️ 导出{}: {}", mode.heading(), paper.title);
        let view = render_view(paper, mode, language);
        match export_with_fallback(primary, fallback, &view).await {
            Ok((path, used_fallback)) => {
                stats.exported += 1;
                if used_fallback {
                    stats.fallback += 1;
                }
                info!("✓ {}", path.display());
            }
            Err(e) => {
                error!("❌ {} 导出失败: {}", mode.label(), e);
                stats.failed += 1;
            }
        }
    }

    stats
}
