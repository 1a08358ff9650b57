//! 源材料读取 - 基础设施层
//!
//! 把上传的 PDF / 图片读成 `SourceFile`，所有文件并发读取，全部完成后再返回

use futures::future::try_join_all;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult, FileError};
use crate::models::SourceFile;

/// 读取结果
#[derive(Debug, Default)]
pub struct IngestReport {
    /// 成功读入的文件（保持输入顺序）
    pub files: Vec<SourceFile>,
    /// 因类型不支持而跳过的文件
    pub rejected: Vec<FileError>,
}

/// 根据扩展名推断 MIME 类型
pub fn detect_mime_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// 读取一组文件
///
/// 不支持的类型记入 `rejected` 并继续处理其余文件；
/// 任一受支持文件读取失败则整体失败
pub async fn ingest_files(paths: &[PathBuf]) -> AppResult<IngestReport> {
    let mut report = IngestReport::default();
    let mut accepted = Vec::new();

    for path in paths {
        let mime_type = detect_mime_type(path);
        let name = file_name(path);
        if SourceFile::is_supported_type(&mime_type) {
            accepted.push((path.clone(), mime_type, name));
        } else {
            warn!("⚠️ 跳过不支持的文件: {} ({})", name, mime_type);
            report
                .rejected
                .push(FileError::UnsupportedType { name, mime_type });
        }
    }

    let reads = accepted.into_iter().map(|(path, mime_type, name)| async move {
        let data = fs::read(&path)
            .await
            .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
        debug!("已读取 {} ({} 字节, {})", name, data.len(), mime_type);
        Ok::<_, AppError>(SourceFile::new(data, mime_type, name))
    });

    report.files = try_join_all(reads).await?;
    info!(
        "✓ 源材料读取完成: {} 个文件, 跳过 {} 个",
        report.files.len(),
        report.rejected.len()
    );

    Ok(report)
}

/// 读取目录下的所有文件（不递归），按文件名排序
pub async fn ingest_dir(dir: &Path) -> AppResult<IngestReport> {
    let mut entries = fs::read_dir(dir)
        .await
        .map_err(|e| AppError::file_read_failed(dir.display().to_string(), e))?;

    let mut paths = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| AppError::file_read_failed(dir.display().to_string(), e))?
    {
        let path = entry.path();
        if path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();

    ingest_files(&paths).await
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string()
}
